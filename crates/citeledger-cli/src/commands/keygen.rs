// crates/citeledger-cli/src/commands/keygen.rs
//
// `citeledger keygen`: generate an ed25519 key pair for an author.

use citeledger_core::crypto::key_fingerprint;
use citeledger_core::Keypair;
use clap::Args;
use serde::Serialize;

use crate::output::format_json;

#[derive(Debug, Args)]
pub struct KeygenCmd {
    /// Print the key pair as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct GeneratedKey {
    public_key: String,
    signing_key: String,
    fingerprint: String,
}

/// Run the keygen command.
pub async fn run(cmd: &KeygenCmd) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = Keypair::generate();
    let public_key = keypair.public_key_hex();
    let generated = GeneratedKey {
        fingerprint: key_fingerprint(&public_key),
        public_key,
        signing_key: keypair.signing_key_hex(),
    };

    if cmd.json {
        println!("{}", format_json(&generated));
        return Ok(());
    }

    println!("Key pair generated.");
    println!("  Public key:  {}", generated.public_key);
    println!("  Fingerprint: {}", generated.fingerprint);
    println!();
    println!("IMPORTANT: Keep the signing key secret.");
    println!("  Signing key: {}", generated.signing_key);

    Ok(())
}
