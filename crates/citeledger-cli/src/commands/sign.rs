// crates/citeledger-cli/src/commands/sign.rs
//
// `citeledger sign`: sign a message with a hex-encoded signing key.

use citeledger_core::Keypair;
use clap::Args;

#[derive(Debug, Args)]
pub struct SignCmd {
    /// Hex-encoded 32-byte ed25519 signing key.
    #[arg(long)]
    pub signing_key: String,

    /// Message to sign, as UTF-8 text.
    #[arg(long)]
    pub message: String,
}

/// Run the sign command. Prints the hex signature only, for piping.
pub async fn run(cmd: &SignCmd) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = Keypair::from_signing_key_hex(cmd.signing_key.trim())?;
    println!("{}", keypair.sign_hex(cmd.message.as_bytes()));
    Ok(())
}
