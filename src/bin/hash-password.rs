//! Password hasher.
//!
//! Prints the base64-encoded Argon2 hash of PASSWORD to stdout without a
//! trailing newline.

use clap::Parser;
use leafcert::crypto::password::hash_password;
use leafcert::error::{LeafCertError, Result};
use std::io::Write;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "hash-password")]
#[command(about = "Hash a password for storage", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Plaintext password, taken verbatim even when it starts with `-`
    #[arg(allow_hyphen_values = true)]
    password: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(&cli.password) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(password: &str) -> Result<()> {
    let encoded = hash_password(password, &mut rand::rngs::OsRng)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(encoded.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| LeafCertError::io("<stdout>", e))
}
