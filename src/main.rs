//! leafcert CLI application.
//!
//! Issues a self-signed RSA leaf certificate for IDENTITY and writes the key
//! and certificate as PEM into OUTPUT_DIR.

use clap::Parser;
use leafcert::cert::inspect::CertificateSummary;
use leafcert::config::{IssueConfig, DEFAULT_CERT_FILE, DEFAULT_KEY_FILE, DEFAULT_ORGANIZATION};
use leafcert::error::Result;
use leafcert::pipeline::issue;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "leafcert")]
#[command(about = "Issue a self-signed RSA leaf certificate", long_about = None)]
struct Cli {
    /// Subject common name (e.g. "example.com")
    #[arg(allow_hyphen_values = true)]
    identity: String,

    /// Directory receiving the key and certificate
    #[arg(allow_hyphen_values = true)]
    output_dir: PathBuf,

    /// Subject organization
    #[arg(long, default_value = DEFAULT_ORGANIZATION)]
    organization: String,

    /// Private key file name inside OUTPUT_DIR
    #[arg(long, default_value = DEFAULT_KEY_FILE)]
    key_file: String,

    /// Certificate file name inside OUTPUT_DIR
    #[arg(long, default_value = DEFAULT_CERT_FILE)]
    cert_file: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = IssueConfig::new(cli.identity, cli.output_dir)
        .with_organization(cli.organization)
        .with_key_file(cli.key_file)
        .with_cert_file(cli.cert_file);

    let issued = issue(&config, &mut rand::rngs::OsRng)?;
    let summary = CertificateSummary::from_certificate(&issued.certificate.certificate()?)?;

    println!("✓ Wrote private key: {}", issued.artifacts.key_path.display());
    println!("✓ Wrote certificate: {}", issued.artifacts.cert_path.display());
    println!("  Serial: {}", summary.serial_hex);
    println!(
        "  Subject: CN={}, O={}",
        summary.common_name(),
        summary.organizations.join(", ")
    );
    println!("  Not before: {}", summary.not_before);
    println!("  Not after: {}", summary.not_after);

    Ok(())
}
