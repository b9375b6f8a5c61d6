//! leafcert: one-shot self-signed RSA leaf certificates
//!
//! This library issues a single self-signed X.509 certificate together with
//! its RSA key pair, and hashes passwords for storage. Issuance is a linear
//! pipeline:
//!
//! - Generate a 2048-bit RSA key pair
//! - Build the certificate descriptor (random serial, subject, one-year validity)
//! - Self-sign it with RSASSA-PSS
//! - Write `wildcard.key` (PKCS#1) and `wildcard.crt` as PEM
//!
//! All operations return `Result` types; the first error aborts issuance and
//! nothing already written is rolled back.
//!
//! # Example
//!
//! ```rust,no_run
//! use leafcert::config::IssueConfig;
//! use leafcert::error::Result;
//! use leafcert::pipeline::issue;
//!
//! fn example() -> Result<()> {
//!     let config = IssueConfig::new("example.com", "/tmp/certs");
//!     let issued = issue(&config, &mut rand::rngs::OsRng)?;
//!     println!("Serial: {}", issued.descriptor.serial_hex());
//!     Ok(())
//! }
//! ```

pub mod cert;
pub mod config;
pub mod crypto;
pub mod error;
pub mod pipeline;
pub mod storage;

// Re-export commonly used types
pub use config::IssueConfig;
pub use error::{LeafCertError, Result};
pub use pipeline::{issue, IssuedCertificate, Stage};
