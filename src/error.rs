//! Error types for the leafcert library.
//!
//! Every stage of the issuance pipeline reports failures through
//! [`LeafCertError`]. None of them are retried; callers are expected to
//! print the diagnostic and exit.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for leafcert operations.
#[derive(Error, Debug)]
pub enum LeafCertError {
    /// Random source or RSA key primitive failed
    #[error("Key generation error: {0}")]
    GenerationError(String),

    /// Malformed descriptor field or signing primitive failure
    #[error("Signing error: {0}")]
    SigningError(String),

    /// Writing an artifact to disk failed
    #[error("I/O error writing {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Certificate decoding or inspection error
    #[error("Certificate error: {0}")]
    CertificateError(String),

    /// PEM encoding/decoding error
    #[error("PEM error: {0}")]
    PemError(String),

    /// Password hashing primitive failed
    #[error("Password hashing error: {0}")]
    HashError(String),

    /// Password did not match the stored hash
    #[error("Invalid password")]
    InvalidPasswordError,
}

impl LeafCertError {
    /// Wrap an I/O failure together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LeafCertError::IoError {
            path: path.into(),
            source,
        }
    }
}

/// A specialized Result type for leafcert operations.
pub type Result<T> = std::result::Result<T, LeafCertError>;
