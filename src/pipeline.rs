//! The issuance pipeline.
//!
//! Issuance is a strictly linear sequence:
//!
//! ```text
//! Init -> KeyGenerated -> DescriptorBuilt -> Signed -> Serialized -> Done
//! ```
//!
//! Any failure moves straight to `Failed` and the error is handed back to the
//! caller untouched. Nothing is retried and files already written stay on
//! disk.

use crate::cert::builder::{build_descriptor, CertificateDescriptor};
use crate::cert::x509_signing::{self_sign, SignedCertificate};
use crate::config::IssueConfig;
use crate::crypto::keypair::generate_rsa_keypair;
use crate::error::Result;
use crate::storage::pem_writer::{write_artifacts, WrittenArtifacts};
use log::{debug, error};
use rand::{CryptoRng, RngCore};
use std::fmt;

/// Position of an issuance in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    KeyGenerated,
    DescriptorBuilt,
    Signed,
    Serialized,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::KeyGenerated => "key-generated",
            Stage::DescriptorBuilt => "descriptor-built",
            Stage::Signed => "signed",
            Stage::Serialized => "serialized",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a successful issuance.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub descriptor: CertificateDescriptor,
    pub certificate: SignedCertificate,
    pub artifacts: WrittenArtifacts,
}

/// Tracks the current stage and logs every transition.
struct Tracker {
    stage: Stage,
}

impl Tracker {
    fn new() -> Self {
        Self { stage: Stage::Init }
    }

    fn advance(&mut self, next: Stage) {
        debug!("Issuance stage {} -> {}", self.stage, next);
        self.stage = next;
    }

    fn step<T>(&mut self, next: Stage, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.advance(next);
                Ok(value)
            }
            Err(e) => {
                error!("Issuance failed in stage {}: {}", self.stage, e);
                self.advance(Stage::Failed);
                Err(e)
            }
        }
    }
}

/// Generate a key pair, build and self-sign a certificate for
/// `config.identity`, and write both as PEM into `config.output_dir`.
///
/// # Example
///
/// ```rust,no_run
/// use leafcert::config::IssueConfig;
/// use leafcert::pipeline::issue;
///
/// # fn example() -> leafcert::error::Result<()> {
/// let issued = issue(&IssueConfig::new("example.com", "/tmp/certs"), &mut rand::rngs::OsRng)?;
/// println!("wrote {}", issued.artifacts.cert_path.display());
/// # Ok(())
/// # }
/// ```
pub fn issue<R>(config: &IssueConfig, rng: &mut R) -> Result<IssuedCertificate>
where
    R: RngCore + CryptoRng,
{
    let mut tracker = Tracker::new();

    let keypair = tracker.step(Stage::KeyGenerated, generate_rsa_keypair(rng))?;
    let descriptor = tracker.step(Stage::DescriptorBuilt, build_descriptor(config, rng))?;
    let certificate = tracker.step(Stage::Signed, self_sign(&descriptor, &keypair, rng))?;
    let artifacts = tracker.step(
        Stage::Serialized,
        write_artifacts(config, &keypair, &certificate),
    )?;
    tracker.advance(Stage::Done);

    Ok(IssuedCertificate {
        descriptor,
        certificate,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LeafCertError;
    use rand::rngs::OsRng;
    use tempfile::TempDir;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::DescriptorBuilt.to_string(), "descriptor-built");
        assert_eq!(Stage::Failed.to_string(), "failed");
    }

    #[test]
    fn test_tracker_moves_to_failed() {
        let mut tracker = Tracker::new();

        let ok: Result<()> = tracker.step(Stage::KeyGenerated, Ok(()));
        assert!(ok.is_ok());
        assert_eq!(tracker.stage, Stage::KeyGenerated);

        let err: Result<()> = tracker.step(
            Stage::DescriptorBuilt,
            Err(LeafCertError::SigningError("boom".to_string())),
        );
        assert!(err.is_err());
        assert_eq!(tracker.stage, Stage::Failed);
    }

    #[test]
    fn test_issue_writes_both_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let config = IssueConfig::new("example.com", temp_dir.path());

        let issued = issue(&config, &mut OsRng).unwrap();

        assert_eq!(issued.artifacts.key_path, temp_dir.path().join("wildcard.key"));
        assert_eq!(issued.artifacts.cert_path, temp_dir.path().join("wildcard.crt"));
        assert!(issued.artifacts.key_path.exists());
        assert!(issued.artifacts.cert_path.exists());
    }

    #[test]
    fn test_issue_missing_directory_fails_with_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = IssueConfig::new("example.com", temp_dir.path().join("missing"));

        match issue(&config, &mut OsRng) {
            Err(LeafCertError::IoError { path, .. }) => assert_eq!(path, config.key_path()),
            other => panic!("Expected IoError, got {:?}", other.map(|_| ())),
        }
        assert!(!config.cert_path().exists());
    }

    #[test]
    fn test_failed_key_write_skips_certificate() {
        let temp_dir = TempDir::new().unwrap();
        let config = IssueConfig::new("example.com", temp_dir.path())
            .with_key_file("missing/wildcard.key");

        match issue(&config, &mut OsRng) {
            Err(LeafCertError::IoError { path, .. }) => assert_eq!(path, config.key_path()),
            other => panic!("Expected IoError, got {:?}", other.map(|_| ())),
        }

        // The output directory is writable, so only the ordering keeps this absent
        assert!(!config.cert_path().exists());
        assert!(!temp_dir.path().join("wildcard.crt").exists());
    }
}
