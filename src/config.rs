//! Issuance configuration.
//!
//! This module describes what gets issued and where the two artifacts land.

use std::path::{Path, PathBuf};

/// Organization placed in the certificate subject unless overridden.
pub const DEFAULT_ORGANIZATION: &str = "Example Inc.";

/// File name of the PEM-encoded private key.
pub const DEFAULT_KEY_FILE: &str = "wildcard.key";

/// File name of the PEM-encoded certificate.
pub const DEFAULT_CERT_FILE: &str = "wildcard.crt";

/// Parameters for a single certificate issuance.
///
/// # Example
///
/// ```
/// use leafcert::config::IssueConfig;
///
/// let config = IssueConfig::new("example.com", "/tmp/out");
/// assert!(config.key_path().ends_with("wildcard.key"));
/// assert!(config.cert_path().ends_with("wildcard.crt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueConfig {
    /// Subject common name.
    pub identity: String,
    /// Subject organization.
    pub organization: String,
    /// Directory receiving both artifacts.
    pub output_dir: PathBuf,
    /// Key file name inside `output_dir`.
    pub key_file: String,
    /// Certificate file name inside `output_dir`.
    pub cert_file: String,
}

impl IssueConfig {
    /// Create a configuration with the default organization and file names.
    pub fn new(identity: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            identity: identity.into(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            output_dir: output_dir.into(),
            key_file: DEFAULT_KEY_FILE.to_string(),
            cert_file: DEFAULT_CERT_FILE.to_string(),
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    pub fn with_key_file(mut self, key_file: impl Into<String>) -> Self {
        self.key_file = key_file.into();
        self
    }

    pub fn with_cert_file(mut self, cert_file: impl Into<String>) -> Self {
        self.cert_file = cert_file.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Full path of the private key artifact.
    pub fn key_path(&self) -> PathBuf {
        self.output_dir.join(&self.key_file)
    }

    /// Full path of the certificate artifact.
    pub fn cert_path(&self) -> PathBuf {
        self.output_dir.join(&self.cert_file)
    }
}
