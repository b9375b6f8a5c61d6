//! PEM serialization of the issued artifacts.
//!
//! Each artifact is wrapped in a labelled PEM block and written to its own
//! file. Existing files are overwritten without warning.

use crate::cert::x509_signing::SignedCertificate;
use crate::config::IssueConfig;
use crate::crypto::keypair::RsaKeypair;
use crate::error::{LeafCertError, Result};
use log::info;
use pem::{EncodeConfig, LineEnding, Pem};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Permission bits of every written artifact (rw-r--r--).
pub const PEM_FILE_MODE: u32 = 0o644;

/// Type label of a PEM block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PemLabel {
    RsaPrivateKey,
    Certificate,
}

impl PemLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PemLabel::RsaPrivateKey => "RSA PRIVATE KEY",
            PemLabel::Certificate => "CERTIFICATE",
        }
    }
}

/// A labelled binary payload ready for PEM armoring.
///
/// The payload is wiped when the block is dropped.
pub struct PemBlock {
    label: PemLabel,
    contents: Zeroizing<Vec<u8>>,
}

impl PemBlock {
    pub fn new(label: PemLabel, contents: Vec<u8>) -> Self {
        Self {
            label,
            contents: Zeroizing::new(contents),
        }
    }

    /// `RSA PRIVATE KEY` block holding the PKCS#1 DER private key.
    pub fn private_key(keypair: &RsaKeypair) -> Result<Self> {
        let der = keypair.to_pkcs1_der()?;
        Ok(Self::new(PemLabel::RsaPrivateKey, der.to_vec()))
    }

    /// `CERTIFICATE` block holding the DER certificate.
    pub fn certificate(cert: &SignedCertificate) -> Self {
        Self::new(PemLabel::Certificate, cert.as_der().to_vec())
    }

    pub fn label(&self) -> PemLabel {
        self.label
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Armor the block: LF line endings, 64-column base64 body.
    ///
    /// # Example
    ///
    /// ```
    /// use leafcert::storage::pem_writer::{PemBlock, PemLabel};
    ///
    /// let block = PemBlock::new(PemLabel::Certificate, vec![1, 2, 3]);
    /// let text = block.encode();
    /// assert!(text.starts_with("-----BEGIN CERTIFICATE-----\n"));
    /// ```
    pub fn encode(&self) -> Zeroizing<String> {
        let pem = Pem::new(self.label.as_str(), self.contents.to_vec());
        Zeroizing::new(pem::encode_config(
            &pem,
            EncodeConfig::new().set_line_ending(LineEnding::LF),
        ))
    }
}

/// Paths of the two files written by [`write_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub key_path: PathBuf,
    pub cert_path: PathBuf,
}

/// Write the private key, then the certificate, into the configured paths.
///
/// A failed key write returns immediately; the certificate is never written
/// in that case. Nothing already on disk is rolled back.
pub fn write_artifacts(
    config: &IssueConfig,
    keypair: &RsaKeypair,
    cert: &SignedCertificate,
) -> Result<WrittenArtifacts> {
    let key_path = config.key_path();
    let cert_path = config.cert_path();

    write_pem_file(&key_path, &PemBlock::private_key(keypair)?)?;
    info!("Wrote private key to {}", key_path.display());

    write_pem_file(&cert_path, &PemBlock::certificate(cert))?;
    info!("Wrote certificate to {}", cert_path.display());

    Ok(WrittenArtifacts {
        key_path,
        cert_path,
    })
}

/// Write a single PEM block to `path` with mode 0644, replacing any
/// existing file.
pub fn write_pem_file(path: &Path, block: &PemBlock) -> Result<()> {
    let encoded = block.encode();

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(PEM_FILE_MODE);
    }

    let mut file = options.open(path).map_err(|e| LeafCertError::io(path, e))?;
    file.write_all(encoded.as_bytes())
        .map_err(|e| LeafCertError::io(path, e))?;

    // The creation mode is filtered by the umask and ignored for existing files
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(Permissions::from_mode(PEM_FILE_MODE))
            .map_err(|e| LeafCertError::io(path, e))?;
    }

    Ok(())
}
