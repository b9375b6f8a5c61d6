//! RSA key pair generation.
//!
//! The pipeline always works with a freshly generated 2048-bit RSA key pair.
//! The key never leaves the process except through the PEM writer.

use crate::error::{LeafCertError, Result};
use rand::{CryptoRng, RngCore};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::EncodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

/// Modulus size of every generated key.
pub const RSA_KEY_BITS: usize = 2048;

/// An RSA key pair consisting of a private key and its public half.
#[derive(Debug, Clone)]
pub struct RsaKeypair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl RsaKeypair {
    /// Create a key pair from a private key.
    pub fn from_private(private: RsaPrivateKey) -> Self {
        let public = RsaPublicKey::from(&private);
        Self { private, public }
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.public.size() * 8
    }

    /// PKCS#1 DER encoding of the private key.
    pub fn to_pkcs1_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let doc = self.private.to_pkcs1_der().map_err(|e| {
            LeafCertError::GenerationError(format!("Failed to encode private key: {}", e))
        })?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }

    /// Rebuild a key pair from a PKCS#1 DER private key.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs1_der(der)
            .map_err(|e| LeafCertError::PemError(format!("Invalid PKCS#1 private key: {}", e)))?;
        Ok(Self::from_private(private))
    }

    /// DER-encoded SubjectPublicKeyInfo of the public half.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        let doc = self.public.to_public_key_der().map_err(|e| {
            LeafCertError::SigningError(format!("Failed to encode public key: {}", e))
        })?;
        Ok(doc.as_bytes().to_vec())
    }
}

/// Generate a new 2048-bit RSA key pair from a cryptographically secure RNG.
///
/// # Example
///
/// ```no_run
/// use leafcert::crypto::keypair::{generate_rsa_keypair, RSA_KEY_BITS};
///
/// let keypair = generate_rsa_keypair(&mut rand::rngs::OsRng).unwrap();
/// assert_eq!(keypair.bits(), RSA_KEY_BITS);
/// ```
pub fn generate_rsa_keypair<R>(rng: &mut R) -> Result<RsaKeypair>
where
    R: RngCore + CryptoRng,
{
    let private = RsaPrivateKey::new(rng, RSA_KEY_BITS).map_err(|e| {
        LeafCertError::GenerationError(format!("Failed to generate RSA key: {}", e))
    })?;
    Ok(RsaKeypair::from_private(private))
}
