//! Loading issued artifacts back from PEM.
//!
//! Both readers check the PEM label before decoding so a key file is never
//! mistaken for a certificate and vice versa.

use crate::crypto::keypair::RsaKeypair;
use crate::error::{LeafCertError, Result};
use crate::storage::pem_writer::PemLabel;
use der::Decode;
use x509_cert::certificate::Certificate;

/// Load a Certificate from a `CERTIFICATE` PEM block.
///
/// # Example
///
/// ```rust,no_run
/// use leafcert::cert::loader::cert_from_pem;
///
/// # fn example() -> leafcert::error::Result<()> {
/// let pem = std::fs::read_to_string("wildcard.crt").unwrap();
/// let cert = cert_from_pem(&pem)?;
/// # Ok(())
/// # }
/// ```
pub fn cert_from_pem(pem_str: &str) -> Result<Certificate> {
    let der = read_block(pem_str, PemLabel::Certificate)?;

    Certificate::from_der(&der)
        .map_err(|e| LeafCertError::CertificateError(format!("Failed to decode certificate: {}", e)))
}

/// Load an RSA key pair from an `RSA PRIVATE KEY` (PKCS#1) PEM block.
pub fn private_key_from_pem(pem_str: &str) -> Result<RsaKeypair> {
    let der = read_block(pem_str, PemLabel::RsaPrivateKey)?;
    RsaKeypair::from_pkcs1_der(&der)
}

fn read_block(pem_str: &str, expected: PemLabel) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str)
        .map_err(|e| LeafCertError::PemError(format!("Failed to parse PEM: {}", e)))?;

    if pem.tag() != expected.as_str() {
        return Err(LeafCertError::PemError(format!(
            "Expected {}, got {}",
            expected.as_str(),
            pem.tag()
        )));
    }

    Ok(pem.into_contents())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::builder::build_descriptor;
    use crate::cert::x509_signing::self_sign;
    use crate::config::IssueConfig;
    use crate::crypto::keypair::generate_rsa_keypair;
    use crate::storage::pem_writer::PemBlock;
    use der::Encode;
    use rand::rngs::OsRng;

    #[test]
    fn test_cert_and_key_from_pem() {
        let keypair = generate_rsa_keypair(&mut OsRng).unwrap();
        let descriptor =
            build_descriptor(&IssueConfig::new("example.com", "."), &mut OsRng).unwrap();
        let signed = self_sign(&descriptor, &keypair, &mut OsRng).unwrap();

        let cert_pem = PemBlock::certificate(&signed).encode();
        let key_pem = PemBlock::private_key(&keypair).unwrap().encode();

        let cert = cert_from_pem(&cert_pem).unwrap();
        let restored = private_key_from_pem(&key_pem).unwrap();

        assert_eq!(restored.public_key(), keypair.public_key());
        assert_eq!(
            cert.tbs_certificate.subject_public_key_info.to_der().unwrap(),
            restored.public_key_der().unwrap()
        );
    }

    #[test]
    fn test_label_mismatch() {
        let block = PemBlock::new(PemLabel::RsaPrivateKey, vec![0x30, 0x00]);

        match cert_from_pem(&block.encode()) {
            Err(LeafCertError::PemError(msg)) => {
                assert!(msg.contains("Expected CERTIFICATE"));
            }
            _ => panic!("Expected PemError"),
        }
    }

    #[test]
    fn test_invalid_pem() {
        assert!(matches!(
            cert_from_pem("not a valid pem"),
            Err(LeafCertError::PemError(_))
        ));
        assert!(matches!(
            private_key_from_pem(""),
            Err(LeafCertError::PemError(_))
        ));
    }

    #[test]
    fn test_certificate_label_with_garbage_body() {
        let block = PemBlock::new(PemLabel::Certificate, vec![0x01, 0x02, 0x03]);
        assert!(matches!(
            cert_from_pem(&block.encode()),
            Err(LeafCertError::CertificateError(_))
        ));
    }
}
