//! Self-signed X.509 certificate signing using x509-cert.
//!
//! The descriptor is turned into a v3 TBSCertificate whose issuer equals its
//! subject, then signed with RSASSA-PSS over SHA-256. PSS salts are random,
//! so signing the same descriptor twice yields different signature bytes.

use crate::cert::builder::{CertificateDescriptor, SubjectName};
use crate::crypto::keypair::RsaKeypair;
use crate::error::{LeafCertError, Result};
use chrono::{DateTime, TimeZone};
use const_oid::AssociatedOid;
use der::asn1::{BitString, GeneralizedTime, OctetString, SetOfVec, UtcTime, Utf8StringRef};
use der::{Decode, Encode};
use rand::{CryptoRng, RngCore};
use rsa::pkcs8::DecodePublicKey;
use rsa::pss::{BlindedSigningKey, Signature, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::RsaPublicKey;
use sha2::Sha256;
use spki::{DynSignatureAlgorithmIdentifier, SubjectPublicKeyInfoOwned};
use std::time::Duration;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::certificate::Certificate;
use x509_cert::ext::pkix::BasicConstraints;
use x509_cert::ext::Extension;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::TbsCertificate;

/// A DER-encoded, signed certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificate {
    der: Vec<u8>,
}

impl SignedCertificate {
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    pub fn into_der(self) -> Vec<u8> {
        self.der
    }

    /// Decode the DER bytes back into a structured certificate.
    pub fn certificate(&self) -> Result<Certificate> {
        Certificate::from_der(&self.der).map_err(|e| {
            LeafCertError::CertificateError(format!("Failed to decode certificate: {}", e))
        })
    }
}

/// Sign `descriptor` with `keypair`, making the certificate its own issuer.
///
/// # Example
///
/// ```no_run
/// use leafcert::cert::builder::build_descriptor;
/// use leafcert::cert::x509_signing::{self_sign, verify_self_signed};
/// use leafcert::config::IssueConfig;
/// use leafcert::crypto::keypair::generate_rsa_keypair;
/// use rand::rngs::OsRng;
///
/// # fn example() -> leafcert::error::Result<()> {
/// let keypair = generate_rsa_keypair(&mut OsRng)?;
/// let descriptor = build_descriptor(&IssueConfig::new("example.com", "."), &mut OsRng)?;
/// let signed = self_sign(&descriptor, &keypair, &mut OsRng)?;
/// verify_self_signed(&signed.certificate()?)?;
/// # Ok(())
/// # }
/// ```
pub fn self_sign<R>(
    descriptor: &CertificateDescriptor,
    keypair: &RsaKeypair,
    rng: &mut R,
) -> Result<SignedCertificate>
where
    R: RngCore + CryptoRng,
{
    let signing_key = BlindedSigningKey::<Sha256>::new(keypair.private_key().clone());
    let signature_algorithm = signing_key.signature_algorithm_identifier().map_err(|e| {
        LeafCertError::SigningError(format!("Failed to build PSS algorithm identifier: {}", e))
    })?;

    let serial = create_serial_number(&descriptor.serial)?;
    let subject = create_rdn_sequence(&descriptor.subject)?;
    let issuer = subject.clone(); // Self-signed
    let validity = create_validity(&descriptor.not_before, &descriptor.not_after)?;
    let spki = create_subject_public_key_info(keypair)?;
    let extensions = create_extensions(descriptor)?;

    let tbs = TbsCertificate {
        version: x509_cert::certificate::Version::V3,
        serial_number: serial,
        signature: signature_algorithm.clone(),
        issuer,
        validity,
        subject,
        subject_public_key_info: spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(extensions),
    };

    let signature = sign_tbs(&tbs, &signing_key, rng)?;

    let cert = Certificate {
        tbs_certificate: tbs,
        signature_algorithm,
        signature,
    };

    let der = cert.to_der().map_err(|e| {
        LeafCertError::SigningError(format!("Failed to encode certificate: {}", e))
    })?;

    Ok(SignedCertificate { der })
}

/// Check that a certificate is self-issued and that its signature verifies
/// with its own embedded public key.
pub fn verify_self_signed(cert: &Certificate) -> Result<()> {
    let tbs = &cert.tbs_certificate;

    if tbs.issuer != tbs.subject {
        return Err(LeafCertError::CertificateError(
            "Issuer does not match subject".to_string(),
        ));
    }

    if cert.signature_algorithm.oid != const_oid::db::rfc5912::ID_RSASSA_PSS
        || tbs.signature != cert.signature_algorithm
    {
        return Err(LeafCertError::CertificateError(format!(
            "Unsupported signature algorithm: {}",
            cert.signature_algorithm.oid
        )));
    }

    let spki_der = tbs.subject_public_key_info.to_der().map_err(|e| {
        LeafCertError::CertificateError(format!("Failed to encode public key: {}", e))
    })?;
    let public_key = RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| LeafCertError::CertificateError(format!("Invalid RSA public key: {}", e)))?;

    let tbs_der = tbs
        .to_der()
        .map_err(|e| LeafCertError::CertificateError(format!("Failed to encode TBS: {}", e)))?;
    let signature = Signature::try_from(cert.signature.raw_bytes())
        .map_err(|e| LeafCertError::CertificateError(format!("Malformed signature: {}", e)))?;

    VerifyingKey::<Sha256>::new(public_key)
        .verify(&tbs_der, &signature)
        .map_err(|e| {
            LeafCertError::CertificateError(format!("Signature verification failed: {}", e))
        })
}

// Helper functions

fn create_serial_number(bytes: &[u8]) -> Result<SerialNumber> {
    SerialNumber::new(bytes)
        .map_err(|e| LeafCertError::SigningError(format!("Failed to create serial number: {}", e)))
}

fn create_rdn_sequence(subject: &SubjectName) -> Result<RdnSequence> {
    let mut rdns = Vec::with_capacity(2);

    rdns.push(create_rdn(
        const_oid::db::rfc4519::O,
        &subject.organization,
    )?);

    // An empty common name is left out entirely
    if !subject.common_name.is_empty() {
        rdns.push(create_rdn(
            const_oid::db::rfc4519::CN,
            &subject.common_name,
        )?);
    }

    Ok(RdnSequence(rdns))
}

fn create_rdn(oid: const_oid::ObjectIdentifier, value: &str) -> Result<RelativeDistinguishedName> {
    let attr = AttributeTypeAndValue {
        oid,
        value: Utf8StringRef::new(value)
            .map_err(|e| LeafCertError::SigningError(format!("Invalid {} value: {}", oid, e)))?
            .into(),
    };

    let mut attr_set = SetOfVec::new();
    attr_set
        .insert_ordered(attr)
        .map_err(|e| LeafCertError::SigningError(format!("Failed to add attribute: {}", e)))?;

    Ok(RelativeDistinguishedName::from(attr_set))
}

fn create_validity<Tz: TimeZone>(
    not_before: &DateTime<Tz>,
    not_after: &DateTime<Tz>,
) -> Result<Validity> {
    Ok(Validity {
        not_before: to_x509_time(not_before)?,
        not_after: to_x509_time(not_after)?,
    })
}

/// RFC 5280: UTCTime through 2049, GeneralizedTime from 2050 on.
fn to_x509_time<Tz: TimeZone>(time: &DateTime<Tz>) -> Result<Time> {
    let secs = u64::try_from(time.timestamp()).map_err(|_| {
        LeafCertError::SigningError(format!("Time before UNIX epoch: {} UTC", time.naive_utc()))
    })?;
    let date_time = der::DateTime::from_unix_duration(Duration::from_secs(secs))
        .map_err(|e| LeafCertError::SigningError(format!("Invalid certificate time: {}", e)))?;

    if date_time.year() < 2050 {
        let utc = UtcTime::from_date_time(date_time)
            .map_err(|e| LeafCertError::SigningError(format!("Invalid UTCTime: {}", e)))?;
        Ok(Time::UtcTime(utc))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_date_time(date_time)))
    }
}

fn create_subject_public_key_info(keypair: &RsaKeypair) -> Result<SubjectPublicKeyInfoOwned> {
    let der = keypair.public_key_der()?;
    SubjectPublicKeyInfoOwned::from_der(&der).map_err(|e| {
        LeafCertError::SigningError(format!("Failed to decode public key info: {}", e))
    })
}

fn create_extensions(descriptor: &CertificateDescriptor) -> Result<Vec<Extension>> {
    let mut extensions = Vec::new();

    if descriptor.basic_constraints_valid {
        let constraints = BasicConstraints {
            ca: descriptor.is_ca,
            path_len_constraint: None,
        };
        let value = constraints.to_der().map_err(|e| {
            LeafCertError::SigningError(format!("Failed to encode basic constraints: {}", e))
        })?;

        extensions.push(Extension {
            extn_id: BasicConstraints::OID,
            critical: true,
            extn_value: OctetString::new(value).map_err(|e| {
                LeafCertError::SigningError(format!("Failed to wrap extension: {}", e))
            })?,
        });
    }

    Ok(extensions)
}

fn sign_tbs<R>(
    tbs: &TbsCertificate,
    signing_key: &BlindedSigningKey<Sha256>,
    rng: &mut R,
) -> Result<BitString>
where
    R: RngCore + CryptoRng,
{
    let tbs_der = tbs
        .to_der()
        .map_err(|e| LeafCertError::SigningError(format!("Failed to encode TBS: {}", e)))?;

    let signature = signing_key
        .try_sign_with_rng(rng, &tbs_der)
        .map_err(|e| LeafCertError::SigningError(format!("RSA-PSS signing failed: {}", e)))?;

    BitString::from_bytes(&signature.to_bytes()).map_err(|e| {
        LeafCertError::SigningError(format!("Failed to create signature bitstring: {}", e))
    })
}
