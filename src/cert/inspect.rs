//! Read-only view of a decoded certificate.

use crate::error::{LeafCertError, Result};
use chrono::{DateTime, Utc};
use const_oid::{AssociatedOid, ObjectIdentifier};
use der::asn1::Utf8StringRef;
use der::Decode;
use x509_cert::certificate::Certificate;
use x509_cert::ext::pkix::BasicConstraints;
use x509_cert::name::Name;
use x509_cert::time::Time;

/// The fields of a certificate that matter to a caller of the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    pub serial_hex: String,
    pub common_names: Vec<String>,
    pub organizations: Vec<String>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub is_ca: bool,
    pub basic_constraints_valid: bool,
}

impl CertificateSummary {
    pub fn from_certificate(cert: &Certificate) -> Result<Self> {
        let tbs = &cert.tbs_certificate;

        let serial_hex = tbs
            .serial_number
            .as_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();

        let constraints = match &tbs.extensions {
            Some(extensions) => extensions
                .iter()
                .find(|ext| ext.extn_id == BasicConstraints::OID)
                .map(|ext| {
                    BasicConstraints::from_der(ext.extn_value.as_bytes()).map_err(|e| {
                        LeafCertError::CertificateError(format!(
                            "Invalid basic constraints: {}",
                            e
                        ))
                    })
                })
                .transpose()?,
            None => None,
        };

        Ok(Self {
            serial_hex,
            common_names: attribute_values(&tbs.subject, const_oid::db::rfc4519::CN)?,
            organizations: attribute_values(&tbs.subject, const_oid::db::rfc4519::O)?,
            not_before: to_chrono(&tbs.validity.not_before)?,
            not_after: to_chrono(&tbs.validity.not_after)?,
            is_ca: constraints.as_ref().map(|bc| bc.ca).unwrap_or(false),
            basic_constraints_valid: constraints.is_some(),
        })
    }

    /// First common name, or an empty string when the subject has none.
    pub fn common_name(&self) -> &str {
        self.common_names.first().map(String::as_str).unwrap_or("")
    }
}

/// All UTF8String values of `oid` in `name`, in encounter order.
pub fn attribute_values(name: &Name, oid: ObjectIdentifier) -> Result<Vec<String>> {
    let mut values = Vec::new();

    for rdn in name.0.iter() {
        for attr in rdn.0.iter().filter(|attr| attr.oid == oid) {
            let value = attr.value.decode_as::<Utf8StringRef<'_>>().map_err(|e| {
                LeafCertError::CertificateError(format!("Unsupported {} encoding: {}", oid, e))
            })?;
            values.push(value.as_str().to_string());
        }
    }

    Ok(values)
}

fn to_chrono(time: &Time) -> Result<DateTime<Utc>> {
    let secs = i64::try_from(time.to_unix_duration().as_secs())
        .map_err(|_| LeafCertError::CertificateError("Time out of range".to_string()))?;

    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| LeafCertError::CertificateError(format!("Time out of range: {}", secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::builder::build_descriptor_at;
    use crate::cert::x509_signing::self_sign;
    use crate::config::IssueConfig;
    use crate::crypto::keypair::generate_rsa_keypair;
    use chrono::{Local, TimeZone};
    use rand::rngs::OsRng;

    #[test]
    fn test_summary_of_issued_certificate() {
        let keypair = generate_rsa_keypair(&mut OsRng).unwrap();
        let start = Local.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let config = IssueConfig::new("example.com", ".");
        let descriptor = build_descriptor_at(&config, start, &mut OsRng).unwrap();

        let signed = self_sign(&descriptor, &keypair, &mut OsRng).unwrap();
        let summary = CertificateSummary::from_certificate(&signed.certificate().unwrap()).unwrap();

        assert_eq!(summary.common_name(), "example.com");
        assert_eq!(summary.organizations, vec!["Example Inc.".to_string()]);
        // DER drops leading zero octets of the serial
        assert_eq!(
            summary.serial_hex.trim_start_matches('0'),
            descriptor.serial_hex().trim_start_matches('0')
        );
        assert_eq!(summary.not_before, start.with_timezone(&Utc));
        assert_eq!(summary.not_after, descriptor.not_after.with_timezone(&Utc));
        assert!(!summary.is_ca);
        assert!(summary.basic_constraints_valid);
    }

    #[test]
    fn test_summary_without_common_name() {
        let keypair = generate_rsa_keypair(&mut OsRng).unwrap();
        let descriptor =
            build_descriptor_at(&IssueConfig::new("", "."), Local::now(), &mut OsRng).unwrap();

        let signed = self_sign(&descriptor, &keypair, &mut OsRng).unwrap();
        let summary = CertificateSummary::from_certificate(&signed.certificate().unwrap()).unwrap();

        assert!(summary.common_names.is_empty());
        assert_eq!(summary.common_name(), "");
        assert_eq!(summary.organizations.len(), 1);
    }
}
