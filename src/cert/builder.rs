//! Certificate descriptor construction.
//!
//! A [`CertificateDescriptor`] is the logical, unsigned content of the leaf
//! certificate: serial, subject, validity window and constraints. It carries
//! no key material; the signing engine binds it to a key pair.

use crate::config::IssueConfig;
use crate::error::{LeafCertError, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use rand::{CryptoRng, RngCore};

/// Length of the random serial number in bytes (144 bits).
pub const SERIAL_LENGTH: usize = 18;

/// Subject (and issuer) identity of the certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectName {
    pub common_name: String,
    pub organization: String,
}

/// Unsigned certificate content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDescriptor {
    /// Big-endian serial with the top bit cleared.
    pub serial: [u8; SERIAL_LENGTH],
    pub subject: SubjectName,
    pub not_before: DateTime<Local>,
    pub not_after: DateTime<Local>,
    pub is_ca: bool,
    pub basic_constraints_valid: bool,
}

impl CertificateDescriptor {
    /// Serial number as lowercase hex.
    pub fn serial_hex(&self) -> String {
        self.serial.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Build a descriptor valid from now until one calendar year from now.
///
/// # Example
///
/// ```
/// use leafcert::cert::builder::build_descriptor;
/// use leafcert::config::IssueConfig;
///
/// let config = IssueConfig::new("example.com", "/tmp");
/// let descriptor = build_descriptor(&config, &mut rand::rngs::OsRng).unwrap();
/// assert_eq!(descriptor.subject.common_name, "example.com");
/// assert!(!descriptor.is_ca);
/// ```
pub fn build_descriptor<R>(config: &IssueConfig, rng: &mut R) -> Result<CertificateDescriptor>
where
    R: RngCore + CryptoRng,
{
    build_descriptor_at(config, Local::now(), rng)
}

/// Build a descriptor whose validity starts at `now`.
///
/// The identity is taken as-is; an empty common name is not rejected here.
pub fn build_descriptor_at<R>(
    config: &IssueConfig,
    now: DateTime<Local>,
    rng: &mut R,
) -> Result<CertificateDescriptor>
where
    R: RngCore + CryptoRng,
{
    let serial = generate_serial(rng)?;
    let not_after = one_year_after(&now).ok_or_else(|| {
        LeafCertError::SigningError(format!("Validity end out of range for start {}", now))
    })?;

    Ok(CertificateDescriptor {
        serial,
        subject: SubjectName {
            common_name: config.identity.clone(),
            organization: config.organization.clone(),
        },
        not_before: now,
        not_after,
        is_ca: false,
        basic_constraints_valid: true,
    })
}

/// Same wall-clock time one calendar year later.
///
/// February 29th rolls over to March 1st when the following year is not a
/// leap year.
pub fn one_year_after<Tz: TimeZone>(start: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let local = start.naive_local();
    let year = local.year().checked_add(1)?;

    let date = NaiveDate::from_ymd_opt(year, local.month(), local.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))?;
    let target = date.and_time(local.time());

    match start.timezone().from_local_datetime(&target).earliest() {
        Some(dt) => Some(dt),
        // Wall-clock time skipped by a DST transition: keep the start offset.
        None => start.clone().checked_add_signed(target - local),
    }
}

fn generate_serial<R>(rng: &mut R) -> Result<[u8; SERIAL_LENGTH]>
where
    R: RngCore + CryptoRng,
{
    let mut serial = [0u8; SERIAL_LENGTH];
    rng.try_fill_bytes(&mut serial).map_err(|e| {
        LeafCertError::GenerationError(format!("Random source failed for serial: {}", e))
    })?;
    serial[0] &= 0x7F; // Ensure positive

    Ok(serial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};
    use rand::rngs::OsRng;

    #[test]
    fn test_descriptor_fields() {
        let config = IssueConfig::new("example.com", "/tmp");
        let descriptor = build_descriptor(&config, &mut OsRng).unwrap();

        assert_eq!(descriptor.subject.common_name, "example.com");
        assert_eq!(descriptor.subject.organization, "Example Inc.");
        assert!(!descriptor.is_ca);
        assert!(descriptor.basic_constraints_valid);
        assert_eq!(descriptor.serial[0] & 0x80, 0);
    }

    #[test]
    fn test_serials_differ() {
        let config = IssueConfig::new("example.com", "/tmp");
        let d1 = build_descriptor(&config, &mut OsRng).unwrap();
        let d2 = build_descriptor(&config, &mut OsRng).unwrap();

        assert_ne!(d1.serial, d2.serial);
        assert_eq!(d1.serial_hex().len(), SERIAL_LENGTH * 2);
    }

    #[test]
    fn test_not_before_is_now() {
        let config = IssueConfig::new("example.com", "/tmp");
        let before = Local::now();
        let descriptor = build_descriptor(&config, &mut OsRng).unwrap();
        let after = Local::now();

        assert!(descriptor.not_before >= before);
        assert!(descriptor.not_before <= after);
    }

    #[test]
    fn test_validity_is_one_calendar_year() {
        let config = IssueConfig::new("example.com", "/tmp");
        let start = Local.with_ymd_and_hms(2023, 1, 15, 10, 30, 0).unwrap();
        let descriptor = build_descriptor_at(&config, start, &mut OsRng).unwrap();

        assert_eq!(descriptor.not_before, start);
        assert_eq!(descriptor.not_after.year(), 2024);
        assert_eq!(descriptor.not_after.month(), 1);
        assert_eq!(descriptor.not_after.day(), 15);
        assert_eq!(descriptor.not_after.hour(), 10);
        assert_eq!(descriptor.not_after.minute(), 30);
    }

    #[test]
    fn test_one_year_after_crosses_leap_day() {
        // 2024 is a leap year, so this span is 366 days rather than 365
        let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let end = one_year_after(&start).unwrap();

        assert_eq!(end, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!((end - start).num_days(), 366);
    }

    #[test]
    fn test_one_year_after_leap_day_rolls_to_march() {
        let start = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        let end = one_year_after(&start).unwrap();

        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_one_year_after_keeps_offset() {
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let start = tz.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let end = one_year_after(&start).unwrap();

        assert_eq!(end, tz.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_empty_identity_still_builds() {
        let config = IssueConfig::new("", "/tmp");
        let descriptor = build_descriptor(&config, &mut OsRng).unwrap();

        assert_eq!(descriptor.subject.common_name, "");
    }

    struct ExhaustedRng;

    impl RngCore for ExhaustedRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy source exhausted"))
        }
    }

    impl CryptoRng for ExhaustedRng {}

    #[test]
    fn test_random_source_failure_is_generation_error() {
        let config = IssueConfig::new("example.com", "/tmp");
        let result = build_descriptor_at(&config, Local::now(), &mut ExhaustedRng);

        match result {
            Err(LeafCertError::GenerationError(msg)) => {
                assert!(msg.contains("entropy source exhausted"));
            }
            other => panic!("Expected GenerationError, got {:?}", other),
        }
    }
}
