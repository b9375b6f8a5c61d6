//! Password hashing for storage.
//!
//! Passwords are hashed with Argon2id using the library's default cost
//! parameters and a random salt. The resulting PHC string is re-encoded with
//! the standard padded base64 alphabet so it can travel through environments
//! that mangle `$` characters.

use crate::error::{LeafCertError, Result};
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::{CryptoRng, RngCore};

/// Hash a password and return the base64-encoded PHC string.
///
/// # Example
///
/// ```
/// use leafcert::crypto::password::{hash_password, verify_password};
///
/// let encoded = hash_password("hunter2", &mut rand::rngs::OsRng).unwrap();
/// assert!(verify_password("hunter2", &encoded).is_ok());
/// ```
pub fn hash_password<R>(password: &str, rng: &mut R) -> Result<String>
where
    R: RngCore + CryptoRng,
{
    let salt = SaltString::generate(rng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| LeafCertError::HashError(format!("Argon2 error: {}", e)))?;

    Ok(STANDARD.encode(hash.to_string()))
}

/// Check a password against a hash produced by [`hash_password`].
///
/// Returns [`LeafCertError::InvalidPasswordError`] when the password does not
/// match, and [`LeafCertError::HashError`] when `encoded` is not a valid hash.
pub fn verify_password(password: &str, encoded: &str) -> Result<()> {
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| LeafCertError::HashError(format!("Invalid base64: {}", e)))?;
    let phc = String::from_utf8(decoded)
        .map_err(|e| LeafCertError::HashError(format!("Hash is not UTF-8: {}", e)))?;
    let parsed = PasswordHash::new(&phc)
        .map_err(|e| LeafCertError::HashError(format!("Invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => Err(LeafCertError::InvalidPasswordError),
        Err(e) => Err(LeafCertError::HashError(format!("Argon2 error: {}", e))),
    }
}
