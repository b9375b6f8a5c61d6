//! Cryptographic operations module.
//!
//! - RSA key pair generation for certificate signing
//! - Adaptive, salted password hashing
//!
//! # Example
//!
//! ```rust
//! use leafcert::crypto::password::{hash_password, verify_password};
//!
//! # fn example() -> leafcert::error::Result<()> {
//! let encoded = hash_password("secure-password", &mut rand::rngs::OsRng)?;
//! verify_password("secure-password", &encoded)?;
//! # Ok(())
//! # }
//! ```

pub mod keypair;
pub mod password;
