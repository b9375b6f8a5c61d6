//! Certificate construction module.
//!
//! This module builds, self-signs, loads and inspects X.509 leaf certificates.

pub mod builder;
pub mod inspect;
pub mod loader;
pub mod x509_signing;
