//! Artifact storage module.

pub mod pem_writer;
