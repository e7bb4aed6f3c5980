// src/errors.rs

//! Crate-wide error types and helpers.
//!
//! The variants mirror the failure classes the batch loop cares about:
//! everything except a pack's own probe report is an infrastructure fault
//! and aborts the batch (see [`crate::run`]). Probe failures are not errors
//! at this level; they travel inside [`crate::run::PackOutcome`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "unable to resolve service pack '{pack}' in '{}': {matches} matching binaries (expected exactly one)",
        dir.display()
    )]
    BinaryResolution {
        pack: String,
        dir: PathBuf,
        matches: usize,
    },

    #[error("handshake with service pack '{pack}' failed: {reason}")]
    Handshake { pack: String, reason: String },

    #[error("connection to service pack '{pack}' failed: {source}")]
    Connection {
        pack: String,
        #[source]
        source: std::io::Error,
    },

    #[error("service pack '{pack}' does not expose capability '{capability}'")]
    CapabilityNotExposed { pack: String, capability: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HostError {
    /// Short label naming which pipeline step gave out, for the abort
    /// diagnostic in the batch summary.
    pub fn step(&self) -> &'static str {
        match self {
            HostError::Config(_) => "configuration",
            HostError::BinaryResolution { .. } => "binary resolution",
            HostError::Handshake { .. } => "handshake",
            HostError::Connection { .. } => "connection",
            HostError::CapabilityNotExposed { .. } => "capability dispense",
            HostError::Io(_) => "io",
            HostError::Other(_) => "internal",
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HostError>;
