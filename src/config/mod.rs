// src/config/mod.rs

//! Configuration surface for the orchestrator.
//!
//! The vars file is shared with the service packs themselves (it is what
//! `--varsfile=` points them at), so the keys use the same PascalCase
//! spelling the packs expect.

pub mod loader;

use std::path::PathBuf;

use serde::Deserialize;

pub use loader::{load_from_path, resolve};

/// Default binaries location when neither CLI, vars file nor environment
/// provide one. The `~` is expanded at resolution time.
pub const DEFAULT_BINARIES_PATH: &str = "~/packhost/binaries";

/// Environment variable that overrides the binaries path.
pub const BINARIES_PATH_ENV: &str = "PACKHOST_BIN";

/// The subset of the vars file the orchestrator itself reads.
///
/// Packs read much more out of the same file; everything else passes
/// through untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawVars {
    pub binaries_path: Option<String>,
    pub run: Vec<String>,
    pub write_directory: Option<String>,
}

/// Fully resolved configuration, constructed once and handed by reference
/// into the orchestrator. Nothing here is mutated after resolution.
#[derive(Debug, Clone)]
pub struct VarOptions {
    /// Path handed to every pack via `--varsfile=`.
    pub vars_file: PathBuf,
    /// Binaries directory, possibly still containing a leading `~`;
    /// expansion happens in the resolver before each lookup.
    pub binaries_path: String,
    /// Ordered list of pack names to run.
    pub run: Vec<String>,
    /// Run every installed pack instead of `run`.
    pub all_packs: bool,
    /// Ask packs for extended output.
    pub verbose: bool,
    /// Extra arguments appended verbatim to every pack invocation.
    pub pack_args: Vec<String>,
    /// Where packs deposit their output; created before the batch starts.
    pub write_directory: PathBuf,
}
