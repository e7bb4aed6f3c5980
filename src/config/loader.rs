// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{BINARIES_PATH_ENV, DEFAULT_BINARIES_PATH, RawVars, VarOptions};
use crate::errors::{HostError, Result};

/// Load a vars file from a given path and return the raw `RawVars`.
///
/// This only performs YAML deserialization; precedence against CLI flags
/// and the environment is applied by [`resolve`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawVars> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let vars: RawVars = serde_yaml::from_str(&contents)
        .map_err(|e| HostError::Config(format!("{}: {e}", path.display())))?;

    Ok(vars)
}

/// Resolve the effective configuration from CLI arguments, the vars file
/// and the environment.
///
/// Precedence for the binaries path, highest first:
/// 1. `--binaries-path` CLI flag
/// 2. `BinariesPath` in the vars file
/// 3. `PACKHOST_BIN` environment variable
/// 4. `~/packhost/binaries`
///
/// A missing vars file is not an error here: the orchestrator can still run
/// with `--all`, and packs tolerate an absent file. It is logged, since
/// packs started without vars may misbehave.
pub fn resolve(args: &CliArgs) -> Result<VarOptions> {
    let vars_file = PathBuf::from(&args.varsfile);

    let raw = if vars_file.is_file() {
        load_from_path(&vars_file)?
    } else {
        debug!(path = %vars_file.display(), "no vars file found, continuing without one");
        RawVars::default()
    };

    let binaries_path = args
        .binaries_path
        .clone()
        .or(raw.binaries_path)
        .or_else(|| std::env::var(BINARIES_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_BINARIES_PATH.to_string());

    let write_directory = raw
        .write_directory
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("packhost"));

    Ok(VarOptions {
        vars_file,
        binaries_path,
        run: raw.run,
        all_packs: args.all,
        verbose: args.verbose,
        pack_args: args.pack_args.clone(),
        write_directory,
    })
}
