// src/exec/invocation.rs

//! Process Launcher: builds the subprocess invocation for a resolved pack
//! binary.
//!
//! Construction only; the invocation is started by the channel manager so
//! that spawn and handshake failures can be attributed precisely.

use std::fmt;
use std::path::PathBuf;

use crate::config::VarOptions;

/// A subprocess command ready to start: resolved binary plus arguments.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Logical pack name, used for outcome reporting and diagnostics.
    pub pack: String,
    pub binary: PathBuf,
    pub args: Vec<String>,
}

/// Build the invocation for one pack.
///
/// The `--varsfile=` argument is mandatory; every pack binary is required
/// to accept it. Verbosity and any pass-through arguments follow it.
pub fn build_invocation(pack: &str, binary: PathBuf, vars: &VarOptions) -> Invocation {
    let mut args = vec![format!("--varsfile={}", vars.vars_file.display())];
    if vars.verbose {
        args.push("--verbose".to_string());
    }
    args.extend(vars.pack_args.iter().cloned());

    Invocation {
        pack: pack.to_string(),
        binary,
        args,
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
