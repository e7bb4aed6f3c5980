// src/resolve.rs

//! Binary Resolver: maps a logical pack name to exactly one installed
//! executable.
//!
//! A pack name is case-insensitive and may arrive as a path, in which case
//! only the final segment counts. Lookup is a glob over the file names in
//! the binaries directory; anything other than exactly one match is an
//! error, never a silent choice.

use std::path::{Path, PathBuf};

use globset::Glob;
use tracing::debug;

use crate::errors::{HostError, Result};

/// Expand a leading `~` in the configured binaries path.
///
/// Applied before every lookup; expansion is idempotent, so repeated calls
/// on an already-expanded path are harmless.
pub fn expand_binaries_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// Normalize a requested pack name: lowercase, strip any path prefix, and
/// on Windows append the executable suffix if absent.
fn normalize_pack_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut base = Path::new(&lowered)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(lowered.clone());

    if cfg!(windows) && !base.ends_with(".exe") {
        base.push_str(".exe");
    }
    base
}

/// Find the single binary matching `name` inside the configured binaries
/// directory.
pub fn find_pack_binary(name: &str, binaries_path: &str) -> Result<PathBuf> {
    let dir = expand_binaries_path(binaries_path);
    let normalized = normalize_pack_name(name);
    let mut matches = discover(&normalized, &dir);

    debug!(pack = %name, normalized = %normalized, dir = %dir.display(), count = matches.len(), "pack binary lookup");

    if matches.len() != 1 {
        return Err(HostError::BinaryResolution {
            pack: name.to_string(),
            dir,
            matches: matches.len(),
        });
    }
    Ok(matches.remove(0))
}

/// Glob-style lookup of `pattern` against the file names in `dir`.
///
/// An unreadable directory or an invalid pattern yields zero matches; the
/// caller turns that into its own diagnostic naming the directory. Results
/// are sorted so discovery order is stable.
pub fn discover(pattern: &str, dir: &Path) -> Vec<PathBuf> {
    let Ok(glob) = Glob::new(pattern) else {
        return Vec::new();
    };
    let matcher = glob.compile_matcher();

    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut found: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.path().is_file())
        .filter(|e| matcher.is_match(Path::new(&e.file_name())))
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}

/// Names of every pack installed in the binaries directory, in discovery
/// order. Used by `--all` and by the `list` subcommand.
pub fn installed_packs(binaries_path: &str) -> Vec<String> {
    let dir = expand_binaries_path(binaries_path);
    discover("*", &dir)
        .into_iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        File::create(dir.path().join(name)).unwrap();
    }

    fn expected_name(base: &str) -> String {
        if cfg!(windows) {
            format!("{base}.exe")
        } else {
            base.to_string()
        }
    }

    #[test]
    fn resolves_case_insensitively() {
        let dir = TempDir::new().unwrap();
        touch(&dir, &expected_name("kubernetes"));

        let found = find_pack_binary("Kubernetes", dir.path().to_str().unwrap()).unwrap();
        assert_eq!(found, dir.path().join(expected_name("kubernetes")));
    }

    #[test]
    fn strips_path_prefix_from_requested_name() {
        let dir = TempDir::new().unwrap();
        touch(&dir, &expected_name("storage"));

        let requested = format!("/somewhere/else/{}", "Storage");
        let found = find_pack_binary(&requested, dir.path().to_str().unwrap()).unwrap();
        assert_eq!(found, dir.path().join(expected_name("storage")));
    }

    #[test]
    fn missing_binary_is_an_error_naming_the_directory() {
        let dir = TempDir::new().unwrap();

        let err = find_pack_binary("kubernetes", dir.path().to_str().unwrap()).unwrap_err();
        match err {
            HostError::BinaryResolution { pack, dir: d, matches } => {
                assert_eq!(pack, "kubernetes");
                assert_eq!(d, dir.path());
                assert_eq!(matches, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ambiguous_match_is_an_error_not_a_silent_pick() {
        let dir = TempDir::new().unwrap();
        touch(&dir, &expected_name("kubernetes"));
        touch(&dir, &expected_name("kubernetes-aks"));

        let err = find_pack_binary("kubernetes*", dir.path().to_str().unwrap()).unwrap_err();
        match err {
            HostError::BinaryResolution { matches, .. } => assert_eq!(matches, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn expands_leading_tilde_once_and_idempotently() {
        let expanded = expand_binaries_path("~/packhost/binaries");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("packhost/binaries"));

        let again = expand_binaries_path(expanded.to_str().unwrap());
        assert_eq!(expanded, again);
    }

    #[test]
    fn installed_packs_lists_discovery_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "storage");
        touch(&dir, "apim");
        touch(&dir, "kubernetes");

        let packs = installed_packs(dir.path().to_str().unwrap());
        assert_eq!(packs, vec!["apim", "kubernetes", "storage"]);
    }
}
