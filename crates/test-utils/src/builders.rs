#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use packhost::config::VarOptions;

/// Builder for `VarOptions` to simplify test setup.
pub struct VarOptionsBuilder {
    vars: VarOptions,
}

impl VarOptionsBuilder {
    pub fn new(binaries_path: &Path) -> Self {
        Self {
            vars: VarOptions {
                vars_file: PathBuf::from("config.yml"),
                binaries_path: binaries_path.to_string_lossy().into_owned(),
                run: vec![],
                all_packs: false,
                verbose: false,
                pack_args: vec![],
                write_directory: std::env::temp_dir().join("packhost-tests"),
            },
        }
    }

    pub fn run_pack(mut self, name: &str) -> Self {
        self.vars.run.push(name.to_string());
        self
    }

    pub fn all_packs(mut self, val: bool) -> Self {
        self.vars.all_packs = val;
        self
    }

    pub fn verbose(mut self, val: bool) -> Self {
        self.vars.verbose = val;
        self
    }

    pub fn vars_file(mut self, path: &Path) -> Self {
        self.vars.vars_file = path.to_path_buf();
        self
    }

    pub fn write_directory(mut self, path: &Path) -> Self {
        self.vars.write_directory = path.to_path_buf();
        self
    }

    pub fn build(self) -> VarOptions {
        self.vars
    }
}

/// Drop a dummy pack binary into a binaries directory so resolution finds
/// it. The file content is irrelevant to the resolver.
pub fn install_pack(binaries_dir: &Path, name: &str) -> PathBuf {
    let file_name = if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    };
    let path = binaries_dir.join(file_name);
    File::create(&path).expect("Failed to install fake pack binary");
    path
}
