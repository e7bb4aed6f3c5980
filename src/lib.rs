// src/lib.rs

pub mod channel;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod interrupt;
pub mod logging;
pub mod proto;
pub mod resolve;
pub mod run;

use tracing::{error, info, warn};

use crate::cli::CliArgs;
use crate::config::VarOptions;
use crate::errors::Result;
use crate::exec::RealConnector;
use crate::run::{BatchClassification, BatchResult, Orchestrator};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - vars-file / environment resolution
/// - the interrupt listener
/// - the sequential batch orchestrator over the production connector
/// - the end-of-batch summary
pub async fn run(args: CliArgs) -> Result<BatchResult> {
    let vars = config::resolve(&args)?;

    std::fs::create_dir_all(&vars.write_directory)?;

    // Concurrent with the whole pipeline; registered before the batch.
    let cancel = interrupt::spawn_interrupt_listener(vars.write_directory.clone());

    let mut orchestrator = Orchestrator::new(&vars, RealConnector);
    let batch = orchestrator.run_batch(&cancel).await?;

    report(&batch, &vars);
    Ok(batch)
}

/// Log the batch summary the way operators consume it: the all-clear, the
/// failing pack identities, or the precise infrastructure step that broke.
fn report(batch: &BatchResult, vars: &VarOptions) {
    info!(directory = %vars.write_directory.display(), "output directory");

    match &batch.classification {
        BatchClassification::AllSucceeded => {
            info!("no errors encountered during service pack execution");
        }
        BatchClassification::SomeFailed => {
            let failed = batch.failed_packs();
            error!(
                packs = ?failed,
                "{} out of {} service packs reported probe failures",
                failed.len(),
                batch.outcomes.len()
            );
        }
        BatchClassification::Aborted { pack, error } => {
            error!(
                pack = %pack,
                step = error.step(),
                error = %error,
                "batch aborted on infrastructure fault"
            );
        }
        BatchClassification::Interrupted => {
            warn!("execution interrupted before completion");
        }
    }
}

/// `packhost list`: show what is installed and what is configured to run.
pub fn list(args: &CliArgs) -> Result<()> {
    let vars = config::resolve(args)?;
    let installed = resolve::installed_packs(&vars.binaries_path);
    let dir = resolve::expand_binaries_path(&vars.binaries_path);

    println!("installed service packs in {} ({}):", dir.display(), installed.len());
    for name in &installed {
        println!("  - {name}");
    }
    println!("configured to run ({}):", vars.run.len());
    for name in &vars.run {
        println!("  - {name}");
    }
    Ok(())
}

/// `packhost version`.
pub fn print_version() {
    println!("packhost {}", env!("CARGO_PKG_VERSION"));
}
