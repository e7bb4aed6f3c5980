// src/run/mod.rs

//! Batch orchestration: drive the pack list through resolution → launch →
//! handshake → invoke, and classify the result.
//!
//! Policy: an infrastructure fault (binary resolution, handshake,
//! connection, capability dispense) aborts the batch immediately, since
//! the host environment itself is broken and nothing downstream can be
//! trusted. A pack reporting its own probe failures is an expected
//! outcome: it is recorded and the remaining packs still run.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::VarOptions;
use crate::errors::{HostError, Result};
use crate::exec::{PackConnector, ServicePack, build_invocation};
use crate::resolve::{find_pack_binary, installed_packs};

/// Result of invoking one pack. `error: None` means every probe passed.
#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub pack: String,
    pub error: Option<String>,
}

impl PackOutcome {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Terminal classification of a batch run.
#[derive(Debug)]
pub enum BatchClassification {
    AllSucceeded,
    SomeFailed,
    /// The orchestrator's own environment broke; remaining packs were not
    /// attempted.
    Aborted { pack: String, error: HostError },
    /// An external interrupt stopped the batch; not an error.
    Interrupted,
}

/// Ordered outcomes of the packs actually invoked, plus the terminal
/// classification.
#[derive(Debug)]
pub struct BatchResult {
    pub outcomes: Vec<PackOutcome>,
    pub classification: BatchClassification,
}

impl BatchResult {
    /// Process exit code: 0 all passed (or user interrupt), 1 probe
    /// failures, 2 infrastructure fault.
    pub fn exit_code(&self) -> i32 {
        match self.classification {
            BatchClassification::AllSucceeded | BatchClassification::Interrupted => 0,
            BatchClassification::SomeFailed => 1,
            BatchClassification::Aborted { .. } => 2,
        }
    }

    /// Names of the packs whose probes failed, in invocation order.
    pub fn failed_packs(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.passed())
            .map(|o| o.pack.as_str())
            .collect()
    }

    fn from_outcomes(outcomes: Vec<PackOutcome>) -> Self {
        let classification = if outcomes.iter().all(PackOutcome::passed) {
            BatchClassification::AllSucceeded
        } else {
            BatchClassification::SomeFailed
        };
        BatchResult {
            outcomes,
            classification,
        }
    }
}

/// Sequential batch driver. One pack owns one subprocess and one channel at
/// a time; pack *i+1* never starts before pack *i*'s channel is released.
pub struct Orchestrator<'a, C: PackConnector> {
    vars: &'a VarOptions,
    connector: C,
}

impl<'a, C: PackConnector> Orchestrator<'a, C> {
    pub fn new(vars: &'a VarOptions, connector: C) -> Self {
        Self { vars, connector }
    }

    /// The effective pack list: the configured `Run` order, or discovery
    /// order when every installed pack was requested.
    pub fn pack_list(&self) -> Result<Vec<String>> {
        let packs = if self.vars.all_packs {
            installed_packs(&self.vars.binaries_path)
        } else {
            self.vars.run.clone()
        };

        if packs.is_empty() {
            let available = installed_packs(&self.vars.binaries_path);
            return Err(HostError::Config(format!(
                "no valid service packs specified. Requested: {:?}, Available: {:?}",
                self.vars.run, available
            )));
        }
        Ok(packs)
    }

    /// Run the full batch.
    ///
    /// The cancellation token is checked at every pack boundary and raced
    /// against the in-flight exchange, so an interrupt terminates the
    /// current pack instead of orphaning it, then returns normally.
    pub async fn run_batch(&mut self, cancel: &CancellationToken) -> Result<BatchResult> {
        let packs = self.pack_list()?;
        let mut outcomes: Vec<PackOutcome> = Vec::with_capacity(packs.len());

        debug!(binaries_path = %self.vars.binaries_path, count = packs.len(), "starting batch");

        for pack in &packs {
            if cancel.is_cancelled() {
                return Ok(BatchResult {
                    outcomes,
                    classification: BatchClassification::Interrupted,
                });
            }

            match self.run_pack(pack, cancel, &mut outcomes).await {
                PackStep::Continue => {}
                PackStep::Interrupted => {
                    return Ok(BatchResult {
                        outcomes,
                        classification: BatchClassification::Interrupted,
                    });
                }
                PackStep::Abort(error) => {
                    return Ok(BatchResult {
                        outcomes,
                        classification: BatchClassification::Aborted {
                            pack: pack.clone(),
                            error,
                        },
                    });
                }
            }
        }

        Ok(BatchResult::from_outcomes(outcomes))
    }

    /// Resolve, launch, handshake, invoke and release one pack.
    ///
    /// A pack whose binary cannot even be resolved never enters the
    /// aggregator; it aborts before an outcome exists.
    async fn run_pack(
        &mut self,
        pack: &str,
        cancel: &CancellationToken,
        outcomes: &mut Vec<PackOutcome>,
    ) -> PackStep {
        let binary = match find_pack_binary(pack, &self.vars.binaries_path) {
            Ok(b) => b,
            Err(e) => return PackStep::Abort(e),
        };
        let invocation = build_invocation(pack, binary, self.vars);

        let mut handle = {
            let connect = self.connector.connect(&invocation);
            tokio::select! {
                res = connect => match res {
                    Ok(handle) => handle,
                    Err(e) => return PackStep::Abort(e),
                },
                _ = cancel.cancelled() => return PackStep::Interrupted,
            }
        };

        let step = tokio::select! {
            res = handle.run_probes() => match res {
                Ok(None) => {
                    info!(pack = %pack, "probes all completed with successful results");
                    outcomes.push(PackOutcome {
                        pack: pack.to_string(),
                        error: None,
                    });
                    PackStep::Continue
                }
                Ok(Some(report)) => {
                    warn!(pack = %pack, report = %report, "pack reported probe failures");
                    outcomes.push(PackOutcome {
                        pack: pack.to_string(),
                        error: Some(report),
                    });
                    PackStep::Continue
                }
                Err(e) => PackStep::Abort(e),
            },
            _ = cancel.cancelled() => PackStep::Interrupted,
        };

        // Scoped release: the channel never outlives its loop iteration.
        handle.close().await;
        step
    }
}

enum PackStep {
    Continue,
    Interrupted,
    Abort(HostError),
}
