// tests/batch_probe_failures.rs

mod common;

use common::events_of;

use packhost_test_utils::builders::{VarOptionsBuilder, install_pack};
use packhost_test_utils::fake_connector::{FakeBehaviour, FakeConnector};
use packhost_test_utils::init_tracing;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use packhost::run::{BatchClassification, Orchestrator};

/// A pack reporting failed probes is a legitimate outcome: the remaining
/// packs still run and the batch classifies as failed, not aborted.
#[tokio::test]
async fn probe_failure_is_recorded_and_the_batch_continues() {
    init_tracing();

    let bins = TempDir::new().unwrap();
    for name in ["alpha", "beta", "gamma"] {
        install_pack(bins.path(), name);
    }

    let vars = VarOptionsBuilder::new(bins.path())
        .run_pack("alpha")
        .run_pack("beta")
        .run_pack("gamma")
        .build();

    let connector = FakeConnector::new()
        .with_pack("beta", FakeBehaviour::ProbeFailure("2 of 14 probes failed".into()));
    let events = connector.events_handle();

    let mut orchestrator = Orchestrator::new(&vars, connector);
    let batch = orchestrator.run_batch(&CancellationToken::new()).await.unwrap();

    assert!(matches!(
        batch.classification,
        BatchClassification::SomeFailed
    ));
    assert_eq!(batch.exit_code(), 1);

    // All three were still invoked.
    assert_eq!(events_of(&events, "invoke"), vec!["alpha", "beta", "gamma"]);

    // Exactly beta failed, and its report survived.
    assert_eq!(batch.failed_packs(), vec!["beta"]);
    let beta = batch.outcomes.iter().find(|o| o.pack == "beta").unwrap();
    assert_eq!(beta.error.as_deref(), Some("2 of 14 probes failed"));
}

#[tokio::test]
async fn multiple_probe_failures_are_all_reported() {
    init_tracing();

    let bins = TempDir::new().unwrap();
    for name in ["alpha", "beta", "gamma"] {
        install_pack(bins.path(), name);
    }

    let vars = VarOptionsBuilder::new(bins.path())
        .run_pack("alpha")
        .run_pack("beta")
        .run_pack("gamma")
        .build();

    let connector = FakeConnector::new()
        .with_pack("alpha", FakeBehaviour::ProbeFailure("boom".into()))
        .with_pack("gamma", FakeBehaviour::ProbeFailure("bang".into()));

    let mut orchestrator = Orchestrator::new(&vars, connector);
    let batch = orchestrator.run_batch(&CancellationToken::new()).await.unwrap();

    assert_eq!(batch.exit_code(), 1);
    assert_eq!(batch.failed_packs(), vec!["alpha", "gamma"]);
}
