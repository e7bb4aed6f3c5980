// tests/all_packs_mode.rs

mod common;

use common::events_of;

use packhost_test_utils::builders::{VarOptionsBuilder, install_pack};
use packhost_test_utils::fake_connector::FakeConnector;
use packhost_test_utils::init_tracing;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use packhost::errors::HostError;
use packhost::run::Orchestrator;

/// With `--all`, the pack list comes from a directory scan instead of the
/// configured `Run` list, in discovery order.
#[tokio::test]
async fn all_mode_runs_every_installed_pack_in_discovery_order() {
    init_tracing();

    let bins = TempDir::new().unwrap();
    install_pack(bins.path(), "storage");
    install_pack(bins.path(), "apim");
    install_pack(bins.path(), "kubernetes");

    // Run list deliberately mentions only one pack; --all must win.
    let vars = VarOptionsBuilder::new(bins.path())
        .run_pack("kubernetes")
        .all_packs(true)
        .build();

    let connector = FakeConnector::new();
    let events = connector.events_handle();

    let mut orchestrator = Orchestrator::new(&vars, connector);
    let batch = orchestrator.run_batch(&CancellationToken::new()).await.unwrap();

    let expected: Vec<String> = ["apim", "kubernetes", "storage"]
        .iter()
        .map(|n| {
            if cfg!(windows) {
                format!("{n}.exe")
            } else {
                n.to_string()
            }
        })
        .collect();

    assert_eq!(events_of(&events, "invoke"), expected);
    assert_eq!(batch.outcomes.len(), 3);
}

#[tokio::test]
async fn an_empty_effective_pack_list_is_a_configuration_error() {
    init_tracing();

    let bins = TempDir::new().unwrap();
    install_pack(bins.path(), "kubernetes");

    // Nothing configured, --all not set.
    let vars = VarOptionsBuilder::new(bins.path()).build();

    let mut orchestrator = Orchestrator::new(&vars, FakeConnector::new());
    let err = orchestrator
        .run_batch(&CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        HostError::Config(msg) => {
            // The diagnostic names what was available for the operator.
            assert!(msg.contains("kubernetes"), "diagnostic was: {msg}");
        }
        other => panic!("expected a configuration error, got {other}"),
    }
}
