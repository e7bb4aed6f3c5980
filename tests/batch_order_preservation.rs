// tests/batch_order_preservation.rs

mod common;

use common::events_of;

use packhost_test_utils::builders::{VarOptionsBuilder, install_pack};
use packhost_test_utils::fake_connector::FakeConnector;
use packhost_test_utils::init_tracing;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use packhost::run::{BatchClassification, Orchestrator};

#[tokio::test]
async fn packs_run_in_configured_order_and_batch_succeeds() {
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

    let connector = FakeConnector::new();
    let events = connector.events_handle();

    let mut orchestrator = Orchestrator::new(&vars, connector);
    let batch = orchestrator.run_batch(&CancellationToken::new()).await.unwrap();

    assert!(matches!(
        batch.classification,
        BatchClassification::AllSucceeded
    ));
    assert_eq!(batch.exit_code(), 0);

    let invoked = events_of(&events, "invoke");
    assert_eq!(invoked, vec!["alpha", "beta", "gamma"]);

    let outcome_order: Vec<_> = batch.outcomes.iter().map(|o| o.pack.as_str()).collect();
    assert_eq!(outcome_order, vec!["alpha", "beta", "gamma"]);
    assert!(batch.outcomes.iter().all(|o| o.passed()));
}

#[tokio::test]
async fn each_channel_is_released_before_the_next_pack_starts() {
    init_tracing();

    let bins = TempDir::new().unwrap();
    install_pack(bins.path(), "alpha");
    install_pack(bins.path(), "beta");

    let vars = VarOptionsBuilder::new(bins.path())
        .run_pack("alpha")
        .run_pack("beta")
        .build();

    let connector = FakeConnector::new();
    let events = connector.events_handle();

    let mut orchestrator = Orchestrator::new(&vars, connector);
    orchestrator.run_batch(&CancellationToken::new()).await.unwrap();

    let log = common::raw_events(&events);
    assert_eq!(
        log,
        vec![
            "connect:alpha",
            "invoke:alpha",
            "close:alpha",
            "connect:beta",
            "invoke:beta",
            "close:beta",
        ]
    );
}
