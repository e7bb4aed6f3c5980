use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use packhost::errors::{HostError, Result};
use packhost::exec::{Invocation, PackConnector, ServicePack};
use packhost::proto::SERVICE_PACK_CAPABILITY;

/// Scripted behaviour for one pack name.
#[derive(Debug, Clone)]
pub enum FakeBehaviour {
    /// Connect and invoke succeed; probes pass.
    Succeed,
    /// Connect succeeds; the pack reports its own probe failures.
    ProbeFailure(String),
    /// The subprocess cannot be reached at all.
    RefuseConnection,
    /// The binary launches but is not a service pack.
    FailHandshake,
    /// Handshake succeeds but the capability is absent.
    WithholdCapability,
    /// The invoke never completes; only cancellation ends it.
    HangUntilCancelled,
}

/// A fake connector that:
/// - records every connect / invoke / close with the pack name, in order
/// - returns the scripted behaviour for each pack (default: succeed).
pub struct FakeConnector {
    behaviours: HashMap<String, FakeBehaviour>,
    events: Arc<Mutex<Vec<String>>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self {
            behaviours: HashMap::new(),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_pack(mut self, name: &str, behaviour: FakeBehaviour) -> Self {
        self.behaviours.insert(name.to_string(), behaviour);
        self
    }

    /// Shared handle onto the event log, usable after the connector has
    /// been moved into an orchestrator.
    pub fn events_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.events)
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Packs whose operation was actually invoked, in order.
    pub fn invoked(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.strip_prefix("invoke:").map(String::from))
            .collect()
    }

    fn record(events: &Arc<Mutex<Vec<String>>>, kind: &str, pack: &str) {
        events.lock().unwrap().push(format!("{kind}:{pack}"));
    }
}

impl Default for FakeConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl PackConnector for FakeConnector {
    fn connect<'a>(
        &'a mut self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn ServicePack>>> + Send + 'a>> {
        let pack = invocation.pack.clone();
        let behaviour = self
            .behaviours
            .get(&pack)
            .cloned()
            .unwrap_or(FakeBehaviour::Succeed);
        let events = Arc::clone(&self.events);

        Box::pin(async move {
            Self::record(&events, "connect", &pack);

            match behaviour {
                FakeBehaviour::RefuseConnection => Err(HostError::Connection {
                    pack,
                    source: std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "fake connection refused",
                    ),
                }),
                FakeBehaviour::FailHandshake => Err(HostError::Handshake {
                    pack,
                    reason: "magic cookie mismatch".into(),
                }),
                FakeBehaviour::WithholdCapability => Err(HostError::CapabilityNotExposed {
                    pack,
                    capability: SERVICE_PACK_CAPABILITY.into(),
                }),
                other => Ok(Box::new(FakePack {
                    pack,
                    behaviour: other,
                    events,
                }) as Box<dyn ServicePack>),
            }
        })
    }
}

struct FakePack {
    pack: String,
    behaviour: FakeBehaviour,
    events: Arc<Mutex<Vec<String>>>,
}

impl ServicePack for FakePack {
    fn run_probes(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>> {
        Box::pin(async move {
            FakeConnector::record(&self.events, "invoke", &self.pack);

            match &self.behaviour {
                FakeBehaviour::ProbeFailure(report) => Ok(Some(report.clone())),
                FakeBehaviour::HangUntilCancelled => std::future::pending().await,
                _ => Ok(None),
            }
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            FakeConnector::record(&self.events, "close", &self.pack);
        })
    }
}
