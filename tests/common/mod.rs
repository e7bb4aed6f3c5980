#![allow(dead_code)]

use std::sync::{Arc, Mutex};

/// Entries from a `FakeConnector` event log with the given kind prefix,
/// in recorded order.
pub fn events_of(events: &Arc<Mutex<Vec<String>>>, kind: &str) -> Vec<String> {
    let prefix = format!("{kind}:");
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| e.strip_prefix(&prefix).map(String::from))
        .collect()
}

pub fn raw_events(events: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    events.lock().unwrap().clone()
}
