//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use umbra::Signal;

/// Routes `tracing` output to the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every emission of `signal`.
pub fn record<T>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>>
where
    T: Clone + Send + 'static,
{
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    signal.connect(move |value: &T| sink.lock().push(value.clone()));
    events
}
