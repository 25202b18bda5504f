//! Tracing setup and structured event tests.

use std::sync::Mutex;

use pulse_core::tracing::{events, init_tracing};

/// Serializes tests that touch the `PULSE_LOG` environment variable.
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn init_tracing_is_idempotent() {
    let _guard = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    init_tracing();
}

#[test]
fn invalid_filter_falls_back() {
    let _guard = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("PULSE_LOG", "this is not a filter[[[");
    init_tracing();
    std::env::remove_var("PULSE_LOG");
}

#[test]
fn events_emit_without_subscriber_panics() {
    let _guard = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    events::batch_completed(4, 1, 1, 2, 12);
    events::project_skipped("P9", "MISSING_INPUT", "planned dates are missing");
    events::cache_checked(true, 30);
    events::cache_checked(false, -1);
}
