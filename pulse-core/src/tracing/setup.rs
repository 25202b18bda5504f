//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Pulse tracing/logging system.
///
/// Reads the `PULSE_LOG` environment variable for per-crate log levels.
/// Format: `PULSE_LOG=pulse_analysis=debug,pulse_core=info`
///
/// Falls back to `pulse=info` if `PULSE_LOG` is not set or is invalid.
///
/// Idempotent: calling it multiple times is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("PULSE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("pulse=info"));

        // A host application may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
