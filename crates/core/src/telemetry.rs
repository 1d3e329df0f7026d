//! Telemetry sink for per-asset and per-document failures.

use std::error::Error;
use tracing::{error, info};

/// Fire-and-forget sink for exceptions and traces.
pub trait Telemetry: Send + Sync {
    /// Reports a caught error.
    fn track_exception(&self, error: &dyn Error);

    /// Reports a free-form trace message.
    fn track_trace(&self, message: &str);
}

/// Forwards telemetry to `tracing` under the `telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn track_exception(&self, err: &dyn Error) {
        error!(target: "telemetry", error = %err, chain = %error_chain(err), "Exception tracked");
    }

    fn track_trace(&self, message: &str) {
        info!(target: "telemetry", "{}", message);
    }
}

/// Renders an error and its sources as `outer: inner: root`.
pub fn error_chain(err: &dyn Error) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        current = cause.source();
    }
    rendered
}
