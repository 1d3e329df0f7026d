//! Recording telemetry sink for testing.

use std::error::Error;
use std::sync::{Arc, RwLock};

use crate::telemetry::{error_chain, Telemetry};

/// Telemetry sink that keeps everything it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingTelemetry {
    exceptions: Arc<RwLock<Vec<String>>>,
    traces: Arc<RwLock<Vec<String>>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered error chains, in order.
    pub fn recorded_exceptions(&self) -> Vec<String> {
        self.exceptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Trace messages, in order.
    pub fn recorded_traces(&self) -> Vec<String> {
        self.traces
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Telemetry for RecordingTelemetry {
    fn track_exception(&self, error: &dyn Error) {
        self.exceptions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(error_chain(error));
    }

    fn track_trace(&self, message: &str) {
        self.traces
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}
