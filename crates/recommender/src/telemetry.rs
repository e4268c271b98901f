//! Telemetry seam for debug output.
//!
//! The service reports its intermediate state (the profile's signals, every
//! candidate's score breakdown, the final ids) to a `TelemetrySink`. Sinks
//! are best effort: an error or a panic inside a sink is logged and
//! otherwise ignored, and never changes the recommendation result.

use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("telemetry sink unavailable: {0}")]
    Unavailable(String),

    #[error("telemetry payload rejected: {0}")]
    Rejected(String),
}

/// Accepts a message plus a free-form metadata payload
pub trait TelemetrySink: Send + Sync {
    fn log(&self, message: &str, metadata: &Value) -> Result<(), TelemetryError>;
}

/// Forwards telemetry to `tracing` at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn log(&self, message: &str, metadata: &Value) -> Result<(), TelemetryError> {
        debug!(target: "recommender::telemetry", metadata = %metadata, "{}", message);
        Ok(())
    }
}

/// Drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn log(&self, _message: &str, _metadata: &Value) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Send one entry to `sink`, swallowing errors and panics
pub(crate) fn emit(sink: &dyn TelemetrySink, message: &str, metadata: &Value) {
    match panic::catch_unwind(AssertUnwindSafe(|| sink.log(message, metadata))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Telemetry sink failed for '{}': {}", message, e),
        Err(_) => warn!("Telemetry sink panicked for '{}'", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingSink;

    impl TelemetrySink for FailingSink {
        fn log(&self, _message: &str, _metadata: &Value) -> Result<(), TelemetryError> {
            Err(TelemetryError::Unavailable("collector down".to_string()))
        }
    }

    struct PanickingSink;

    impl TelemetrySink for PanickingSink {
        fn log(&self, _message: &str, _metadata: &Value) -> Result<(), TelemetryError> {
            panic!("sink exploded")
        }
    }

    #[test]
    fn test_emit_swallows_errors() {
        emit(&FailingSink, "candidates", &json!({ "count": 1 }));
    }

    #[test]
    fn test_emit_swallows_panics() {
        emit(&PanickingSink, "candidates", &json!({ "count": 1 }));
    }

    #[test]
    fn test_builtin_sinks_accept_everything() {
        assert!(TracingSink.log("x", &json!(null)).is_ok());
        assert!(NoopSink.log("x", &json!([1, 2])).is_ok());
    }
}
