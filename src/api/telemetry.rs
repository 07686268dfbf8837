//! Usage telemetry as an explicitly constructed, passed-in handle.
//!
//! There is deliberately no module-level SDK or global state: the entrypoint
//! builds one [`Telemetry`] and hands clones to whatever needs to record
//! events. The default sink forwards to `tracing`.

use std::sync::Arc;

/// Destination for telemetry events.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: &str, detail: &str);
}

/// Sink that forwards events to the `tracing` pipeline.
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, event: &str, detail: &str) {
        tracing::info!(target: "telemetry", event, detail);
    }
}

/// Cheap, cloneable handle to a telemetry sink.
#[derive(Clone)]
pub struct Telemetry {
    sink: Arc<dyn TelemetrySink>,
}

impl Telemetry {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }

    /// Telemetry backed by the `tracing` pipeline.
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    pub fn record(&self, event: &str, detail: &str) {
        self.sink.record(event, detail);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingSink;
    use super::*;

    #[test]
    fn handle_forwards_to_sink() {
        let sink = Arc::new(RecordingSink::default());
        let telemetry = Telemetry::new(sink.clone());
        telemetry.record("map_fetch", "issued");
        telemetry.clone().record("chat_send", "ok");

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "map_fetch");
        assert_eq!(events[1], ("chat_send".to_string(), "ok".to_string()));
    }
}
