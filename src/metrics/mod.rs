// Private module declaration
mod server;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers both sides of the order event boundary:
// - Publishing (outcome counts, time to acknowledgment)
// - Consuming (outcome counts, per-message processing time)
// - Circuit breaker state transitions
// - Dispatcher state
//
// Recording never fails and never influences a publish or consume outcome.
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Publish outcome labels
pub mod publish_outcome {
    pub const DELIVERED: &str = "delivered";
    pub const REJECTED: &str = "rejected";
    pub const UNAVAILABLE: &str = "unavailable";
    pub const CANCELLED_NOT_SENT: &str = "cancelled_not_sent";
    pub const CANCELLED_INDETERMINATE: &str = "cancelled_indeterminate";
    pub const SKIPPED: &str = "skipped";
}

/// Consume outcome labels
pub mod consume_outcome {
    pub const PERSISTED: &str = "persisted";
    pub const NOT_STORED: &str = "received_not_stored";
    pub const UNDECODABLE: &str = "dropped_undecodable";
    pub const PERSIST_FAILED: &str = "dropped_persist_failed";
    pub const RECEIVE_ERROR: &str = "receive_error";
}

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Publishing
    pub events_published: IntCounterVec,
    pub publish_duration: HistogramVec,

    // Consuming
    pub events_consumed: IntCounterVec,
    pub processing_duration: HistogramVec,
    pub dispatcher_state: IntGauge,

    // Circuit Breaker Metrics
    pub circuit_breaker_state: IntGauge,
    pub circuit_breaker_transitions: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let events_published = IntCounterVec::new(
            Opts::new("order_events_published_total", "Order completed events handed to the publisher, by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(events_published.clone()))?;

        let publish_duration = HistogramVec::new(
            HistogramOpts::new("order_event_publish_duration_seconds", "Time from enqueue to final publish outcome")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(publish_duration.clone()))?;

        let events_consumed = IntCounterVec::new(
            Opts::new("order_events_consumed_total", "Order event messages read off the log, by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(events_consumed.clone()))?;

        let processing_duration = HistogramVec::new(
            HistogramOpts::new("order_event_processing_duration_seconds", "Per-message decode and persist duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(processing_duration.clone()))?;

        let dispatcher_state = IntGauge::new(
            "order_dispatcher_state",
            "Dispatcher state (0=Idle, 1=Listening, 2=Processing, 3=Stopped)",
        )?;
        registry.register(Box::new(dispatcher_state.clone()))?;

        let circuit_breaker_state = IntGauge::new(
            "circuit_breaker_state",
            "Circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        let circuit_breaker_transitions = IntCounterVec::new(
            Opts::new("circuit_breaker_transitions_total", "Circuit breaker state transitions"),
            &["from_state", "to_state"],
        )?;
        registry.register(Box::new(circuit_breaker_transitions.clone()))?;

        Ok(Self {
            registry,
            events_published,
            publish_duration,
            events_consumed,
            processing_duration,
            dispatcher_state,
            circuit_breaker_state,
            circuit_breaker_transitions,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record the final outcome of one publish call
    pub fn record_publish(&self, outcome: &str, duration_secs: f64) {
        self.events_published.with_label_values(&[outcome]).inc();
        self.publish_duration.with_label_values(&[outcome]).observe(duration_secs);
    }

    /// Record the outcome of one consumed message
    pub fn record_consume(&self, outcome: &str, duration_secs: f64) {
        self.events_consumed.with_label_values(&[outcome]).inc();
        self.processing_duration.with_label_values(&[outcome]).observe(duration_secs);
    }

    /// Current count for one consume outcome
    pub fn consumed(&self, outcome: &str) -> u64 {
        self.events_consumed.with_label_values(&[outcome]).get()
    }

    /// Current count for one publish outcome
    pub fn published(&self, outcome: &str) -> u64 {
        self.events_published.with_label_values(&[outcome]).get()
    }

    pub fn update_dispatcher_state(&self, state: u8) {
        self.dispatcher_state.set(state as i64);
    }

    /// Helper to update circuit breaker state
    pub fn update_circuit_breaker_state(&self, state: u8) {
        self.circuit_breaker_state.set(state as i64);
    }

    /// Helper to record circuit breaker transition
    pub fn record_circuit_breaker_transition(&self, from_state: &str, to_state: &str) {
        self.circuit_breaker_transitions.with_label_values(&[from_state, to_state]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() > 0);
    }

    #[test]
    fn test_record_publish() {
        let metrics = Metrics::new().unwrap();
        metrics.record_publish(publish_outcome::DELIVERED, 0.02);
        metrics.record_publish(publish_outcome::DELIVERED, 0.03);
        metrics.record_publish(publish_outcome::REJECTED, 0.5);

        assert_eq!(metrics.published(publish_outcome::DELIVERED), 2);
        assert_eq!(metrics.published(publish_outcome::REJECTED), 1);

        let gathered = metrics.registry.gather();
        let published = gathered.iter().find(|m| m.name() == "order_events_published_total").unwrap();
        assert_eq!(published.metric.len(), 2); // Two outcome labels
    }

    #[test]
    fn test_record_consume() {
        let metrics = Metrics::new().unwrap();
        metrics.record_consume(consume_outcome::UNDECODABLE, 0.001);
        metrics.record_consume(consume_outcome::PERSISTED, 0.01);

        assert_eq!(metrics.consumed(consume_outcome::UNDECODABLE), 1);
        assert_eq!(metrics.consumed(consume_outcome::PERSISTED), 1);
        assert_eq!(metrics.consumed(consume_outcome::PERSIST_FAILED), 0);
    }

    #[test]
    fn test_dispatcher_state_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.update_dispatcher_state(1);

        let gathered = metrics.registry.gather();
        let state = gathered.iter().find(|m| m.name() == "order_dispatcher_state").unwrap();
        assert_eq!(state.metric[0].gauge.value, Some(1.0));
    }
}
