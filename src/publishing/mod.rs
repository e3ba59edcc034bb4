mod log_adapter;
mod noop;
mod port;

use std::sync::Arc;

use crate::messaging::LogProducer;
use crate::metrics::Metrics;

pub use log_adapter::LogOrderEventPublisher;
pub use noop::NoOpOrderEventPublisher;
pub use port::{Delivery, OrderEventPublisher, PublishContext, PublishError};

// ============================================================================
// Publishing - outbound side of the order event boundary
// ============================================================================
//
// Business logic holds an `Arc<dyn OrderEventPublisher>` and never sees the
// transport. Selection happens once at startup:
//
//   publishing enabled + producer   -> LogOrderEventPublisher
//   publishing enabled, no producer -> LogOrderEventPublisher (unconfigured, warns)
//   publishing disabled             -> NoOpOrderEventPublisher
//
// ============================================================================

/// Pick the publisher implementation for this process
pub fn build_publisher(
    enabled: bool,
    producer: Option<Arc<dyn LogProducer>>,
    topic: &str,
    metrics: Arc<Metrics>,
) -> Arc<dyn OrderEventPublisher> {
    if !enabled {
        tracing::info!("Order event publishing disabled");
        return Arc::new(NoOpOrderEventPublisher::new());
    }

    match producer {
        Some(producer) => {
            tracing::info!(topic = %topic, "Publishing order events to log");
            Arc::new(LogOrderEventPublisher::new(producer, topic, metrics))
        }
        None => {
            tracing::warn!(topic = %topic, "No log producer configured, order events will not be sent");
            Arc::new(LogOrderEventPublisher::unconfigured(topic, metrics))
        }
    }
}
