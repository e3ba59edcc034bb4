use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::codec::{encode_binary, BINARY_CONTENT_TYPE};
use crate::domain::order::OrderCompletedEvent;
use crate::messaging::{new_traceparent, LogProducer, OutboundRecord, TransportError, TRACEPARENT_HEADER};
use crate::metrics::{publish_outcome, Metrics};
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use super::port::{Delivery, OrderEventPublisher, PublishContext, PublishError};

// ============================================================================
// Log Delivery Adapter
// ============================================================================
//
// Implements the publisher port over the partitioned log transport:
//
// 1. No transport configured -> log a warning and succeed without sending
// 2. Circuit open            -> TransportUnavailable, zero send attempts
// 3. Encode the event (protobuf)
// 4. Enqueue, racing the caller's context
//      cancelled first -> Cancelled(NotSent), nothing was sent
// 5. Await the acknowledgment, racing the caller's context
//      ack             -> Ok
//      transport error -> Rejected(reason)
//      cancelled first -> Cancelled(Indeterminate), the message may still land
//
// Each record carries a `traceparent` header; the same value is recorded on
// the publish span so the consumer's span can be joined to it.
//
// Exactly one send attempt per call. There is no retry loop at this layer.
//
// ============================================================================

pub struct LogOrderEventPublisher {
    producer: Option<Arc<dyn LogProducer>>,
    topic: String,
    circuit_breaker: CircuitBreaker,
    metrics: Arc<Metrics>,
}

impl LogOrderEventPublisher {
    pub fn new(producer: Arc<dyn LogProducer>, topic: impl Into<String>, metrics: Arc<Metrics>) -> Self {
        Self::with_producer(Some(producer), topic.into(), metrics)
    }

    /// An adapter with no transport handle; every publish is a logged no-op
    pub fn unconfigured(topic: impl Into<String>, metrics: Arc<Metrics>) -> Self {
        Self::with_producer(None, topic.into(), metrics)
    }

    fn with_producer(producer: Option<Arc<dyn LogProducer>>, topic: String, metrics: Arc<Metrics>) -> Self {
        let circuit_breaker = CircuitBreaker::new(CircuitBreakerConfig::default()).with_metrics(metrics.clone());
        Self {
            producer,
            topic,
            circuit_breaker,
            metrics,
        }
    }

    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = CircuitBreaker::new(config).with_metrics(self.metrics.clone());
        self
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.get_state().await
    }

    async fn deliver(
        &self,
        producer: &dyn LogProducer,
        ctx: &PublishContext,
        event: &OrderCompletedEvent,
        traceparent: String,
    ) -> Result<(), PublishError> {
        let started = Instant::now();
        let record = OutboundRecord::new(self.topic.as_str(), encode_binary(event))
            .with_header("content-type", BINARY_CONTENT_TYPE)
            .with_header(TRACEPARENT_HEADER, traceparent)
            .with_header("event-type", OrderCompletedEvent::event_type());

        let delivery = tokio::select! {
            biased;
            _ = ctx.done() => {
                tracing::warn!("Context cancelled before the order event could be queued");
                self.metrics.record_publish(publish_outcome::CANCELLED_NOT_SENT, started.elapsed().as_secs_f64());
                return Err(PublishError::Cancelled(Delivery::NotSent));
            }
            enqueued = producer.enqueue(record) => match enqueued {
                Ok(delivery) => delivery,
                Err(error) => {
                    tracing::error!(error = %error, "Transport refused the order event");
                    self.circuit_breaker.record_failure().await;
                    let (outcome, error) = match error {
                        TransportError::Unavailable(reason) => {
                            (publish_outcome::UNAVAILABLE, PublishError::TransportUnavailable(reason))
                        }
                        other => (publish_outcome::REJECTED, PublishError::Rejected(other.to_string())),
                    };
                    self.metrics.record_publish(outcome, started.elapsed().as_secs_f64());
                    return Err(error);
                }
            },
        };

        tokio::select! {
            biased;
            acknowledged = delivery => match acknowledged {
                Ok(ack) => {
                    let duration = started.elapsed();
                    tracing::info!(
                        receipt = %ack.receipt,
                        duration_ms = duration.as_millis() as u64,
                        "Successfully published order event"
                    );
                    self.circuit_breaker.record_success().await;
                    self.metrics.record_publish(publish_outcome::DELIVERED, duration.as_secs_f64());
                    Ok(())
                }
                Err(error) => {
                    let duration = started.elapsed();
                    tracing::error!(
                        error = %error,
                        duration_ms = duration.as_millis() as u64,
                        "Failed to publish order event"
                    );
                    self.circuit_breaker.record_failure().await;
                    self.metrics.record_publish(publish_outcome::REJECTED, duration.as_secs_f64());
                    Err(PublishError::Rejected(error.to_string()))
                }
            },
            _ = ctx.done() => {
                let duration = started.elapsed();
                tracing::warn!(
                    duration_ms = duration.as_millis() as u64,
                    "Context cancelled while waiting for acknowledgment; delivery indeterminate"
                );
                self.metrics.record_publish(publish_outcome::CANCELLED_INDETERMINATE, duration.as_secs_f64());
                Err(PublishError::Cancelled(Delivery::Indeterminate))
            }
        }
    }
}

#[async_trait]
impl OrderEventPublisher for LogOrderEventPublisher {
    async fn publish_order_completed(
        &self,
        ctx: &PublishContext,
        event: &OrderCompletedEvent,
    ) -> Result<(), PublishError> {
        let Some(producer) = self.producer.as_deref() else {
            tracing::warn!(
                order_id = %event.order_id(),
                "Log producer not configured, skipping order event publication"
            );
            self.metrics.record_publish(publish_outcome::SKIPPED, 0.0);
            return Ok(());
        };

        if ctx.is_done() {
            tracing::warn!(order_id = %event.order_id(), "Context already cancelled, order event not sent");
            self.metrics.record_publish(publish_outcome::CANCELLED_NOT_SENT, 0.0);
            return Err(PublishError::Cancelled(Delivery::NotSent));
        }

        if !self.circuit_breaker.try_acquire().await {
            tracing::error!(
                order_id = %event.order_id(),
                topic = %self.topic,
                "Circuit breaker open - log transport unavailable"
            );
            self.metrics.record_publish(publish_outcome::UNAVAILABLE, 0.0);
            return Err(PublishError::TransportUnavailable("circuit breaker open".to_string()));
        }

        let traceparent = new_traceparent();
        let span = tracing::info_span!(
            "order_event.publish",
            messaging.system = "kafka",
            messaging.destination = %self.topic,
            order_id = %event.order_id(),
            traceparent = %traceparent,
        );

        self.deliver(producer, ctx, event, traceparent).instrument(span).await
    }
}
