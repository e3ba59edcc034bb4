use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::codec::decode_binary;
use crate::messaging::{InboundMessage, LogSubscription, TRACEPARENT_HEADER};
use crate::metrics::{consume_outcome, Metrics};
use crate::persistence::{OrderRecordStore, OrderRecords};

// ============================================================================
// Order Event Dispatcher
// ============================================================================
//
// Idle -> Listening -> (Processing -> Listening)* -> Stopped
//
// Per message:
//   1. Decode the binary payload           (failure: log, drop, keep listening)
//   2. Derive order/orderitem/shipping rows
//   3. Persist them in one transaction     (failure: log, drop, keep listening)
//      no store configured -> log "received, not stored"
//
// Messages are handled one at a time, in the order the transport delivers
// them. Only the shutdown token or the end of the subscription stops the loop.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Listening,
    Processing,
    Stopped,
}

impl DispatcherState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatcherState::Idle => "idle",
            DispatcherState::Listening => "listening",
            DispatcherState::Processing => "processing",
            DispatcherState::Stopped => "stopped",
        }
    }

    pub fn as_gauge(&self) -> u8 {
        match self {
            DispatcherState::Idle => 0,
            DispatcherState::Listening => 1,
            DispatcherState::Processing => 2,
            DispatcherState::Stopped => 3,
        }
    }
}

/// Terminal result of handling one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    Persisted,
    ReceivedNotStored,
    DroppedUndecodable,
    DroppedPersistFailed,
}

impl MessageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageOutcome::Persisted => consume_outcome::PERSISTED,
            MessageOutcome::ReceivedNotStored => consume_outcome::NOT_STORED,
            MessageOutcome::DroppedUndecodable => consume_outcome::UNDECODABLE,
            MessageOutcome::DroppedPersistFailed => consume_outcome::PERSIST_FAILED,
        }
    }
}

pub struct OrderEventDispatcher {
    store: Option<Arc<dyn OrderRecordStore>>,
    metrics: Arc<Metrics>,
    state: watch::Sender<DispatcherState>,
}

impl OrderEventDispatcher {
    /// `store: None` runs in receive-only mode
    pub fn new(store: Option<Arc<dyn OrderRecordStore>>, metrics: Arc<Metrics>) -> Self {
        let (state, _) = watch::channel(DispatcherState::Idle);
        metrics.update_dispatcher_state(DispatcherState::Idle.as_gauge());
        Self { store, metrics, state }
    }

    pub fn state(&self) -> DispatcherState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<DispatcherState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: DispatcherState) {
        self.state.send_replace(state);
        self.metrics.update_dispatcher_state(state.as_gauge());
    }

    /// Consume `subscription` until `shutdown` is cancelled or the stream ends
    pub async fn run<S: LogSubscription>(&self, mut subscription: S, shutdown: CancellationToken) {
        self.set_state(DispatcherState::Listening);
        tracing::info!(persistence = self.store.is_some(), "Order event dispatcher listening");

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested, stopping order event dispatcher");
                    break;
                }
                next = subscription.next_message() => next,
            };

            match next {
                Some(Ok(message)) => {
                    self.handle_message(&message).await;
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Failed to receive message, continuing");
                    self.metrics.record_consume(consume_outcome::RECEIVE_ERROR, 0.0);
                }
                None => {
                    tracing::warn!("Subscription ended, stopping order event dispatcher");
                    break;
                }
            }
        }

        self.set_state(DispatcherState::Stopped);
    }

    /// Decode and persist one message. Never fails; the outcome says what happened.
    pub async fn handle_message(&self, message: &InboundMessage) -> MessageOutcome {
        self.set_state(DispatcherState::Processing);
        let started = Instant::now();

        let span = tracing::info_span!(
            "order_event.consume",
            messaging.system = "kafka",
            messaging.source = %message.topic,
            partition = message.partition,
            offset = message.offset,
            traceparent = message.header(TRACEPARENT_HEADER).unwrap_or_default(),
        );
        let outcome = self.process(message).instrument(span).await;

        self.metrics.record_consume(outcome.as_str(), started.elapsed().as_secs_f64());
        self.set_state(DispatcherState::Listening);
        outcome
    }

    async fn process(&self, message: &InboundMessage) -> MessageOutcome {
        let event = match decode_binary(&message.payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    error_kind = e.kind(),
                    error = %e,
                    "Dropping undecodable order message"
                );
                return MessageOutcome::DroppedUndecodable;
            }
        };

        tracing::debug!(
            order_id = %event.order_id(),
            items = event.items().len(),
            shipping_cost = %event.shipping_cost(),
            partition = message.partition,
            offset = message.offset,
            "Order event received"
        );

        let Some(store) = self.store.as_ref() else {
            tracing::info!(
                order_id = %event.order_id(),
                "Persistence not configured, order received but not stored"
            );
            return MessageOutcome::ReceivedNotStored;
        };

        let written = match OrderRecords::from_event(&event) {
            Ok(records) => store.write_order_records(&records).await.map(|()| records),
            Err(e) => Err(e),
        };

        match written {
            Ok(records) => {
                tracing::info!(
                    order_id = %event.order_id(),
                    items = records.items.len(),
                    "Order records persisted"
                );
                MessageOutcome::Persisted
            }
            Err(e) => {
                tracing::error!(
                    order_id = %event.order_id(),
                    partition = message.partition,
                    offset = message.offset,
                    error_kind = e.kind(),
                    error = %e,
                    "Failed to persist order records, dropping message"
                );
                MessageOutcome::DroppedPersistFailed
            }
        }
    }
}
