//! Publisher port: the one capability order-fulfilment logic depends on to
//! announce a completed order, independent of how the event travels.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::order::OrderCompletedEvent;

/// Cancellation and deadline for one publish call.
///
/// Both suspension points of a publish (waiting for the transport to accept
/// the message, waiting for its acknowledgment) end as soon as the token is
/// cancelled or the deadline passes.
#[derive(Debug, Clone, Default)]
pub struct PublishContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl PublishContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel, deadline: None }
    }

    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.cancel.cancelled().await,
        }
    }
}

/// What is known about delivery when a publish is cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Cancelled before the transport accepted the message; nothing was sent
    NotSent,
    /// Cancelled while awaiting acknowledgment; the message may still arrive
    Indeterminate,
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::NotSent => write!(f, "not sent"),
            Delivery::Indeterminate => write!(f, "delivery indeterminate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("Log transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("Publish cancelled ({0})")]
    Cancelled(Delivery),

    #[error("Publish rejected by transport: {0}")]
    Rejected(String),
}

impl PublishError {
    /// Degraded-mode failures callers treat as success-with-warning
    pub fn is_degraded(&self) -> bool {
        matches!(self, PublishError::TransportUnavailable(_))
    }
}

/// Outbound port for completed orders.
///
/// Implementations make at most one delivery attempt per call and never
/// retry; retrying is the caller's decision. `Cancelled(Delivery::Indeterminate)`
/// does not mean the event was lost, so blind retries may duplicate it.
#[async_trait]
pub trait OrderEventPublisher: Send + Sync {
    async fn publish_order_completed(
        &self,
        ctx: &PublishContext,
        event: &OrderCompletedEvent,
    ) -> Result<(), PublishError>;
}
