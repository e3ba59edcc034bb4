use async_trait::async_trait;
use futures_util::future::BoxFuture;
use uuid::Uuid;

// ============================================================================
// Log Transport Abstractions
// ============================================================================
//
// The partitioned, append-only log the two services talk over. Sending is
// split in two phases so callers can tell "never accepted" apart from
// "accepted but not yet acknowledged":
//
// 1. `LogProducer::enqueue` resolves once the transport owns the record.
//    Dropping it before it resolves means nothing was sent.
// 2. The returned `DeliveryFuture` resolves with the broker's verdict.
//
// ============================================================================

/// Transport-level failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to enqueue record: {0}")]
    Enqueue(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Failed to receive message: {0}")]
    Receive(String),
}

/// Broker acknowledgment for one delivered record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAck {
    /// Transport-specific receipt (partition/offset) for log lines
    pub receipt: String,
}

impl DeliveryAck {
    pub fn new(receipt: impl Into<String>) -> Self {
        Self { receipt: receipt.into() }
    }
}

/// Resolves once the broker acknowledges or rejects an accepted record
pub type DeliveryFuture = BoxFuture<'static, Result<DeliveryAck, TransportError>>;

/// A record headed for the log. The key is unused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRecord {
    pub topic: String,
    pub payload: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl OutboundRecord {
    pub fn new(topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            payload,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// A raw message read off the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub payload: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl InboundMessage {
    /// First header value under `key`
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }
}

/// W3C trace-context header linking a consumed message to its publish span
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Fresh `traceparent` value: version 00, random trace and span ids, sampled
pub fn new_traceparent() -> String {
    let trace_id = Uuid::new_v4().simple();
    let span_id = Uuid::new_v4().as_u128() as u64;
    format!("00-{trace_id}-{span_id:016x}-01")
}

/// Sending half of the log transport. Shared by every publisher in the
/// process, so implementations must accept concurrent `enqueue` calls.
#[async_trait]
pub trait LogProducer: Send + Sync {
    async fn enqueue(&self, record: OutboundRecord) -> Result<DeliveryFuture, TransportError>;
}

/// Consumer-group subscription, owned by exactly one dispatcher
#[async_trait]
pub trait LogSubscription: Send {
    /// Next message; `None` once the subscription has ended for good
    async fn next_message(&mut self) -> Option<Result<InboundMessage, TransportError>>;
}
