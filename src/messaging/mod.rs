// ============================================================================
// Messaging - log transport plumbing
// ============================================================================
//
// - transport - traits and record types shared by every transport
// - redpanda  - Kafka-protocol transport backed by rdkafka
// - memory    - in-process log for local runs and tests
//
// ============================================================================

mod memory;
mod redpanda;
mod transport;

pub use memory::{InMemoryLog, InMemorySubscription};
pub use redpanda::{RedpandaProducer, RedpandaSubscription};
pub use transport::{
    new_traceparent, DeliveryAck, DeliveryFuture, InboundMessage, LogProducer, LogSubscription,
    OutboundRecord, TransportError, TRACEPARENT_HEADER,
};
