use prost::Message;

use crate::domain::order::OrderCompletedEvent;
use super::errors::DecodeError;
use super::wire::WireOrderResult;

/// Content type advertised in transport headers for the binary form
pub const BINARY_CONTENT_TYPE: &str = "application/x-protobuf";

/// Encode an event to its compact protobuf form.
///
/// The output is deterministic: the schema has no maps, and fields are
/// always written in tag order.
pub fn encode_binary(event: &OrderCompletedEvent) -> Vec<u8> {
    WireOrderResult::from(event).encode_to_vec()
}

/// Decode protobuf bytes back into a validated event.
pub fn decode_binary(bytes: &[u8]) -> Result<OrderCompletedEvent, DecodeError> {
    let wire = WireOrderResult::decode(bytes)
        .map_err(|e| DecodeError::MalformedEnvelope(e.to_string()))?;

    OrderCompletedEvent::try_from(wire)
}
