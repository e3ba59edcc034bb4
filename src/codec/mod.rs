// ============================================================================
// Event Envelope Codec
// ============================================================================
//
// Bidirectional mapping between `OrderCompletedEvent` and its two
// serializations:
// - binary     - protobuf, what actually travels over the log
// - structured - camelCase JSON, what contracts describe and compare
//
// Both are generated from the structs in `wire`, so they share one schema.
//
// ============================================================================

mod binary;
mod errors;
mod structured;
pub mod wire;

pub use binary::{decode_binary, encode_binary, BINARY_CONTENT_TYPE};
pub use errors::DecodeError;
pub use structured::{
    decode_structured, decode_structured_bytes, encode_structured, encode_structured_bytes,
    STRUCTURED_CONTENT_TYPE,
};
