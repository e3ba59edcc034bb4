// ============================================================================
// Codec Errors
// ============================================================================
//
// Always recoverable: the consumer discards the message and keeps listening.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed order envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
}

impl DecodeError {
    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::MalformedEnvelope(_) => "malformed_envelope",
            DecodeError::MissingRequiredField(_) => "missing_required_field",
        }
    }
}
