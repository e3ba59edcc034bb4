// ============================================================================
// Order Event Validation Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderEventError {
    #[error("Required field is empty: {0}")]
    EmptyField(&'static str),

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Nanos out of range [0, 999999999]: {0}")]
    NanosOutOfRange(i32),

    #[error("Nanos sign does not match units: units={units}, nanos={nanos}")]
    SignMismatch { units: i64, nanos: i32 },
}
