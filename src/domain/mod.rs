// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Orders are the only aggregate this service knows about. The domain owns
// validation and the completion workflow; transports, codecs and storage
// live outside and are reached through ports.
//
// ============================================================================

pub mod order;
