// ============================================================================
// Order Domain
// ============================================================================
//
// Everything the checkout side knows about a completed order:
// - Value objects (Money, Address, OrderLineItem)
// - The OrderCompletedEvent handed across the service boundary
// - Validation errors
// - The CompleteOrder command and its handler, which hands the event to
//   the publisher port
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod command_handler;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use command_handler::*;
