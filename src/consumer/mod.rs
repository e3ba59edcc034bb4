mod dispatcher;

pub use dispatcher::{DispatcherState, MessageOutcome, OrderEventDispatcher};
