//! Order completion pipeline: checkout announces completed orders over a
//! partitioned log, accounting consumes and records them.
//!
//! ```text
//! OrderCompletionHandler -> OrderEventPublisher -> (LogOrderEventPublisher | NoOpOrderEventPublisher)
//!     -> log transport -> OrderEventDispatcher -> OrderRecordStore
//! ```

pub mod codec;
pub mod config;
pub mod consumer;
pub mod contract;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod persistence;
pub mod publishing;
pub mod utils;
