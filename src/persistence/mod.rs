mod errors;
mod postgres;
mod records;

use async_trait::async_trait;

pub use errors::PersistError;
pub use postgres::PgOrderRecordStore;
pub use records::{OrderItemRecord, OrderRecord, OrderRecords, ShippingRecord};

/// Accounting side effect applied by the dispatcher to each decoded order.
///
/// One call writes every record for one order or none of them.
#[async_trait]
pub trait OrderRecordStore: Send + Sync {
    async fn write_order_records(&self, records: &OrderRecords) -> Result<(), PersistError>;
}
