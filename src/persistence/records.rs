use chrono::{DateTime, Utc};

use crate::domain::order::{Money, OrderCompletedEvent};
use super::errors::PersistError;

// ============================================================================
// Accounting records
// ============================================================================
//
// Flat rows derived from one OrderCompletedEvent, one struct per table:
//
//   "order"    - one header row per order
//   orderitem  - one row per line item, numbered in event order
//   shipping   - one row carrying tracking id, cost and address
//
// Money is flattened to (currency_code, units, nanos) columns.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub order_id: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub order_id: String,
    pub line_number: i32,
    pub product_id: String,
    pub quantity: i32,
    pub item_cost_currency_code: String,
    pub item_cost_units: i64,
    pub item_cost_nanos: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingRecord {
    pub shipping_tracking_id: String,
    pub order_id: String,
    pub shipping_cost_currency_code: String,
    pub shipping_cost_units: i64,
    pub shipping_cost_nanos: i32,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

/// Everything written for one order, as a single atomic unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecords {
    pub order: OrderRecord,
    pub items: Vec<OrderItemRecord>,
    pub shipping: ShippingRecord,
}

impl OrderRecords {
    pub fn from_event(event: &OrderCompletedEvent) -> Result<Self, PersistError> {
        Self::from_event_at(event, Utc::now())
    }

    /// Fails only when the line numbers no longer fit the `orderitem` column
    pub fn from_event_at(event: &OrderCompletedEvent, recorded_at: DateTime<Utc>) -> Result<Self, PersistError> {
        let order_id = event.order_id().to_string();

        let items = event
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let line_number = line_number(&order_id, index)?;
                let (currency_code, units, nanos) = flatten(item.cost());
                Ok(OrderItemRecord {
                    order_id: order_id.clone(),
                    line_number,
                    product_id: item.product_id().to_string(),
                    quantity: item.quantity(),
                    item_cost_currency_code: currency_code,
                    item_cost_units: units,
                    item_cost_nanos: nanos,
                })
            })
            .collect::<Result<Vec<_>, PersistError>>()?;

        let address = event.shipping_address();
        let (currency_code, units, nanos) = flatten(event.shipping_cost());
        let shipping = ShippingRecord {
            shipping_tracking_id: event.shipping_tracking_id().to_string(),
            order_id: order_id.clone(),
            shipping_cost_currency_code: currency_code,
            shipping_cost_units: units,
            shipping_cost_nanos: nanos,
            street_address: address.street_address().to_string(),
            city: address.city().to_string(),
            state: address.state().to_string(),
            country: address.country().to_string(),
            zip_code: address.zip_code().to_string(),
        };

        Ok(Self {
            order: OrderRecord { order_id, recorded_at },
            items,
            shipping,
        })
    }

    pub fn order_id(&self) -> &str {
        &self.order.order_id
    }
}

fn line_number(order_id: &str, index: usize) -> Result<i32, PersistError> {
    i32::try_from(index)
        .map_err(|_| PersistError::Other(format!("order {order_id}: line item {index} exceeds orderitem line_number")))
}

fn flatten(money: &Money) -> (String, i64, i32) {
    (money.currency_code().to_string(), money.units(), money.nanos())
}
