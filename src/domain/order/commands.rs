use super::value_objects::{Address, Money, OrderLineItem};

// ============================================================================
// Order Commands
// ============================================================================

/// Payment has been charged and the shipment booked; record the order as
/// complete and notify downstream services.
#[derive(Debug, Clone)]
pub struct CompleteOrder {
    /// Generated when absent
    pub order_id: Option<String>,
    pub shipping_tracking_id: String,
    pub shipping_cost: Money,
    pub shipping_address: Address,
    pub items: Vec<OrderLineItem>,
}
