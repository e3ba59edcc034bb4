use super::errors::OrderEventError;
use super::value_objects::{Address, Money, OrderLineItem};

// ============================================================================
// Order Completed Event
// ============================================================================
//
// The unit of communication between checkout (producer) and accounting
// (consumer). Built once when payment and shipment are final, handed to the
// publisher port exactly once, never mutated afterwards.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCompletedEvent {
    order_id: String,
    shipping_tracking_id: String,
    shipping_cost: Money,
    shipping_address: Address,
    items: Vec<OrderLineItem>,
}

impl OrderCompletedEvent {
    pub fn new(
        order_id: impl Into<String>,
        shipping_tracking_id: impl Into<String>,
        shipping_cost: Money,
        shipping_address: Address,
        items: Vec<OrderLineItem>,
    ) -> Result<Self, OrderEventError> {
        let order_id = order_id.into();
        let shipping_tracking_id = shipping_tracking_id.into();

        if order_id.is_empty() {
            return Err(OrderEventError::EmptyField("orderId"));
        }
        if shipping_tracking_id.is_empty() {
            return Err(OrderEventError::EmptyField("shippingTrackingId"));
        }
        if items.is_empty() {
            return Err(OrderEventError::EmptyItems);
        }

        Ok(Self {
            order_id,
            shipping_tracking_id,
            shipping_cost,
            shipping_address,
            items,
        })
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn shipping_tracking_id(&self) -> &str {
        &self.shipping_tracking_id
    }

    pub fn shipping_cost(&self) -> &Money {
        &self.shipping_cost
    }

    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    pub fn items(&self) -> &[OrderLineItem] {
        &self.items
    }

    /// Stable name used for metric labels and log fields
    pub fn event_type() -> &'static str {
        "OrderCompleted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address::new("123 Main St", "Anytown", "CA", "USA", "94016").unwrap()
    }

    fn item() -> OrderLineItem {
        OrderLineItem::new("SKU-1", 2, Money::new("USD", 3, 0).unwrap()).unwrap()
    }

    #[test]
    fn test_event_creation() {
        let event = OrderCompletedEvent::new(
            "123",
            "trk-1",
            Money::new("USD", 5, 0).unwrap(),
            address(),
            vec![item()],
        )
        .unwrap();

        assert_eq!(event.order_id(), "123");
        assert_eq!(event.shipping_tracking_id(), "trk-1");
        assert_eq!(event.shipping_cost().units(), 5);
        assert_eq!(event.shipping_address().city(), "Anytown");
        assert_eq!(event.items().len(), 1);
    }

    #[test]
    fn test_event_rejects_empty_items() {
        let result = OrderCompletedEvent::new(
            "123",
            "trk-1",
            Money::new("USD", 5, 0).unwrap(),
            address(),
            vec![],
        );
        assert_eq!(result, Err(OrderEventError::EmptyItems));
    }

    #[test]
    fn test_event_rejects_empty_ids() {
        let result = OrderCompletedEvent::new("", "trk-1", Money::new("USD", 5, 0).unwrap(), address(), vec![item()]);
        assert_eq!(result, Err(OrderEventError::EmptyField("orderId")));

        let result = OrderCompletedEvent::new("123", "", Money::new("USD", 5, 0).unwrap(), address(), vec![item()]);
        assert_eq!(result, Err(OrderEventError::EmptyField("shippingTrackingId")));
    }
}
