use serde::Deserialize;

use crate::domain::order::{Address, Money, OrderCompletedEvent, OrderEventError, OrderLineItem};
use super::errors::DecodeError;

// ============================================================================
// Wire Schema
// ============================================================================
//
// These structs are the protobuf `OrderResult` message the checkout service
// puts on the log (prost tags below). The same structs deserialize the
// camelCase JSON form used for contract description, after the structured
// codec has checked every required key is present with the right shape.
//
// Absent fields take protobuf zero values on the binary path only; the
// required-field check after decode turns those into MissingRequiredField.
//
// ============================================================================

#[derive(Clone, PartialEq, prost::Message, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrderResult {
    #[prost(string, tag = "1")]
    pub order_id: String,
    #[prost(string, tag = "2")]
    pub shipping_tracking_id: String,
    #[prost(message, optional, tag = "3")]
    pub shipping_cost: Option<WireMoney>,
    #[prost(message, optional, tag = "4")]
    pub shipping_address: Option<WireAddress>,
    #[prost(message, repeated, tag = "5")]
    pub items: Vec<WireOrderItem>,
}

#[derive(Clone, PartialEq, prost::Message, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMoney {
    #[prost(string, tag = "1")]
    pub currency_code: String,
    #[prost(int64, tag = "2")]
    pub units: i64,
    #[prost(int32, tag = "3")]
    pub nanos: i32,
}

#[derive(Clone, PartialEq, prost::Message, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAddress {
    #[prost(string, tag = "1")]
    pub street_address: String,
    #[prost(string, tag = "2")]
    pub city: String,
    #[prost(string, tag = "3")]
    pub state: String,
    #[prost(string, tag = "4")]
    pub country: String,
    #[prost(string, tag = "5")]
    pub zip_code: String,
}

#[derive(Clone, PartialEq, prost::Message, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCartItem {
    #[prost(string, tag = "1")]
    pub product_id: String,
    #[prost(int32, tag = "2")]
    pub quantity: i32,
}

#[derive(Clone, PartialEq, prost::Message, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrderItem {
    #[prost(message, optional, tag = "1")]
    pub item: Option<WireCartItem>,
    #[prost(message, optional, tag = "2")]
    pub cost: Option<WireMoney>,
}

// ============================================================================
// Domain -> Wire
// ============================================================================

impl From<&Money> for WireMoney {
    fn from(money: &Money) -> Self {
        Self {
            currency_code: money.currency_code().to_string(),
            units: money.units(),
            nanos: money.nanos(),
        }
    }
}

impl From<&Address> for WireAddress {
    fn from(address: &Address) -> Self {
        Self {
            street_address: address.street_address().to_string(),
            city: address.city().to_string(),
            state: address.state().to_string(),
            country: address.country().to_string(),
            zip_code: address.zip_code().to_string(),
        }
    }
}

impl From<&OrderLineItem> for WireOrderItem {
    fn from(item: &OrderLineItem) -> Self {
        Self {
            item: Some(WireCartItem {
                product_id: item.product_id().to_string(),
                quantity: item.quantity(),
            }),
            cost: Some(WireMoney::from(item.cost())),
        }
    }
}

impl From<&OrderCompletedEvent> for WireOrderResult {
    fn from(event: &OrderCompletedEvent) -> Self {
        Self {
            order_id: event.order_id().to_string(),
            shipping_tracking_id: event.shipping_tracking_id().to_string(),
            shipping_cost: Some(WireMoney::from(event.shipping_cost())),
            shipping_address: Some(WireAddress::from(event.shipping_address())),
            items: event.items().iter().map(WireOrderItem::from).collect(),
        }
    }
}

// ============================================================================
// Wire -> Domain
// ============================================================================

/// Map a domain validation failure onto the codec taxonomy, qualifying
/// field names with the path of the enclosing message.
fn field_error(path: &str, error: OrderEventError) -> DecodeError {
    let qualify = |field: &str| {
        if path.is_empty() {
            field.to_string()
        } else {
            format!("{path}.{field}")
        }
    };

    match error {
        OrderEventError::EmptyField(field) => DecodeError::MissingRequiredField(qualify(field)),
        OrderEventError::EmptyItems => DecodeError::MissingRequiredField(qualify("items")),
        other if path.is_empty() => DecodeError::MalformedEnvelope(other.to_string()),
        other => DecodeError::MalformedEnvelope(format!("{path}: {other}")),
    }
}

fn required<T>(value: Option<T>, path: &str) -> Result<T, DecodeError> {
    value.ok_or_else(|| DecodeError::MissingRequiredField(path.to_string()))
}

fn money_from_wire(wire: Option<WireMoney>, path: &str) -> Result<Money, DecodeError> {
    let wire = required(wire, path)?;
    Money::new(wire.currency_code, wire.units, wire.nanos).map_err(|e| field_error(path, e))
}

impl TryFrom<WireOrderResult> for OrderCompletedEvent {
    type Error = DecodeError;

    fn try_from(wire: WireOrderResult) -> Result<Self, Self::Error> {
        // Top-level ids first so the error names the outermost missing field
        if wire.order_id.is_empty() {
            return Err(DecodeError::MissingRequiredField("orderId".to_string()));
        }
        if wire.shipping_tracking_id.is_empty() {
            return Err(DecodeError::MissingRequiredField("shippingTrackingId".to_string()));
        }

        let shipping_cost = money_from_wire(wire.shipping_cost, "shippingCost")?;

        let address = required(wire.shipping_address, "shippingAddress")?;
        let shipping_address = Address::new(
            address.street_address,
            address.city,
            address.state,
            address.country,
            address.zip_code,
        )
        .map_err(|e| field_error("shippingAddress", e))?;

        if wire.items.is_empty() {
            return Err(DecodeError::MissingRequiredField("items".to_string()));
        }

        let items = wire
            .items
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                let path = format!("items[{index}]");
                let cart_item = required(line.item, &format!("{path}.item"))?;
                let cost = money_from_wire(line.cost, &format!("{path}.cost"))?;
                OrderLineItem::new(cart_item.product_id, cart_item.quantity, cost)
                    .map_err(|e| field_error(&format!("{path}.item"), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        OrderCompletedEvent::new(
            wire.order_id,
            wire.shipping_tracking_id,
            shipping_cost,
            shipping_address,
            items,
        )
        .map_err(|e| field_error("", e))
    }
}
