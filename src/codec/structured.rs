use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::order::OrderCompletedEvent;
use super::errors::DecodeError;
use super::wire::{WireAddress, WireMoney, WireOrderItem, WireOrderResult};

/// Content type advertised for the structured form
pub const STRUCTURED_CONTENT_TYPE: &str = "application/json";

/// Encode an event to its field-named structured form.
///
/// Every key is present (zero `nanos` included) and every `units` value is a
/// JSON integer, never a decimal string.
pub fn encode_structured(event: &OrderCompletedEvent) -> Value {
    let wire = WireOrderResult::from(event);

    json!({
        "orderId": wire.order_id,
        "shippingTrackingId": wire.shipping_tracking_id,
        "shippingCost": wire.shipping_cost.as_ref().map(money_json),
        "shippingAddress": wire.shipping_address.as_ref().map(address_json),
        "items": wire.items.iter().map(item_json).collect::<Vec<_>>(),
    })
}

fn money_json(money: &WireMoney) -> Value {
    json!({
        "currencyCode": money.currency_code,
        "units": money.units,
        "nanos": money.nanos,
    })
}

fn address_json(address: &WireAddress) -> Value {
    json!({
        "streetAddress": address.street_address,
        "city": address.city,
        "state": address.state,
        "country": address.country,
        "zipCode": address.zip_code,
    })
}

fn item_json(line: &WireOrderItem) -> Value {
    json!({
        "item": line.item.as_ref().map(|item| json!({
            "productId": item.product_id,
            "quantity": item.quantity,
        })),
        "cost": line.cost.as_ref().map(money_json),
    })
}

/// Decode a structured value. Unknown keys are ignored.
pub fn decode_structured(value: &Value) -> Result<OrderCompletedEvent, DecodeError> {
    if !value.is_object() {
        return Err(DecodeError::MalformedEnvelope(format!(
            "expected a JSON object, got {}",
            json_type_name(value)
        )));
    }

    check_required(value)?;

    let wire = WireOrderResult::deserialize(value)
        .map_err(|e| DecodeError::MalformedEnvelope(e.to_string()))?;

    OrderCompletedEvent::try_from(wire)
}

/// Encode straight to JSON text
pub fn encode_structured_bytes(event: &OrderCompletedEvent) -> Vec<u8> {
    encode_structured(event).to_string().into_bytes()
}

/// Decode from JSON text
pub fn decode_structured_bytes(bytes: &[u8]) -> Result<OrderCompletedEvent, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| DecodeError::MalformedEnvelope(e.to_string()))?;
    decode_structured(&value)
}

// ============================================================================
// Required keys
// ============================================================================
//
// Walks the raw value before deserializing. A key that is absent, null or of
// the wrong JSON type (e.g. `units: "5"`) is MissingRequiredField with its
// path; an integer outside the field's range is MalformedEnvelope. Empty
// strings and empty `items` pass here and are rejected by domain validation.
//
// ============================================================================

const ADDRESS_FIELDS: [&str; 5] = ["streetAddress", "city", "state", "country", "zipCode"];

fn check_required(root: &Value) -> Result<(), DecodeError> {
    require_string(root, "", "orderId")?;
    require_string(root, "", "shippingTrackingId")?;
    require_money(root, "", "shippingCost")?;

    let address = require_object(root, "", "shippingAddress")?;
    for key in ADDRESS_FIELDS {
        require_string(address, "shippingAddress", key)?;
    }

    let items = require_field(root, "", "items")?
        .as_array()
        .ok_or_else(|| missing("items".to_string()))?;

    for (index, line) in items.iter().enumerate() {
        let path = format!("items[{index}]");
        if !line.is_object() {
            return Err(missing(path));
        }

        let item = require_object(line, &path, "item")?;
        let item_path = format!("{path}.item");
        require_string(item, &item_path, "productId")?;
        require_integer(item, &item_path, "quantity", i32::MIN.into(), i32::MAX.into())?;

        require_money(line, &path, "cost")?;
    }

    Ok(())
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn missing(path: String) -> DecodeError {
    DecodeError::MissingRequiredField(path)
}

fn require_field<'a>(parent: &'a Value, path: &str, key: &str) -> Result<&'a Value, DecodeError> {
    parent
        .get(key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| missing(join(path, key)))
}

fn require_object<'a>(parent: &'a Value, path: &str, key: &str) -> Result<&'a Value, DecodeError> {
    let value = require_field(parent, path, key)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(missing(join(path, key)))
    }
}

fn require_string(parent: &Value, path: &str, key: &str) -> Result<(), DecodeError> {
    if require_field(parent, path, key)?.is_string() {
        Ok(())
    } else {
        Err(missing(join(path, key)))
    }
}

fn require_integer(parent: &Value, path: &str, key: &str, min: i64, max: i64) -> Result<(), DecodeError> {
    let value = require_field(parent, path, key)?;
    if !(value.is_i64() || value.is_u64()) {
        return Err(missing(join(path, key)));
    }

    match value.as_i64() {
        Some(n) if (min..=max).contains(&n) => Ok(()),
        _ => Err(DecodeError::MalformedEnvelope(format!(
            "{}: {value} is out of range",
            join(path, key)
        ))),
    }
}

fn require_money(parent: &Value, path: &str, key: &str) -> Result<(), DecodeError> {
    let money = require_object(parent, path, key)?;
    let money_path = join(path, key);

    require_string(money, &money_path, "currencyCode")?;
    require_integer(money, &money_path, "units", i64::MIN, i64::MAX)?;
    require_integer(money, &money_path, "nanos", i32::MIN.into(), i32::MAX.into())?;
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Address, Money, OrderLineItem};
    use serde_json::json;

    fn sample_event() -> OrderCompletedEvent {
        OrderCompletedEvent::new(
            "123",
            "trk-1",
            Money::new("USD", 5, 0).unwrap(),
            Address::new("123 Main St", "Anytown", "CA", "USA", "94016").unwrap(),
            vec![OrderLineItem::new("SKU-1", 2, Money::new("USD", 3, 0).unwrap()).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_structured_shape_matches_contract() {
        let value = encode_structured(&sample_event());

        assert_eq!(
            value,
            json!({
                "orderId": "123",
                "shippingTrackingId": "trk-1",
                "shippingCost": { "currencyCode": "USD", "units": 5, "nanos": 0 },
                "shippingAddress": {
                    "streetAddress": "123 Main St",
                    "city": "Anytown",
                    "state": "CA",
                    "country": "USA",
                    "zipCode": "94016"
                },
                "items": [
                    {
                        "item": { "productId": "SKU-1", "quantity": 2 },
                        "cost": { "currencyCode": "USD", "units": 3, "nanos": 0 }
                    }
                ]
            })
        );
    }

    #[test]
    fn test_units_are_numbers_not_strings() {
        let event = OrderCompletedEvent::new(
            "order-wide",
            "trk-wide",
            Money::new("USD", i64::MAX, 1).unwrap(),
            Address::new("1 Long Rd", "Big City", "NY", "USA", "10001").unwrap(),
            vec![OrderLineItem::new("SKU-9", 1, Money::new("USD", -42, 0).unwrap()).unwrap()],
        )
        .unwrap();

        let value = encode_structured(&event);

        assert!(value["shippingCost"]["units"].is_i64());
        assert_eq!(value["shippingCost"]["units"].as_i64(), Some(i64::MAX));
        assert!(value["items"][0]["cost"]["units"].is_i64());
        assert_eq!(value["items"][0]["cost"]["units"].as_i64(), Some(-42));
    }

    #[test]
    fn test_structured_round_trip() {
        let event = sample_event();
        assert_eq!(decode_structured(&encode_structured(&event)).unwrap(), event);
        assert_eq!(decode_structured_bytes(&encode_structured_bytes(&event)).unwrap(), event);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut value = encode_structured(&sample_event());
        value["promotionCode"] = json!("SPRING");
        value["shippingAddress"]["apartment"] = json!("4B");

        assert_eq!(decode_structured(&value).unwrap(), sample_event());
    }

    #[test]
    fn test_missing_shipping_address_is_rejected() {
        let mut value = encode_structured(&sample_event());
        value.as_object_mut().unwrap().remove("shippingAddress");

        let result = decode_structured(&value);
        assert_eq!(result, Err(DecodeError::MissingRequiredField("shippingAddress".to_string())));
    }

    #[test]
    fn test_null_shipping_cost_is_rejected() {
        let mut value = encode_structured(&sample_event());
        value["shippingCost"] = Value::Null;

        let result = decode_structured(&value);
        assert_eq!(result, Err(DecodeError::MissingRequiredField("shippingCost".to_string())));
    }

    #[test]
    fn test_stringified_units_are_rejected() {
        let mut value = encode_structured(&sample_event());
        value["shippingCost"]["units"] = json!("5");

        let result = decode_structured(&value);
        assert_eq!(result, Err(DecodeError::MissingRequiredField("shippingCost.units".to_string())));
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let mut value = encode_structured(&sample_event());
        value["shippingAddress"] = json!("123 Main St, Anytown");

        let result = decode_structured(&value);
        assert_eq!(result, Err(DecodeError::MissingRequiredField("shippingAddress".to_string())));
    }

    #[test]
    fn test_absent_money_numbers_are_missing() {
        let mut value = encode_structured(&sample_event());
        value["shippingCost"].as_object_mut().unwrap().remove("units");

        let result = decode_structured(&value);
        assert_eq!(result, Err(DecodeError::MissingRequiredField("shippingCost.units".to_string())));

        let mut value = encode_structured(&sample_event());
        value["items"][0]["cost"].as_object_mut().unwrap().remove("nanos");

        let result = decode_structured(&value);
        assert_eq!(result, Err(DecodeError::MissingRequiredField("items[0].cost.nanos".to_string())));
    }

    #[test]
    fn test_currency_only_cost_is_not_zero() {
        let mut value = encode_structured(&sample_event());
        value["shippingCost"] = json!({ "currencyCode": "USD" });

        assert!(matches!(decode_structured(&value), Err(DecodeError::MissingRequiredField(_))));
    }

    #[test]
    fn test_absent_quantity_is_missing() {
        let mut value = encode_structured(&sample_event());
        value["items"][0]["item"].as_object_mut().unwrap().remove("quantity");

        let result = decode_structured(&value);
        assert_eq!(result, Err(DecodeError::MissingRequiredField("items[0].item.quantity".to_string())));
    }

    #[test]
    fn test_invalid_quantity_is_malformed_with_path() {
        let mut value = encode_structured(&sample_event());
        value["items"][0]["item"]["quantity"] = json!(0);

        match decode_structured(&value) {
            Err(DecodeError::MalformedEnvelope(reason)) => assert!(reason.starts_with("items[0].item: ")),
            other => panic!("expected MalformedEnvelope, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_nanos_is_malformed() {
        let mut value = encode_structured(&sample_event());
        value["shippingCost"]["nanos"] = json!(5_000_000_000i64);

        assert!(matches!(decode_structured(&value), Err(DecodeError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_empty_items_are_missing() {
        let mut value = encode_structured(&sample_event());
        value["items"] = json!([]);

        let result = decode_structured(&value);
        assert_eq!(result, Err(DecodeError::MissingRequiredField("items".to_string())));
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(matches!(decode_structured(&json!([1, 2, 3])), Err(DecodeError::MalformedEnvelope(_))));
        assert!(matches!(decode_structured_bytes(b"{not json"), Err(DecodeError::MalformedEnvelope(_))));
    }
}
