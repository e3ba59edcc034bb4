//! Message-contract description of the order event.
//!
//! The structured codec form is the shape consumers verify against; this
//! module renders it as a message pact and checks documents for the
//! top-level keys every consumer relies on.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::codec::{encode_structured, STRUCTURED_CONTENT_TYPE};
use crate::domain::order::OrderCompletedEvent;

pub const CONSUMER_NAME: &str = "accounting-consumer";
pub const PROVIDER_NAME: &str = "checkout-provider";
pub const INTERACTION_DESCRIPTION: &str = "order-result message";
pub const PROVIDER_STATE: &str = "An order has been successfully processed";

pub const REQUIRED_FIELDS: [&str; 5] = [
    "orderId",
    "shippingTrackingId",
    "shippingCost",
    "shippingAddress",
    "items",
];

/// Render `event` as a V4 message pact between the accounting consumer and
/// the checkout provider
pub fn order_result_pact(event: &OrderCompletedEvent) -> Value {
    json!({
        "consumer": { "name": CONSUMER_NAME },
        "provider": { "name": PROVIDER_NAME },
        "interactions": [{
            "type": "Asynchronous/Messages",
            "description": INTERACTION_DESCRIPTION,
            "providerStates": [{ "name": PROVIDER_STATE }],
            "contents": {
                "contentType": STRUCTURED_CONTENT_TYPE,
                "encoded": false,
                "content": encode_structured(event),
            },
            "metadata": { "contentType": STRUCTURED_CONTENT_TYPE },
        }],
        "metadata": {
            "pactSpecification": { "version": "4.0" },
        },
    })
}

/// Required top-level keys that are absent or null in `message`
pub fn missing_required_fields(message: &Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| message.get(field).map_or(true, Value::is_null))
        .collect()
}

pub fn pact_file_name() -> String {
    format!("{CONSUMER_NAME}-{PROVIDER_NAME}.json")
}

/// Write `pact` into `dir`, creating the directory if needed
pub fn write_pact(dir: impl AsRef<Path>, pact: &Value) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create pact directory {}", dir.display()))?;

    let path = dir.join(pact_file_name());
    let body = serde_json::to_vec_pretty(pact).context("Failed to serialize pact")?;
    std::fs::write(&path, body).with_context(|| format!("Failed to write pact file {}", path.display()))?;

    tracing::info!(path = %path.display(), "Message pact written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_structured;
    use crate::domain::order::{Address, Money, OrderLineItem};

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
    fn test_pact_document_shape() {
        let pact = order_result_pact(&sample_event());

        assert_eq!(pact["consumer"]["name"], "accounting-consumer");
        assert_eq!(pact["provider"]["name"], "checkout-provider");

        let interaction = &pact["interactions"][0];
        assert_eq!(interaction["description"], "order-result message");
        assert_eq!(interaction["providerStates"][0]["name"], PROVIDER_STATE);
        assert_eq!(interaction["contents"]["contentType"], "application/json");

        let content = &interaction["contents"]["content"];
        assert!(content["shippingCost"]["units"].is_i64());
        assert!(content["items"][0]["cost"]["units"].is_i64());
        assert_eq!(content["shippingCost"]["nanos"], 0);
        assert!(missing_required_fields(content).is_empty());
        assert_eq!(decode_structured(content).unwrap(), sample_event());
    }

    #[test]
    fn test_missing_required_fields() {
        let message = json!({
            "orderId": "123",
            "shippingCost": null,
            "items": [],
        });

        assert_eq!(
            missing_required_fields(&message),
            vec!["shippingTrackingId", "shippingCost", "shippingAddress"]
        );
        assert_eq!(missing_required_fields(&json!("order")).len(), 5);
    }

    #[test]
    fn test_write_pact_round_trips() {
        let dir = std::env::temp_dir().join(format!("pacts-{}", uuid::Uuid::new_v4()));
        let pact = order_result_pact(&sample_event());

        let path = write_pact(&dir, &pact).unwrap();

        assert!(path.ends_with("accounting-consumer-checkout-provider.json"));
        let written: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, pact);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
