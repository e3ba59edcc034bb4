use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use order_pipeline::codec::{decode_structured, encode_structured};
use order_pipeline::consumer::{DispatcherState, OrderEventDispatcher};
use order_pipeline::domain::order::{Address, Money, OrderCompletedEvent, OrderLineItem};
use order_pipeline::messaging::{InMemoryLog, LogProducer};
use order_pipeline::metrics::{consume_outcome, publish_outcome, Metrics};
use order_pipeline::persistence::{OrderRecordStore, OrderRecords, PersistError};
use order_pipeline::publishing::{LogOrderEventPublisher, OrderEventPublisher, PublishContext};

#[derive(Default)]
struct RecordingStore {
    writes: Mutex<Vec<OrderRecords>>,
}

#[async_trait]
impl OrderRecordStore for RecordingStore {
    async fn write_order_records(&self, records: &OrderRecords) -> Result<(), PersistError> {
        self.writes.lock().unwrap().push(records.clone());
        Ok(())
    }
}

fn order_123() -> OrderCompletedEvent {
    OrderCompletedEvent::new(
        "123",
        "trk-1",
        Money::new("USD", 5, 0).unwrap(),
        Address::new("123 Main St", "Anytown", "CA", "USA", "94016").unwrap(),
        vec![OrderLineItem::new("SKU-1", 2, Money::new("USD", 3, 0).unwrap()).unwrap()],
    )
    .unwrap()
}

#[tokio::test]
async fn published_order_is_persisted_exactly_once() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let log = Arc::new(InMemoryLog::new(16));
    let subscription = log.subscribe().unwrap();

    let store = Arc::new(RecordingStore::default());
    let dispatcher = Arc::new(OrderEventDispatcher::new(Some(store.clone()), metrics.clone()));
    let shutdown = CancellationToken::new();

    let run = tokio::spawn({
        let dispatcher = dispatcher.clone();
        let shutdown = shutdown.clone();
        async move { dispatcher.run(subscription, shutdown).await }
    });

    let producer: Arc<dyn LogProducer> = log.clone();
    let publisher = LogOrderEventPublisher::new(producer, "orders", metrics.clone());
    let event = order_123();

    publisher
        .publish_order_completed(&PublishContext::background().with_timeout(Duration::from_secs(5)), &event)
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while metrics.consumed(consume_outcome::PERSISTED) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("order was not persisted");

    shutdown.cancel();
    run.await.unwrap();

    let writes = store.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);

    let records = &writes[0];
    assert_eq!(records.order.order_id, "123");
    assert_eq!(records.items.len(), 1);
    assert_eq!(records.items[0].product_id, "SKU-1");
    assert_eq!(records.items[0].quantity, 2);
    assert_eq!(records.items[0].item_cost_currency_code, "USD");
    assert_eq!(records.items[0].item_cost_units, 3);
    assert_eq!(records.items[0].item_cost_nanos, 0);
    assert_eq!(records.shipping.shipping_tracking_id, "trk-1");
    assert_eq!(records.shipping.shipping_cost_units, 5);
    assert_eq!(records.shipping.street_address, "123 Main St");
    assert_eq!(records.shipping.zip_code, "94016");

    assert_eq!(log.sent_count(), 1);
    assert_eq!(metrics.published(publish_outcome::DELIVERED), 1);
    assert_eq!(dispatcher.state(), DispatcherState::Stopped);
}

#[tokio::test]
async fn structured_form_matches_contract_shape() {
    let event = order_123();
    let structured = encode_structured(&event);

    assert_eq!(structured["orderId"], "123");
    assert_eq!(structured["shippingCost"]["units"], 5);
    assert!(structured["shippingCost"]["units"].is_i64());
    assert_eq!(structured["items"][0]["item"]["productId"], "SKU-1");
    assert_eq!(structured["items"][0]["item"]["quantity"], 2);
    assert_eq!(decode_structured(&structured).unwrap(), event);
}
