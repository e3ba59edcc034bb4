use async_trait::async_trait;
use futures_util::FutureExt;
use rdkafka::{
    config::ClientConfig,
    consumer::{Consumer, StreamConsumer},
    error::KafkaError,
    message::{Header, Headers, OwnedHeaders},
    producer::{FutureProducer, FutureRecord},
    types::RDKafkaErrorCode,
    Message,
};
use std::time::Duration;

use super::transport::{
    DeliveryAck, DeliveryFuture, InboundMessage, LogProducer, LogSubscription, OutboundRecord,
    TransportError,
};

// ============================================================================
// Redpanda / Kafka transport (rdkafka)
// ============================================================================

/// How long to wait before offering a record again when librdkafka's local
/// queue is full
const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(100);

pub struct RedpandaProducer {
    producer: FutureProducer,
}

impl RedpandaProducer {
    pub fn new(brokers: &str) -> Result<Self, TransportError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            // one send attempt per publish; failures surface to the caller
            .set("message.send.max.retries", "0")
            .create()
            .map_err(|e| TransportError::Unavailable(format!("failed to create Redpanda producer: {e}")))?;

        tracing::info!(brokers = %brokers, "Redpanda producer created");

        Ok(Self { producer })
    }
}

#[async_trait]
impl LogProducer for RedpandaProducer {
    async fn enqueue(&self, record: OutboundRecord) -> Result<DeliveryFuture, TransportError> {
        let delivery = loop {
            let headers = record
                .headers
                .iter()
                .fold(OwnedHeaders::new(), |headers, (key, value)| {
                    headers.insert(Header {
                        key: key.as_str(),
                        value: Some(value.as_str()),
                    })
                });

            let kafka_record = FutureRecord::<(), [u8]>::to(&record.topic)
                .payload(&record.payload[..])
                .headers(headers);

            // Evaluate before any await so the borrowed record is gone
            let attempt = self.producer.send_result(kafka_record).map_err(|(error, _)| error);

            match attempt {
                Ok(delivery) => break delivery,
                Err(KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull)) => {
                    tracing::debug!(topic = %record.topic, "Producer queue full, waiting for space");
                    tokio::time::sleep(QUEUE_FULL_BACKOFF).await;
                }
                Err(error) => return Err(TransportError::Enqueue(error.to_string())),
            }
        };

        Ok(async move {
            match delivery.await {
                Ok(Ok(delivery)) => Ok(DeliveryAck::new(format!("{delivery:?}"))),
                Ok(Err((error, _message))) => Err(TransportError::Delivery(error.to_string())),
                Err(_) => Err(TransportError::Delivery(
                    "producer dropped before reporting delivery".to_string(),
                )),
            }
        }
        .boxed())
    }
}

pub struct RedpandaSubscription {
    consumer: StreamConsumer,
}

impl RedpandaSubscription {
    pub fn subscribe(brokers: &str, topic: &str, group: &str) -> Result<Self, TransportError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| TransportError::Unavailable(format!("failed to create Redpanda consumer: {e}")))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| TransportError::Unavailable(format!("failed to subscribe to {topic}: {e}")))?;

        tracing::info!(
            brokers = %brokers,
            topic = %topic,
            group = %group,
            "Subscribed to Redpanda topic"
        );

        Ok(Self { consumer })
    }
}

#[async_trait]
impl LogSubscription for RedpandaSubscription {
    async fn next_message(&mut self) -> Option<Result<InboundMessage, TransportError>> {
        let received = match self.consumer.recv().await {
            Ok(message) => Ok(InboundMessage {
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
                payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
                headers: message
                    .headers()
                    .map(|headers| {
                        headers
                            .iter()
                            .filter_map(|header| {
                                let value = std::str::from_utf8(header.value?).ok()?;
                                Some((header.key.to_string(), value.to_string()))
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            }),
            Err(error) => Err(TransportError::Receive(error.to_string())),
        };

        Some(received)
    }
}
