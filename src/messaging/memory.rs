use async_trait::async_trait;
use futures_util::FutureExt;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

use super::transport::{
    DeliveryAck, DeliveryFuture, InboundMessage, LogProducer, LogSubscription, OutboundRecord,
    TransportError,
};

// ============================================================================
// In-Memory Log
// ============================================================================
//
// A single-partition log living inside the process. `enqueue` waits for
// room when the log is at capacity, the same backpressure a broker client
// applies with a full local queue. Used for broker-less local runs and for
// end-to-end tests of the publish -> consume path.
//
// ============================================================================

pub struct InMemoryLog {
    sender: mpsc::Sender<InboundMessage>,
    receiver: Mutex<Option<mpsc::Receiver<InboundMessage>>>,
    next_offset: AtomicI64,
    sent: AtomicUsize,
}

impl InMemoryLog {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            next_offset: AtomicI64::new(0),
            sent: AtomicUsize::new(0),
        }
    }

    /// Take the only subscription. Returns `None` if it was already taken.
    pub fn subscribe(&self) -> Option<InMemorySubscription> {
        let mut receiver = self.receiver.lock().ok()?;
        receiver.take().map(|receiver| InMemorySubscription { receiver })
    }

    /// Number of records accepted so far
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogProducer for InMemoryLog {
    async fn enqueue(&self, record: OutboundRecord) -> Result<DeliveryFuture, TransportError> {
        let permit = self
            .sender
            .reserve()
            .await
            .map_err(|_| TransportError::Unavailable("in-memory log has no subscriber".to_string()))?;

        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        permit.send(InboundMessage {
            topic: record.topic,
            partition: 0,
            offset,
            payload: record.payload,
            headers: record.headers,
        });
        self.sent.fetch_add(1, Ordering::SeqCst);

        Ok(async move { Ok(DeliveryAck::new(format!("partition=0 offset={offset}"))) }.boxed())
    }
}

pub struct InMemorySubscription {
    receiver: mpsc::Receiver<InboundMessage>,
}

#[async_trait]
impl LogSubscription for InMemorySubscription {
    async fn next_message(&mut self) -> Option<Result<InboundMessage, TransportError>> {
        self.receiver.recv().await.map(Ok)
    }
}
