use std::sync::Arc;
use uuid::Uuid;
use anyhow::{Context, Result};

use crate::publishing::{OrderEventPublisher, PublishContext};

use super::commands::CompleteOrder;
use super::events::OrderCompletedEvent;

// ============================================================================
// Order Completion Handler
// ============================================================================
//
// Orchestrates: Command → validated OrderCompletedEvent → Publisher port
//
// Publishes exactly once. A transport that is unavailable is logged and the
// order still completes; any other publish failure is returned to the caller,
// who decides whether to retry.
//
// ============================================================================

pub struct OrderCompletionHandler {
    publisher: Arc<dyn OrderEventPublisher>,
}

impl OrderCompletionHandler {
    pub fn new(publisher: Arc<dyn OrderEventPublisher>) -> Self {
        Self { publisher }
    }

    /// Handle a command and announce the resulting event
    pub async fn handle(&self, ctx: &PublishContext, command: CompleteOrder) -> Result<OrderCompletedEvent> {
        let order_id = command
            .order_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let event = OrderCompletedEvent::new(
            order_id,
            command.shipping_tracking_id,
            command.shipping_cost,
            command.shipping_address,
            command.items,
        )
        .context("Invalid completed order")?;

        match self.publisher.publish_order_completed(ctx, &event).await {
            Ok(()) => {
                tracing::info!(order_id = %event.order_id(), "Order completed and announced");
            }
            Err(e) if e.is_degraded() => {
                tracing::warn!(
                    order_id = %event.order_id(),
                    error = %e,
                    "Order completed but event could not be published"
                );
            }
            Err(e) => {
                tracing::error!(order_id = %event.order_id(), error = %e, "Failed to publish order event");
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to publish completion of order {}", event.order_id())));
            }
        }

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Address, Money, OrderLineItem};
    use crate::publishing::{Delivery, PublishError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every event it sees and answers with a fixed result
    struct RecordingPublisher {
        response: Result<(), PublishError>,
        seen: Mutex<Vec<OrderCompletedEvent>>,
    }

    impl RecordingPublisher {
        fn answering(response: Result<(), PublishError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl OrderEventPublisher for RecordingPublisher {
        async fn publish_order_completed(
            &self,
            _ctx: &PublishContext,
            event: &OrderCompletedEvent,
        ) -> Result<(), PublishError> {
            self.seen.lock().unwrap().push(event.clone());
            self.response.clone()
        }
    }

    fn command(order_id: Option<&str>) -> CompleteOrder {
        CompleteOrder {
            order_id: order_id.map(str::to_string),
            shipping_tracking_id: "TRACK-42".to_string(),
            shipping_cost: Money::new("USD", 5, 990_000_000).unwrap(),
            shipping_address: Address::new("1600 Amphitheatre Pkwy", "Mountain View", "CA", "US", "94043").unwrap(),
            items: vec![OrderLineItem::new("OLJCESPC7Z", 3, Money::new("USD", 19, 990_000_000).unwrap()).unwrap()],
        }
    }

    #[tokio::test]
    async fn test_publishes_exactly_once() {
        let publisher = RecordingPublisher::answering(Ok(()));
        let handler = OrderCompletionHandler::new(publisher.clone());

        let event = handler
            .handle(&PublishContext::background(), command(Some("order-1")))
            .await
            .unwrap();

        let seen = publisher.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], event);
        assert_eq!(event.order_id(), "order-1");
    }

    #[tokio::test]
    async fn test_generates_order_id_when_absent() {
        let publisher = RecordingPublisher::answering(Ok(()));
        let handler = OrderCompletionHandler::new(publisher);

        let event = handler.handle(&PublishContext::background(), command(None)).await.unwrap();

        assert!(Uuid::parse_str(event.order_id()).is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_transport_still_completes() {
        let publisher = RecordingPublisher::answering(Err(PublishError::TransportUnavailable("no brokers".into())));
        let handler = OrderCompletionHandler::new(publisher.clone());

        let result = handler.handle(&PublishContext::background(), command(Some("order-2"))).await;

        assert!(result.is_ok());
        assert_eq!(publisher.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_indeterminate_delivery_surfaces_to_caller() {
        let publisher = RecordingPublisher::answering(Err(PublishError::Cancelled(Delivery::Indeterminate)));
        let handler = OrderCompletionHandler::new(publisher.clone());

        let err = handler
            .handle(&PublishContext::background(), command(Some("order-3")))
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<PublishError>(),
            Some(&PublishError::Cancelled(Delivery::Indeterminate))
        );
        assert_eq!(publisher.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_command_is_not_published() {
        let publisher = RecordingPublisher::answering(Ok(()));
        let handler = OrderCompletionHandler::new(publisher.clone());
        let mut cmd = command(Some("order-4"));
        cmd.items.clear();

        assert!(handler.handle(&PublishContext::background(), cmd).await.is_err());
        assert!(publisher.seen.lock().unwrap().is_empty());
    }
}
