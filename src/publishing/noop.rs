use async_trait::async_trait;

use crate::domain::order::OrderCompletedEvent;
use super::port::{OrderEventPublisher, PublishContext, PublishError};

/// Publisher used when order publishing is disabled.
///
/// Accepts every event, sends nothing and never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpOrderEventPublisher;

impl NoOpOrderEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OrderEventPublisher for NoOpOrderEventPublisher {
    async fn publish_order_completed(
        &self,
        _ctx: &PublishContext,
        event: &OrderCompletedEvent,
    ) -> Result<(), PublishError> {
        tracing::debug!(
            order_id = %event.order_id(),
            items = event.items().len(),
            "Order publishing disabled, dropping event"
        );
        Ok(())
    }
}
