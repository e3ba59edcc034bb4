use anyhow::Context;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_pipeline::config::AppConfig;
use order_pipeline::consumer::OrderEventDispatcher;
use order_pipeline::contract;
use order_pipeline::domain::order::{Address, CompleteOrder, Money, OrderCompletionHandler, OrderLineItem};
use order_pipeline::messaging::{InMemoryLog, LogProducer, RedpandaProducer, RedpandaSubscription};
use order_pipeline::metrics::{self, Metrics};
use order_pipeline::persistence::{OrderRecordStore, PgOrderRecordStore};
use order_pipeline::publishing::{build_publisher, PublishContext};

const IN_MEMORY_LOG_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_pipeline=debug"))
        )
        .init();

    tracing::info!("🚀 Starting order pipeline");

    let config = AppConfig::from_env()?;
    tracing::debug!(
        topic = %config.order_topic,
        group = %config.consumer_group,
        publish_enabled = config.publish_enabled,
        "Configuration loaded"
    );

    // === 1. Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 2. Accounting store (optional) ===
    let store: Option<Arc<dyn OrderRecordStore>> = match &config.database_url {
        Some(url) => {
            let store = PgOrderRecordStore::connect(url)
                .await
                .context("Failed to connect to accounting database")?;
            store.ensure_schema().await.context("Failed to create accounting tables")?;
            Some(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders will be received but not stored");
            None
        }
    };

    let dispatcher = Arc::new(OrderEventDispatcher::new(store, metrics.clone()));

    // Metrics HTTP server runs on its own actix system in a background thread
    let metrics_registry = Arc::new(metrics.registry().clone());
    let dispatcher_state = dispatcher.watch_state();
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let server = metrics::start_metrics_server(metrics_registry, metrics_port, dispatcher_state);
        if let Err(e) = actix_web::rt::System::new().block_on(server) {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    // === 3. Log transport + dispatcher ===
    let shutdown = CancellationToken::new();
    let (producer, dispatcher_task) = start_transport(&config, dispatcher.clone(), shutdown.clone())?;

    // === 4. Publisher selected once, injected into business logic ===
    let publisher = build_publisher(config.publish_enabled, producer, &config.order_topic, metrics.clone());
    let handler = OrderCompletionHandler::new(publisher);

    // === 5. Complete a demo order ===
    let command = CompleteOrder {
        order_id: None,
        shipping_tracking_id: format!("TRACK-{}", uuid::Uuid::new_v4().simple()),
        shipping_cost: Money::new("USD", 5, 0)?,
        shipping_address: Address::new("123 Main St", "Anytown", "CA", "USA", "94016")?,
        items: vec![
            OrderLineItem::new("SKU-1", 2, Money::new("USD", 3, 0)?)?,
            OrderLineItem::new("SKU-2", 1, Money::new("USD", 19, 990_000_000)?)?,
        ],
    };

    let ctx = PublishContext::new(shutdown.child_token()).with_timeout(config.publish_timeout);
    match handler.handle(&ctx, command).await {
        Ok(event) => {
            tracing::info!("✅ Order completed: {}", event.order_id());

            if let Some(dir) = &config.pact_dir {
                contract::write_pact(dir, &contract::order_result_pact(&event))?;
            }
        }
        Err(e) => tracing::error!(error = %format!("{e:#}"), "Demo order failed"),
    }

    // === 6. Run until Ctrl-C ===
    tracing::info!("⏳ Listening for order events, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    shutdown.cancel();
    dispatcher_task.await?;

    tracing::info!("🎉 Shutdown complete");
    Ok(())
}

/// Connect the log transport and start the dispatcher on it.
///
/// Without `KAFKA_ADDR` an in-process log links the publisher and the
/// dispatcher directly.
fn start_transport(
    config: &AppConfig,
    dispatcher: Arc<OrderEventDispatcher>,
    shutdown: CancellationToken,
) -> anyhow::Result<(Option<Arc<dyn LogProducer>>, JoinHandle<()>)> {
    match &config.kafka_addr {
        Some(brokers) => {
            tracing::info!(brokers = %brokers, topic = %config.order_topic, "Using Redpanda log transport");

            let producer: Option<Arc<dyn LogProducer>> = match RedpandaProducer::new(brokers) {
                Ok(producer) => Some(Arc::new(producer)),
                Err(e) => {
                    tracing::warn!(error = %e, "Redpanda producer unavailable, publishing degraded");
                    None
                }
            };

            let subscription = RedpandaSubscription::subscribe(brokers, &config.order_topic, &config.consumer_group)?;
            let task = tokio::spawn(async move { dispatcher.run(subscription, shutdown).await });

            Ok((producer, task))
        }
        None => {
            tracing::warn!("KAFKA_ADDR not set, using in-process log");

            let log = Arc::new(InMemoryLog::new(IN_MEMORY_LOG_CAPACITY));
            let subscription = log.subscribe().context("In-memory log already subscribed")?;
            let task = tokio::spawn(async move { dispatcher.run(subscription, shutdown).await });

            let producer: Arc<dyn LogProducer> = log;
            Ok((Some(producer), task))
        }
    }
}
