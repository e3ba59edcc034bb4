use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::errors::PersistError;
use super::records::OrderRecords;
use super::OrderRecordStore;

/// Postgres-backed accounting store
pub struct PgOrderRecordStore {
    pool: PgPool,
}

impl PgOrderRecordStore {
    pub async fn connect(database_url: &str) -> Result<Self, PersistError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("Connected to accounting database");
        Ok(Self { pool })
    }

    /// Create the accounting tables if they don't exist
    pub async fn ensure_schema(&self) -> Result<(), PersistError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS "order" (
                order_id TEXT PRIMARY KEY,
                recorded_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orderitem (
                order_id TEXT NOT NULL REFERENCES "order" (order_id),
                line_number INTEGER NOT NULL,
                product_id TEXT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity > 0),
                item_cost_currency_code TEXT NOT NULL,
                item_cost_units BIGINT NOT NULL,
                item_cost_nanos INTEGER NOT NULL,
                PRIMARY KEY (order_id, line_number)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS shipping (
                shipping_tracking_id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL REFERENCES "order" (order_id),
                shipping_cost_currency_code TEXT NOT NULL,
                shipping_cost_units BIGINT NOT NULL,
                shipping_cost_nanos INTEGER NOT NULL,
                street_address TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                country TEXT NOT NULL,
                zip_code TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderRecordStore for PgOrderRecordStore {
    async fn write_order_records(&self, records: &OrderRecords) -> Result<(), PersistError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"INSERT INTO "order" (order_id, recorded_at) VALUES ($1, $2)"#)
            .bind(&records.order.order_id)
            .bind(records.order.recorded_at)
            .execute(&mut *tx)
            .await?;

        for item in &records.items {
            sqlx::query(
                r#"
                INSERT INTO orderitem (
                    order_id, line_number, product_id, quantity,
                    item_cost_currency_code, item_cost_units, item_cost_nanos
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&item.order_id)
            .bind(item.line_number)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(&item.item_cost_currency_code)
            .bind(item.item_cost_units)
            .bind(item.item_cost_nanos)
            .execute(&mut *tx)
            .await?;
        }

        let shipping = &records.shipping;
        sqlx::query(
            r#"
            INSERT INTO shipping (
                shipping_tracking_id, order_id,
                shipping_cost_currency_code, shipping_cost_units, shipping_cost_nanos,
                street_address, city, state, country, zip_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&shipping.shipping_tracking_id)
        .bind(&shipping.order_id)
        .bind(&shipping.shipping_cost_currency_code)
        .bind(shipping.shipping_cost_units)
        .bind(shipping.shipping_cost_nanos)
        .bind(&shipping.street_address)
        .bind(&shipping.city)
        .bind(&shipping.state)
        .bind(&shipping.country)
        .bind(&shipping.zip_code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            order_id = %records.order_id(),
            items = records.items.len(),
            "Order records committed"
        );
        Ok(())
    }
}
