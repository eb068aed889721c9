use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Order, OrderDetails, PaymentEvent, Transition};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    OrderId, OrderQuery, PaymentIntentId, Result, StoreError,
    store::{OrderStore, PaymentUpdate},
};

const ORDER_COLUMNS: &str = "id, customer_name, customer_phone, customer_email, \
    delivery_address, delivery_date, delivery_time, items_json, total_amount, payment_method, \
    payment_status, stripe_payment_intent_id, stripe_charge_id, created_at, updated_at, notes";

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let id: i64 = row.try_get("id")?;
        let corrupt = |source| StoreError::CorruptRow { id, source };

        let items_json: String = row.try_get("items_json")?;
        let payment_method: String = row.try_get("payment_method")?;
        let payment_status: String = row.try_get("payment_status")?;
        let payment_intent_id: Option<String> = row.try_get("stripe_payment_intent_id")?;

        let details = OrderDetails {
            customer_name: row.try_get("customer_name")?,
            customer_phone: row.try_get("customer_phone")?,
            customer_email: row.try_get("customer_email")?,
            delivery_address: row.try_get("delivery_address")?,
            delivery_date: row.try_get("delivery_date")?,
            delivery_time: row.try_get("delivery_time")?,
            items: OrderDetails::items_from_blob(&items_json)?,
            total_amount: row.try_get::<Decimal, _>("total_amount")?,
            payment_method: payment_method.parse().map_err(corrupt)?,
            payment_status: payment_status.parse().map_err(corrupt)?,
            payment_intent_id: payment_intent_id.map(PaymentIntentId::from),
            notes: row.try_get("notes")?,
        };

        Ok(Order {
            id: OrderId::new(id),
            details,
            charge_id: row.try_get("stripe_charge_id")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, details), fields(payment_method = %details.payment_method))]
    async fn insert(&self, details: OrderDetails) -> Result<Order> {
        let items_json = details.items_blob()?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (
                customer_name, customer_phone, customer_email,
                delivery_address, delivery_date, delivery_time,
                items_json, total_amount, payment_method, payment_status,
                stripe_payment_intent_id, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&details.customer_name)
        .bind(&details.customer_phone)
        .bind(&details.customer_email)
        .bind(&details.delivery_address)
        .bind(&details.delivery_date)
        .bind(&details.delivery_time)
        .bind(&items_json)
        .bind(details.total_amount)
        .bind(details.payment_method.as_str())
        .bind(details.payment_status.as_str())
        .bind(details.payment_intent_id.as_ref().map(|id| id.as_str()))
        .bind(&details.notes)
        .fetch_one(&mut *tx)
        .await?;

        let order = Self::row_to_order(row)?;

        // Dropping the transaction before this point rolls the insert back.
        tx.commit().await?;
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(i64::from(query.page_size()))
        .bind(i64::from(query.skip()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn find_by_payment_intent(&self, intent_id: &PaymentIntentId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE stripe_payment_intent_id = $1
            ORDER BY id ASC
            LIMIT 1
            "#
        ))
        .bind(intent_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    #[tracing::instrument(skip(self, event), fields(payment_intent_id = %intent_id))]
    async fn apply_payment_event(
        &self,
        intent_id: &PaymentIntentId,
        event: &PaymentEvent,
    ) -> Result<Option<PaymentUpdate>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE stripe_payment_intent_id = $1
            ORDER BY id ASC
            LIMIT 1
            FOR UPDATE
            "#
        ))
        .bind(intent_id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let mut order = Self::row_to_order(row)?;
        let transition = order.apply_payment_event(event, Utc::now());

        if transition == Transition::Applied {
            let updated_at: DateTime<Utc> = sqlx::query_scalar(
                r#"
                UPDATE orders
                SET payment_status = $1, stripe_charge_id = $2, updated_at = NOW()
                WHERE id = $3
                RETURNING updated_at
                "#,
            )
            .bind(order.details.payment_status.as_str())
            .bind(&order.charge_id)
            .bind(order.id.as_i64())
            .fetch_one(&mut *tx)
            .await?;
            order.updated_at = updated_at;
        }

        tx.commit().await?;
        Ok(Some(PaymentUpdate { order, transition }))
    }
}
