use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ActorId, Money, OrderId, OrderNumber, OrderStatus, ProductId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::inventory;
use crate::records::{
    InventoryLine, LineItemDraft, LineItemRecord, NewProduct, OrderDraft, OrderRecord,
    ProductRecord, SellerDashboard, StockLevel, TransitionGuard, TransitionUpdate,
};
use crate::store::FulfillmentStore;
use crate::{Result, StoreError};

const ORDER_COLUMNS: &str = "id, order_number, buyer_id, rider_id, total_amount_cents, \
     delivery_fee_cents, payment_method, delivery_address, status, created_at, updated_at";

/// PostgreSQL-backed fulfillment store.
#[derive(Clone)]
pub struct PostgresFulfillmentStore {
    pool: PgPool,
}

impl PostgresFulfillmentStore {
    /// Creates a new PostgreSQL fulfillment store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<ProductRecord> {
        Ok(ProductRecord {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            seller_id: ActorId::from_uuid(row.try_get::<Uuid, _>("seller_id")?),
            name: row.try_get("name")?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            stock: row.try_get("stock")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<OrderRecord> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::InvalidStatus(e.0))?;

        Ok(OrderRecord {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_number: OrderNumber::new(row.try_get::<String, _>("order_number")?),
            buyer_id: ActorId::from_uuid(row.try_get::<Uuid, _>("buyer_id")?),
            rider_id: row
                .try_get::<Option<Uuid>, _>("rider_id")?
                .map(ActorId::from_uuid),
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            delivery_fee: Money::from_cents(row.try_get("delivery_fee_cents")?),
            payment_method: row.try_get("payment_method")?,
            delivery_address: row.try_get("delivery_address")?,
            status,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    fn row_to_line_item(row: PgRow) -> Result<LineItemRecord> {
        Ok(LineItemRecord {
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: row.try_get("quantity")?,
            price_at_purchase: Money::from_cents(row.try_get("price_at_purchase_cents")?),
        })
    }

    async fn insert_line_item(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: OrderId,
        item: &LineItemDraft,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase_cents)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(item.quantity)
        .bind(item.unit_price.cents())
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("order_items_product_id_fkey")
            {
                return StoreError::ProductNotFound(item.product_id);
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }
}

#[async_trait]
impl FulfillmentStore for PostgresFulfillmentStore {
    async fn insert_product(&self, product: NewProduct) -> Result<ProductRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (id, seller_id, name, unit_price_cents, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, seller_id, name, unit_price_cents, stock, created_at
            "#,
        )
        .bind(ProductId::new().as_uuid())
        .bind(product.seller_id.as_uuid())
        .bind(&product.name)
        .bind(product.unit_price.cents())
        .bind(product.stock)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(row)
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<ProductRecord>> {
        let row = sqlx::query(
            "SELECT id, seller_id, name, unit_price_cents, stock, created_at \
             FROM products WHERE id = $1",
        )
        .bind(product_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn reserve(&self, product_id: ProductId, quantity: i32) -> Result<()> {
        if inventory::decrement_stock(&self.pool, product_id, quantity).await? {
            return Ok(());
        }

        // Zero rows: classify for the caller. The read happens after the
        // atomic update already failed, so it cannot race a reservation.
        if inventory::product_exists(&self.pool, product_id).await? {
            Err(StoreError::InsufficientStock { product_id })
        } else {
            Err(StoreError::ProductNotFound(product_id))
        }
    }

    async fn checkout(&self, draft: OrderDraft) -> Result<OrderRecord> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (id, order_number, buyer_id, total_amount_cents,
                                delivery_fee_cents, payment_method, delivery_address, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(draft.id.as_uuid())
        .bind(draft.order_number.as_str())
        .bind(draft.buyer_id.as_uuid())
        .bind(draft.total_amount.cents())
        .bind(draft.delivery_fee.cents())
        .bind(&draft.payment_method)
        .bind(&draft.delivery_address)
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_order_number_key")
            {
                return StoreError::DuplicateOrderNumber(draft.order_number.clone());
            }
            StoreError::Database(e)
        })?;
        let order = Self::row_to_order(row)?;

        for item in &draft.items {
            Self::insert_line_item(&mut tx, draft.id, item).await?;

            if !inventory::decrement_stock(&mut *tx, item.product_id, item.quantity).await? {
                let exists = inventory::product_exists(&mut *tx, item.product_id).await?;
                tracing::debug!(
                    order_id = %draft.id,
                    product_id = %item.product_id,
                    "reservation failed, rolling back checkout"
                );
                // Dropping the transaction rolls back the order, every line
                // item, and every decrement applied so far in this call.
                return Err(if exists {
                    StoreError::InsufficientStock {
                        product_id: item.product_id,
                    }
                } else {
                    StoreError::ProductNotFound(item.product_id)
                });
            }
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn line_items(&self, order_id: OrderId) -> Result<Vec<LineItemRecord>> {
        let rows = sqlx::query(
            "SELECT order_id, product_id, quantity, price_at_purchase_cents \
             FROM order_items WHERE order_id = $1",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_line_item).collect()
    }

    async fn seller_owns_line_items(&self, order_id: OrderId, seller_id: ActorId) -> Result<bool> {
        let owns: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM order_items oi
                JOIN products p ON oi.product_id = p.id
                WHERE oi.order_id = $1 AND p.seller_id = $2
            )
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(seller_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(owns)
    }

    async fn apply_transition(
        &self,
        order_id: OrderId,
        update: TransitionUpdate,
    ) -> Result<Option<OrderRecord>> {
        let row = match update.guard {
            TransitionGuard::None => {
                sqlx::query(&format!(
                    r#"
                    UPDATE orders
                    SET status = $1, updated_at = now()
                    WHERE id = $2 AND status = $3
                    RETURNING {ORDER_COLUMNS}
                    "#
                ))
                .bind(update.to.as_str())
                .bind(order_id.as_uuid())
                .bind(update.from.as_str())
                .fetch_optional(&self.pool)
                .await?
            }
            TransitionGuard::ClaimRider(rider_id) => {
                sqlx::query(&format!(
                    r#"
                    UPDATE orders
                    SET status = $1, rider_id = $2, updated_at = now()
                    WHERE id = $3 AND status = $4 AND rider_id IS NULL
                    RETURNING {ORDER_COLUMNS}
                    "#
                ))
                .bind(update.to.as_str())
                .bind(rider_id.as_uuid())
                .bind(order_id.as_uuid())
                .bind(update.from.as_str())
                .fetch_optional(&self.pool)
                .await?
            }
            TransitionGuard::AssignedRider(rider_id) => {
                sqlx::query(&format!(
                    r#"
                    UPDATE orders
                    SET status = $1, updated_at = now()
                    WHERE id = $2 AND status = $3 AND rider_id = $4
                    RETURNING {ORDER_COLUMNS}
                    "#
                ))
                .bind(update.to.as_str())
                .bind(order_id.as_uuid())
                .bind(update.from.as_str())
                .bind(rider_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
            }
        };

        row.map(Self::row_to_order).transpose()
    }

    async fn orders_by_buyer(&self, buyer_id: ActorId) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(buyer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn orders_for_seller(&self, seller_id: ActorId) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT o.id, o.order_number, o.buyer_id, o.rider_id,
                   o.total_amount_cents, o.delivery_fee_cents, o.payment_method,
                   o.delivery_address, o.status, o.created_at, o.updated_at
            FROM orders o
            JOIN order_items oi ON o.id = oi.order_id
            JOIN products p ON oi.product_id = p.id
            WHERE p.seller_id = $1
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(seller_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn orders_for_rider(&self, rider_id: ActorId) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE (status = $1 AND rider_id IS NULL) OR rider_id = $2
            ORDER BY created_at DESC
            "#
        ))
        .bind(OrderStatus::ReadyForPickup.as_str())
        .bind(rider_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn seller_dashboard(&self, seller_id: ActorId) -> Result<SellerDashboard> {
        let total_revenue: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(oi.quantity * oi.price_at_purchase_cents), 0)::BIGINT
            FROM order_items oi
            JOIN products p ON oi.product_id = p.id
            WHERE p.seller_id = $1
            "#,
        )
        .bind(seller_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        let orders_today: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT oi.order_id)
            FROM order_items oi
            JOIN products p ON oi.product_id = p.id
            JOIN orders o ON oi.order_id = o.id
            WHERE p.seller_id = $1 AND o.created_at >= CURRENT_DATE
            "#,
        )
        .bind(seller_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        let active_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE seller_id = $1")
                .bind(seller_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(
            "SELECT id, name, unit_price_cents, stock FROM products \
             WHERE seller_id = $1 ORDER BY created_at DESC",
        )
        .bind(seller_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let inventory = rows
            .into_iter()
            .map(|row| -> Result<InventoryLine> {
                let stock: i32 = row.try_get("stock")?;
                Ok(InventoryLine {
                    product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    name: row.try_get("name")?,
                    unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
                    stock,
                    level: StockLevel::for_stock(stock),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SellerDashboard {
            total_revenue: Money::from_cents(total_revenue),
            orders_today: orders_today as u64,
            active_products: active_products as u64,
            inventory,
        })
    }
}
