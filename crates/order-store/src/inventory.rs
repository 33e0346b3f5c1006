//! Inventory ledger primitives shared by the standalone reserve operation
//! and the checkout transaction.

use common::ProductId;

/// Conditionally decrements a product's stock.
///
/// One statement, "decrement where enough remains". Returns false when zero
/// rows matched — the caller decides whether that means a missing product
/// or insufficient stock.
pub(crate) async fn decrement_stock<'e, E>(
    executor: E,
    product_id: ProductId,
    quantity: i32,
) -> sqlx::Result<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let result =
        sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1")
            .bind(quantity)
            .bind(product_id.as_uuid())
            .execute(executor)
            .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn product_exists<'e, E>(executor: E, product_id: ProductId) -> sqlx::Result<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
        .bind(product_id.as_uuid())
        .fetch_one(executor)
        .await
}
