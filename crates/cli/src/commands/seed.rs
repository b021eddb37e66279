//! Load the sample customers, products and orders.
//!
//! Rows keep their sample ids and are inserted with `ON CONFLICT DO NOTHING`,
//! so re-running the command is harmless. Afterwards each `SERIAL` sequence is
//! moved past the highest id so API inserts do not collide with seeded rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

use order_management_api::sample::{self, SampleOrder};

use super::CommandError;

const TABLES: &[&str] = &["customers", "products", "orders", "order_items"];

fn placed_at(order: &SampleOrder) -> Result<DateTime<Utc>, CommandError> {
    DateTime::parse_from_rfc3339(order.placed_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CommandError::InvalidSample(format!("order {}: {e}", order.id)))
}

/// Insert the sample data in a single transaction.
pub async fn run(pool: &PgPool) -> Result<(), CommandError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0_u64;

    for customer in sample::CUSTOMERS {
        inserted += sqlx::query(
            r"
            INSERT INTO customers (id, full_name, address, phone_number)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(customer.id)
        .bind(customer.full_name)
        .bind(customer.address)
        .bind(customer.phone_number)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for product in sample::PRODUCTS {
        inserted += sqlx::query(
            "INSERT INTO products (id, name, price) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(product.id)
        .bind(product.name)
        .bind(Decimal::from(product.price))
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for order in sample::ORDERS {
        inserted += sqlx::query(
            r"
            INSERT INTO orders (id, customer_id, order_date, total_amount)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(order.id)
        .bind(order.customer_id)
        .bind(placed_at(order)?)
        .bind(Decimal::from(order.total()))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for item in order.items {
            inserted += sqlx::query(
                r"
                INSERT INTO order_items (id, order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(item.id)
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(Decimal::from(item.unit_price))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
    }

    for table in TABLES {
        sqlx::query(&format!(
            "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
             COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)"
        ))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(rows = inserted, "Sample data loaded");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_dates_parse() {
        for order in sample::ORDERS {
            assert!(placed_at(order).is_ok());
        }
    }

    #[test]
    fn test_first_order_date() {
        let first = placed_at(sample::ORDERS.first().unwrap()).unwrap();
        assert_eq!(first.to_rfc3339(), "2024-12-01T10:30:00+00:00");
    }
}
