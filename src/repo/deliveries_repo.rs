use crate::domain::dispatch::Delivery;
use anyhow::Result;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

#[derive(Clone)]
pub struct DeliveriesRepo {
    pub pool: PgPool,
}

impl DeliveriesRepo {
    pub async fn get(&self, delivery_id: Uuid) -> Result<Option<Delivery>> {
        let row = sqlx::query(
            r#"
            SELECT delivery_id, order_id, rider_id, status,
                   pickup_lat, pickup_lng, dropoff_lat, dropoff_lng
            FROM deliveries WHERE delivery_id = $1
            "#,
        )
        .bind(delivery_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Delivery {
            delivery_id: r.get("delivery_id"),
            order_id: r.get("order_id"),
            rider_id: r.get("rider_id"),
            status: r.get("status"),
            pickup_lat: r.get("pickup_lat"),
            pickup_lng: r.get("pickup_lng"),
            dropoff_lat: r.get("dropoff_lat"),
            dropoff_lng: r.get("dropoff_lng"),
        }))
    }

    /// The single conditional write guarding against double assignment.
    /// Returns true iff this caller won the row; concurrent callers observe
    /// zero affected rows, never a stale read.
    pub async fn assign_if_pending_tx(
        tx: &mut Transaction<'_, Postgres>,
        delivery_id: Uuid,
        rider_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE deliveries
            SET rider_id = $1, status = 'assigned', assigned_at = now()
            WHERE delivery_id = $2 AND status = 'pending'
            "#,
        )
        .bind(rider_id)
        .bind(delivery_id)
        .execute(tx.as_mut())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
