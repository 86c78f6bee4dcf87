use crate::domain::rider::{Rider, RiderStatus};
use anyhow::Result;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

const ACTIVE_JOBS_SUBQUERY: &str = r#"
    (SELECT count(*) FROM deliveries d
     WHERE d.rider_id = r.rider_id
       AND d.status IN ('assigned', 'picked_up', 'in_transit'))
"#;

#[derive(Clone)]
pub struct RidersRepo {
    pub pool: PgPool,
}

impl RidersRepo {
    /// All riders with workload derived from live delivery rows. The count is
    /// computed in the query, never read from a stored counter.
    pub async fn list_with_workload(&self) -> Result<Vec<Rider>> {
        let sql = format!(
            r#"
            SELECT r.rider_id, r.name, r.status, r.lat, r.lng, r.located_at,
                   r.max_active_jobs, r.rating, r.vehicle_type, r.vehicle_plate,
                   {ACTIVE_JOBS_SUBQUERY} AS active_jobs
            FROM riders r
            ORDER BY r.name ASC
            "#
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(rider_from_row).collect())
    }

    /// Riders eligible for pre-filtering: not offline, with a known location.
    /// Workload and distance filters happen in the scorer where the ceiling
    /// and radius options live.
    pub async fn list_dispatchable(&self) -> Result<Vec<Rider>> {
        let sql = format!(
            r#"
            SELECT r.rider_id, r.name, r.status, r.lat, r.lng, r.located_at,
                   r.max_active_jobs, r.rating, r.vehicle_type, r.vehicle_plate,
                   {ACTIVE_JOBS_SUBQUERY} AS active_jobs
            FROM riders r
            WHERE r.status <> 'offline'
              AND r.lat IS NOT NULL
              AND r.lng IS NOT NULL
            "#
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(rider_from_row).collect())
    }

    /// Manual transition, e.g. offline -> available at shift start.
    pub async fn set_status(&self, rider_id: Uuid, status: RiderStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE riders SET status = $1 WHERE rider_id = $2")
            .bind(status.as_str())
            .bind(rider_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Re-derive busy/available from the live job count against the ceiling.
    /// Offline riders are left alone; coming back online is manual.
    pub async fn refresh_status_tx(
        tx: &mut Transaction<'_, Postgres>,
        rider_id: Uuid,
        ceiling: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE riders r SET status = CASE
                WHEN (SELECT count(*) FROM deliveries d
                      WHERE d.rider_id = r.rider_id
                        AND d.status IN ('assigned', 'picked_up', 'in_transit')) >= $2
                THEN 'busy' ELSE 'available' END
            WHERE r.rider_id = $1 AND r.status <> 'offline'
            "#,
        )
        .bind(rider_id)
        .bind(ceiling)
        .execute(tx.as_mut())
        .await?;
        Ok(())
    }
}

fn rider_from_row(row: &sqlx::postgres::PgRow) -> Rider {
    let status: String = row.get("status");
    Rider {
        rider_id: row.get("rider_id"),
        name: row.get("name"),
        status: RiderStatus::parse(&status).unwrap_or(RiderStatus::Offline),
        lat: row.get("lat"),
        lng: row.get("lng"),
        located_at: row.get("located_at"),
        active_jobs: row.get("active_jobs"),
        max_active_jobs: row.get("max_active_jobs"),
        rating: row.get("rating"),
        vehicle_type: row.get("vehicle_type"),
        vehicle_plate: row.get("vehicle_plate"),
    }
}
