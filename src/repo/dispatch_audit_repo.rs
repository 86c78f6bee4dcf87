use crate::domain::dispatch::DispatchAuditRecord;
use anyhow::Result;
use sqlx::{PgPool, Postgres, Row, Transaction};

#[derive(Clone)]
pub struct DispatchAuditRepo {
    pub pool: PgPool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DailyDispatchStats {
    pub day: chrono::NaiveDate,
    pub dispatches: i64,
    pub avg_duration_seconds: f64,
    pub avg_distance_meters: f64,
    pub avg_candidates: f64,
    pub avg_score: f64,
}

impl DispatchAuditRepo {
    pub async fn insert(&self, record: &DispatchAuditRecord) -> Result<()> {
        Self::bind_insert(record).execute(&self.pool).await?;
        Ok(())
    }

    /// Same insert inside the assignment transaction so the audit row commits
    /// with the conditional update or not at all.
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        record: &DispatchAuditRecord,
    ) -> Result<()> {
        Self::bind_insert(record).execute(tx.as_mut()).await?;
        Ok(())
    }

    fn bind_insert(
        record: &DispatchAuditRecord,
    ) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
        sqlx::query(
            r#"
            INSERT INTO dispatch_audit (
                audit_id, delivery_id, rider_id, candidates_evaluated,
                selection_score, distance_meters, duration_seconds, fallback_used, created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            "#,
        )
        .bind(record.audit_id)
        .bind(record.delivery_id)
        .bind(record.rider_id)
        .bind(record.candidates_evaluated)
        .bind(record.selection_score)
        .bind(record.distance_meters)
        .bind(record.duration_seconds)
        .bind(record.fallback_used)
        .bind(record.created_at)
    }

    /// Daily aggregates for the analytics surface.
    pub async fn daily_stats(&self, days: i64) -> Result<Vec<DailyDispatchStats>> {
        let rows = sqlx::query(
            r#"
            SELECT created_at::date AS day,
                   count(*) AS dispatches,
                   coalesce(avg(duration_seconds), 0)::float8 AS avg_duration_seconds,
                   coalesce(avg(distance_meters), 0)::float8 AS avg_distance_meters,
                   coalesce(avg(candidates_evaluated), 0)::float8 AS avg_candidates,
                   coalesce(avg(selection_score), 0)::float8 AS avg_score
            FROM dispatch_audit
            WHERE created_at >= now() - make_interval(days => $1::int)
            GROUP BY created_at::date
            ORDER BY day DESC
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DailyDispatchStats {
                day: r.get("day"),
                dispatches: r.get("dispatches"),
                avg_duration_seconds: r.get("avg_duration_seconds"),
                avg_distance_meters: r.get("avg_distance_meters"),
                avg_candidates: r.get("avg_candidates"),
                avg_score: r.get("avg_score"),
            })
            .collect())
    }
}
