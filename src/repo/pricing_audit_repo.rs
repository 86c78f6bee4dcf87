use crate::domain::pricing::PricingAuditRecord;
use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PricingAuditRepo {
    pub pool: PgPool,
}

/// Aggregates backing the pricing metrics surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PricingStats {
    pub total_requests: i64,
    pub cache_hit_rate: f64,
    pub fallback_rate: f64,
    pub avg_fee: f64,
    pub no_rule_matched: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RuleUsage {
    pub rule_id: Option<Uuid>,
    pub uses: i64,
    pub avg_fee: f64,
}

impl PricingAuditRepo {
    /// Inserted before any fee leaves the service; the caller treats a failed
    /// insert as a failed pricing call.
    pub async fn insert(&self, record: &PricingAuditRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pricing_audit (
                request_id, order_id, distance_km, duration_min, matched_rule_id,
                calculated_fee, provider, cache_hit, fallback_used, order_context, created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            "#,
        )
        .bind(record.request_id)
        .bind(record.order_id)
        .bind(record.distance_km)
        .bind(record.duration_min)
        .bind(record.matched_rule_id)
        .bind(record.calculated_fee)
        .bind(&record.provider)
        .bind(record.cache_hit)
        .bind(record.fallback_used)
        .bind(&record.order_context)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// One-time link once the order row is durable. The record is otherwise
    /// immutable; a second attach is a no-op reported as false.
    pub async fn attach_to_order(&self, request_id: Uuid, order_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE pricing_audit SET order_id = $1 WHERE request_id = $2 AND order_id IS NULL",
        )
        .bind(order_id)
        .bind(request_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, request_id: Uuid) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS one FROM pricing_audit WHERE request_id = $1")
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn stats(&self) -> Result<PricingStats> {
        let row = sqlx::query(
            r#"
            SELECT count(*) AS total,
                   coalesce(avg(cache_hit::int), 0)::float8 AS cache_hit_rate,
                   coalesce(avg(fallback_used::int), 0)::float8 AS fallback_rate,
                   coalesce(avg(calculated_fee), 0)::float8 AS avg_fee,
                   count(*) FILTER (WHERE matched_rule_id IS NULL) AS no_rule_matched
            FROM pricing_audit
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PricingStats {
            total_requests: row.get("total"),
            cache_hit_rate: row.get("cache_hit_rate"),
            fallback_rate: row.get("fallback_rate"),
            avg_fee: row.get("avg_fee"),
            no_rule_matched: row.get("no_rule_matched"),
        })
    }

    pub async fn rule_usage(&self) -> Result<Vec<RuleUsage>> {
        let rows = sqlx::query(
            r#"
            SELECT matched_rule_id, count(*) AS uses,
                   coalesce(avg(calculated_fee), 0)::float8 AS avg_fee
            FROM pricing_audit
            GROUP BY matched_rule_id
            ORDER BY uses DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RuleUsage {
                rule_id: r.get("matched_rule_id"),
                uses: r.get("uses"),
                avg_fee: r.get("avg_fee"),
            })
            .collect())
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<PricingAuditRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT request_id, order_id, distance_km, duration_min, matched_rule_id,
                   calculated_fee, provider, cache_hit, fallback_used, order_context, created_at
            FROM pricing_audit
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PricingAuditRecord {
                request_id: r.get("request_id"),
                order_id: r.get("order_id"),
                distance_km: r.get("distance_km"),
                duration_min: r.get("duration_min"),
                matched_rule_id: r.get("matched_rule_id"),
                calculated_fee: r.get("calculated_fee"),
                provider: r.get("provider"),
                cache_hit: r.get("cache_hit"),
                fallback_used: r.get("fallback_used"),
                order_context: r.get("order_context"),
                created_at: r.get("created_at"),
            })
            .collect())
    }
}
