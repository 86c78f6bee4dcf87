use crate::domain::pricing::{PricingRule, SaveRuleRequest};
use crate::error::EngineError;
use crate::pricing::rules::{find_overlap, validate_rule};
use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Advisory lock key serializing overlap-check-then-write across concurrent
/// saves. One key for the whole rule table; rule edits are rare.
const RULE_SAVE_LOCK: i64 = 0x7072_6963_696e_67;

#[derive(Clone)]
pub struct PricingRulesRepo {
    pub pool: PgPool,
}

impl PricingRulesRepo {
    /// Rules in resolution order: priority ascending, then range floor
    /// ascending.
    pub async fn list(&self) -> Result<Vec<PricingRule>> {
        let rows = sqlx::query(
            r#"
            SELECT rule_id, name, priority, distance_min_km, distance_max_km,
                   base_fee, per_km_fee, surcharge_percent, notes, active
            FROM pricing_rules
            ORDER BY priority ASC, distance_min_km ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(rule_from_row).collect())
    }

    pub async fn list_active(&self) -> Result<Vec<PricingRule>> {
        let rows = sqlx::query(
            r#"
            SELECT rule_id, name, priority, distance_min_km, distance_max_km,
                   base_fee, per_km_fee, surcharge_percent, notes, active
            FROM pricing_rules
            WHERE active
            ORDER BY priority ASC, distance_min_km ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(rule_from_row).collect())
    }

    /// Validates, checks the active set for range overlap, and upserts, all
    /// inside one transaction under an advisory lock so two concurrent saves
    /// cannot both pass validation against a stale rule set.
    pub async fn save(&self, req: SaveRuleRequest) -> Result<PricingRule, EngineError> {
        validate_rule(&req)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(RULE_SAVE_LOCK)
            .execute(tx.as_mut())
            .await?;

        if req.active {
            let rows = sqlx::query(
                r#"
                SELECT rule_id, name, priority, distance_min_km, distance_max_km,
                       base_fee, per_km_fee, surcharge_percent, notes, active
                FROM pricing_rules
                WHERE active
                "#,
            )
            .fetch_all(tx.as_mut())
            .await?;
            let existing: Vec<PricingRule> = rows.iter().map(rule_from_row).collect();

            if let Some(hit) = find_overlap(req.distance_min_km, req.distance_max_km, req.rule_id, &existing) {
                return Err(EngineError::Conflict {
                    entity: format!("rule {}", hit.name),
                    message: format!(
                        "distance range [{}, {}) overlaps active rule '{}' [{}, {})",
                        req.distance_min_km,
                        req.distance_max_km.map_or("inf".to_string(), |m| m.to_string()),
                        hit.name,
                        hit.distance_min_km,
                        hit.distance_max_km.map_or("inf".to_string(), |m| m.to_string()),
                    ),
                });
            }
        }

        let rule_id = req.rule_id.unwrap_or_else(Uuid::new_v4);
        sqlx::query(
            r#"
            INSERT INTO pricing_rules (
                rule_id, name, priority, distance_min_km, distance_max_km,
                base_fee, per_km_fee, surcharge_percent, notes, active
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            ON CONFLICT (rule_id) DO UPDATE SET
                name = EXCLUDED.name,
                priority = EXCLUDED.priority,
                distance_min_km = EXCLUDED.distance_min_km,
                distance_max_km = EXCLUDED.distance_max_km,
                base_fee = EXCLUDED.base_fee,
                per_km_fee = EXCLUDED.per_km_fee,
                surcharge_percent = EXCLUDED.surcharge_percent,
                notes = EXCLUDED.notes,
                active = EXCLUDED.active,
                updated_at = now()
            "#,
        )
        .bind(rule_id)
        .bind(&req.name)
        .bind(req.priority)
        .bind(req.distance_min_km)
        .bind(req.distance_max_km)
        .bind(req.base_fee)
        .bind(req.per_km_fee)
        .bind(req.surcharge_percent)
        .bind(&req.notes)
        .bind(req.active)
        .execute(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(PricingRule {
            rule_id,
            name: req.name,
            priority: req.priority,
            distance_min_km: req.distance_min_km,
            distance_max_km: req.distance_max_km,
            base_fee: req.base_fee,
            per_km_fee: req.per_km_fee,
            surcharge_percent: req.surcharge_percent,
            notes: req.notes,
            active: req.active,
        })
    }

    /// Unconditional delete. Audit rows keep `matched_rule_id` as a cold
    /// reference; there is deliberately no cascade.
    pub async fn delete(&self, rule_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pricing_rules WHERE rule_id = $1")
            .bind(rule_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn rule_from_row(row: &sqlx::postgres::PgRow) -> PricingRule {
    PricingRule {
        rule_id: row.get("rule_id"),
        name: row.get("name"),
        priority: row.get("priority"),
        distance_min_km: row.get("distance_min_km"),
        distance_max_km: row.get("distance_max_km"),
        base_fee: row.get("base_fee"),
        per_km_fee: row.get("per_km_fee"),
        surcharge_percent: row.get("surcharge_percent"),
        notes: row.get("notes"),
        active: row.get("active"),
    }
}
