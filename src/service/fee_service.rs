use crate::cache::distance_cache::DistanceCache;
use crate::config::EngineSettings;
use crate::domain::coordinates::Coordinates;
use crate::domain::pricing::{FeeMetadata, FeeQuote, OrderContext, PricingAuditRecord};
use crate::error::EngineError;
use crate::pricing::calculator::{compute_fee, resolve_rule, round2};
use crate::repo::pricing_audit_repo::PricingAuditRepo;
use crate::repo::pricing_rules_repo::PricingRulesRepo;
use crate::routing::TravelMode;
use anyhow::Context;
use uuid::Uuid;

#[derive(Clone)]
pub struct FeeService {
    pub rules_repo: PricingRulesRepo,
    pub audit_repo: PricingAuditRepo,
    pub cache: DistanceCache,
    pub settings: EngineSettings,
}

impl FeeService {
    /// Price a delivery leg. The audit row is inserted before the quote is
    /// returned; if that insert fails the whole call fails, because an
    /// unaudited fee is worse than no fee.
    pub async fn calculate_fee(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        context: OrderContext,
    ) -> Result<FeeQuote, EngineError> {
        let lookup = self
            .cache
            .get_or_compute(origin, destination, TravelMode::Driving)
            .await;
        let distance_km = round2(lookup.distance_m / 1000.0);
        let duration_minutes = round2(lookup.duration_s / 60.0);

        let rules = self.rules_repo.list_active().await?;
        let matched = resolve_rule(&rules, distance_km).cloned();
        let (calculated_fee, metadata) = match &matched {
            Some(rule) => (compute_fee(rule, distance_km), FeeMetadata::default()),
            None => {
                tracing::info!(distance_km, "no pricing rule matched, applying default fee");
                (
                    round2(self.settings.default_fee),
                    FeeMetadata {
                        no_rule_matched: true,
                    },
                )
            }
        };

        let record = PricingAuditRecord {
            request_id: Uuid::new_v4(),
            order_id: None,
            distance_km,
            duration_min: duration_minutes,
            matched_rule_id: matched.as_ref().map(|r| r.rule_id),
            calculated_fee,
            provider: lookup.provider.clone(),
            cache_hit: lookup.cache_hit,
            fallback_used: lookup.fallback_used,
            order_context: serde_json::to_value(&context).context("serialize order context")?,
            created_at: chrono::Utc::now(),
        };
        self.audit_repo.insert(&record).await?;

        Ok(FeeQuote {
            audit_request_id: record.request_id,
            distance_km,
            duration_minutes,
            calculated_fee,
            rule: matched,
            provider: lookup.provider,
            cache_hit: lookup.cache_hit,
            fallback_used: lookup.fallback_used,
            metadata,
        })
    }

    /// Links the audit row to its order once the order is durable. A row that
    /// is already linked stays untouched.
    pub async fn attach_audit_to_order(
        &self,
        audit_request_id: Uuid,
        order_id: Uuid,
    ) -> Result<(), EngineError> {
        if self.audit_repo.attach_to_order(audit_request_id, order_id).await? {
            return Ok(());
        }
        if self.audit_repo.exists(audit_request_id).await? {
            Err(EngineError::Conflict {
                entity: format!("pricing audit {audit_request_id}"),
                message: "audit record is already linked to an order".to_string(),
            })
        } else {
            Err(EngineError::not_found(format!("pricing audit {audit_request_id}")))
        }
    }
}
