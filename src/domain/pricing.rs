use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distance-banded fee rule. Active rules must never overlap; the range is
/// half-open `[distance_min_km, distance_max_km)`, a null max means open-ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRule {
    pub rule_id: Uuid,
    pub name: String,
    pub priority: i32,
    pub distance_min_km: f64,
    pub distance_max_km: Option<f64>,
    pub base_fee: f64,
    pub per_km_fee: f64,
    pub surcharge_percent: f64,
    pub notes: Option<String>,
    pub active: bool,
}

impl PricingRule {
    /// Upper bound with null treated as +infinity.
    pub fn max_effective(&self) -> f64 {
        self.distance_max_km.unwrap_or(f64::INFINITY)
    }

    pub fn contains(&self, distance_km: f64) -> bool {
        distance_km >= self.distance_min_km && distance_km < self.max_effective()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveRuleRequest {
    pub rule_id: Option<Uuid>,
    pub name: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    pub distance_min_km: f64,
    pub distance_max_km: Option<f64>,
    pub base_fee: f64,
    #[serde(default)]
    pub per_km_fee: f64,
    #[serde(default)]
    pub surcharge_percent: f64,
    pub notes: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_priority() -> i32 {
    100
}

fn default_active() -> bool {
    true
}

/// Checkout context snapshotted into the audit record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeeQuote {
    pub audit_request_id: Uuid,
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub calculated_fee: f64,
    pub rule: Option<PricingRule>,
    pub provider: String,
    pub cache_hit: bool,
    pub fallback_used: bool,
    pub metadata: FeeMetadata,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeeMetadata {
    pub no_rule_matched: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingAuditRecord {
    pub request_id: Uuid,
    pub order_id: Option<Uuid>,
    pub distance_km: f64,
    pub duration_min: f64,
    pub matched_rule_id: Option<Uuid>,
    pub calculated_fee: f64,
    pub provider: String,
    pub cache_hit: bool,
    pub fallback_used: bool,
    pub order_context: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
