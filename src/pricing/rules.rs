use crate::domain::pricing::{PricingRule, SaveRuleRequest};
use crate::error::EngineError;

/// Field validation for a rule about to be saved. Range sanity only; the
/// overlap check needs the current active set and lives in [`find_overlap`].
pub fn validate_rule(req: &SaveRuleRequest) -> Result<(), EngineError> {
    if req.name.trim().is_empty() {
        return Err(EngineError::validation("name", "must not be empty"));
    }
    if !req.distance_min_km.is_finite() || req.distance_min_km < 0.0 {
        return Err(EngineError::validation(
            "distance_min_km",
            "must be a non-negative number",
        ));
    }
    if let Some(max) = req.distance_max_km {
        if !max.is_finite() || max <= req.distance_min_km {
            return Err(EngineError::validation(
                "distance_max_km",
                "must be null or greater than distance_min_km",
            ));
        }
    }
    if !req.base_fee.is_finite() || req.base_fee < 0.0 {
        return Err(EngineError::validation("base_fee", "must be a non-negative number"));
    }
    if !req.per_km_fee.is_finite() || req.per_km_fee < 0.0 {
        return Err(EngineError::validation("per_km_fee", "must be a non-negative number"));
    }
    if !req.surcharge_percent.is_finite() || req.surcharge_percent < -100.0 {
        return Err(EngineError::validation(
            "surcharge_percent",
            "must be a number no less than -100",
        ));
    }
    Ok(())
}

/// Overlap test over half-open `[min, max)` ranges with a null max treated as
/// +infinity. Adjacent ranges sharing an endpoint do not overlap. Returns the
/// first colliding active rule, skipping the rule being updated.
pub fn find_overlap<'a>(
    min: f64,
    max: Option<f64>,
    own_id: Option<uuid::Uuid>,
    existing: &'a [PricingRule],
) -> Option<&'a PricingRule> {
    let max_eff = max.unwrap_or(f64::INFINITY);
    existing.iter().find(|rule| {
        rule.active
            && Some(rule.rule_id) != own_id
            && min < rule.max_effective()
            && rule.distance_min_km < max_eff
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn rule(min: f64, max: Option<f64>) -> PricingRule {
        PricingRule {
            rule_id: Uuid::new_v4(),
            name: format!("band {min}"),
            priority: 100,
            distance_min_km: min,
            distance_max_km: max,
            base_fee: 1000.0,
            per_km_fee: 0.0,
            surcharge_percent: 0.0,
            notes: None,
            active: true,
        }
    }

    #[test]
    fn adjacent_bands_do_not_overlap() {
        let existing = vec![rule(0.0, Some(5.0))];
        assert!(find_overlap(5.0, Some(15.0), None, &existing).is_none());
    }

    #[test]
    fn intersecting_bands_overlap() {
        let existing = vec![rule(5.0, Some(12.0))];
        let hit = find_overlap(3.0, Some(10.0), None, &existing).expect("overlap");
        assert_eq!(hit.distance_min_km, 5.0);
    }

    #[test]
    fn open_ended_band_overlaps_everything_above_it() {
        let existing = vec![rule(10.0, None)];
        assert!(find_overlap(50.0, Some(60.0), None, &existing).is_some());
        assert!(find_overlap(0.0, Some(10.0), None, &existing).is_none());
    }

    #[test]
    fn inactive_rules_are_ignored() {
        let mut r = rule(0.0, Some(100.0));
        r.active = false;
        assert!(find_overlap(1.0, Some(2.0), None, &[r]).is_none());
    }

    #[test]
    fn updating_a_rule_skips_itself() {
        let r = rule(0.0, Some(5.0));
        let id = r.rule_id;
        let existing = vec![r];
        assert!(find_overlap(0.0, Some(6.0), Some(id), &existing).is_none());
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let mut req = SaveRuleRequest {
            rule_id: None,
            name: "Short haul".to_string(),
            priority: 100,
            distance_min_km: 0.0,
            distance_max_km: Some(5.0),
            base_fee: 2000.0,
            per_km_fee: 0.0,
            surcharge_percent: 0.0,
            notes: None,
            active: true,
        };
        assert!(validate_rule(&req).is_ok());

        req.name = "  ".to_string();
        assert!(validate_rule(&req).is_err());

        req.name = "Short haul".to_string();
        req.distance_max_km = Some(0.0);
        assert!(validate_rule(&req).is_err());

        req.distance_max_km = None;
        req.distance_min_km = -1.0;
        assert!(validate_rule(&req).is_err());
    }
}
