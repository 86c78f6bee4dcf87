use crate::domain::pricing::PricingRule;

/// First rule in resolution order whose half-open range contains the
/// distance. The caller passes rules already ordered by priority, then
/// distance_min_km (the store's listing order).
pub fn resolve_rule(rules: &[PricingRule], distance_km: f64) -> Option<&PricingRule> {
    rules.iter().filter(|r| r.active).find(|r| r.contains(distance_km))
}

/// `base + per_km * total distance`, surcharge applied on top, rounded to
/// 2 decimals and floored at 0. Per-km pricing multiplies the whole distance,
/// not the excess over the band floor.
pub fn compute_fee(rule: &PricingRule, distance_km: f64) -> f64 {
    let raw = rule.base_fee + rule.per_km_fee * distance_km;
    let with_surcharge = raw * (1.0 + rule.surcharge_percent / 100.0);
    round2(with_surcharge.max(0.0))
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn rule(min: f64, max: Option<f64>, base: f64, per_km: f64, surcharge: f64) -> PricingRule {
        PricingRule {
            rule_id: Uuid::new_v4(),
            name: format!("band {min}"),
            priority: 100,
            distance_min_km: min,
            distance_max_km: max,
            base_fee: base,
            per_km_fee: per_km,
            surcharge_percent: surcharge,
            notes: None,
            active: true,
        }
    }

    #[test]
    fn second_band_wins_for_eight_km() {
        let rules = vec![
            rule(0.0, Some(5.0), 2000.0, 0.0, 0.0),
            rule(5.0, Some(15.0), 3000.0, 300.0, 0.0),
        ];
        let matched = resolve_rule(&rules, 8.0).expect("rule");
        assert_eq!(matched.base_fee, 3000.0);
        assert_eq!(compute_fee(matched, 8.0), 5400.0);
    }

    #[test]
    fn band_boundaries_are_half_open() {
        let rules = vec![
            rule(0.0, Some(5.0), 2000.0, 0.0, 0.0),
            rule(5.0, Some(15.0), 3000.0, 0.0, 0.0),
        ];
        assert_eq!(resolve_rule(&rules, 5.0).unwrap().base_fee, 3000.0);
        assert_eq!(resolve_rule(&rules, 4.999).unwrap().base_fee, 2000.0);
        assert!(resolve_rule(&rules, 15.0).is_none());
    }

    #[test]
    fn surcharge_applies_after_per_km() {
        let r = rule(0.0, None, 1000.0, 100.0, 10.0);
        // (1000 + 100*4) * 1.1 = 1540
        assert_eq!(compute_fee(&r, 4.0), 1540.0);
    }

    #[test]
    fn fee_rounds_to_two_decimals_and_floors_at_zero() {
        let r = rule(0.0, None, 0.0, 0.333, 0.0);
        assert_eq!(compute_fee(&r, 1.0), 0.33);

        let negative = rule(0.0, None, 100.0, 0.0, -150.0);
        assert_eq!(compute_fee(&negative, 1.0), 0.0);
    }

    #[test]
    fn inactive_rules_never_match() {
        let mut r = rule(0.0, None, 1000.0, 0.0, 0.0);
        r.active = false;
        assert!(resolve_rule(&[r], 1.0).is_none());
    }
}
