use dispatch_engine::domain::dispatch::{AssignmentOutcome, DispatchAuditRecord};
use dispatch_engine::domain::pricing::PricingAuditRecord;
use uuid::Uuid;

#[test]
fn dispatch_audit_record_serializes() {
    let rec = DispatchAuditRecord {
        audit_id: Uuid::new_v4(),
        delivery_id: Some(Uuid::new_v4()),
        rider_id: Uuid::new_v4(),
        candidates_evaluated: 4,
        selection_score: 2.31,
        distance_meters: 5400.0,
        duration_seconds: 780.0,
        fallback_used: false,
        created_at: chrono::Utc::now(),
    };
    let s = serde_json::to_string(&rec).unwrap();
    assert!(s.contains("candidates_evaluated"));
    assert!(s.contains("selection_score"));
}

#[test]
fn pricing_audit_record_keeps_cold_rule_reference() {
    let rule_id = Uuid::new_v4();
    let rec = PricingAuditRecord {
        request_id: Uuid::new_v4(),
        order_id: None,
        distance_km: 8.0,
        duration_min: 14.5,
        matched_rule_id: Some(rule_id),
        calculated_fee: 5400.0,
        provider: "osrm".to_string(),
        cache_hit: true,
        fallback_used: false,
        order_context: serde_json::json!({"channel": "app"}),
        created_at: chrono::Utc::now(),
    };
    let s = serde_json::to_value(&rec).unwrap();
    assert_eq!(s["matched_rule_id"], serde_json::json!(rule_id));
    assert_eq!(s["cache_hit"], serde_json::json!(true));
}

#[test]
fn assignment_outcomes_tag_by_outcome() {
    let delivery_id = Uuid::new_v4();
    let assigned = AssignmentOutcome::Assigned {
        delivery_id,
        rider_id: Uuid::new_v4(),
        score: 1.9,
        distance_km: 3.2,
        candidates_evaluated: 5,
    };
    let v = serde_json::to_value(&assigned).unwrap();
    assert_eq!(v["outcome"], "assigned");

    let raced = AssignmentOutcome::AlreadyAssigned { delivery_id };
    let v = serde_json::to_value(&raced).unwrap();
    assert_eq!(v["outcome"], "already_assigned");
    assert_eq!(v["delivery_id"], serde_json::json!(delivery_id));
}
