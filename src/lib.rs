pub mod cache {
    pub mod distance_cache;
}
pub mod config;
pub mod domain {
    pub mod coordinates;
    pub mod dispatch;
    pub mod pricing;
    pub mod rider;
}
pub mod error;
pub mod http {
    pub mod handlers {
        pub mod dispatch;
        pub mod fees;
        pub mod metrics;
        pub mod pricing_rules;
        pub mod riders;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
    pub mod router;
}
pub mod pricing {
    pub mod calculator;
    pub mod rules;
}
pub mod repo {
    pub mod deliveries_repo;
    pub mod dispatch_audit_repo;
    pub mod pricing_audit_repo;
    pub mod pricing_rules_repo;
    pub mod riders_repo;
}
pub mod routing;
pub mod scoring {
    pub mod engine;
    pub mod types;
}
pub mod service {
    pub mod dispatch_service;
    pub mod fee_service;
}

#[derive(Clone)]
pub struct AppState {
    pub fee_service: service::fee_service::FeeService,
    pub dispatch_service: service::dispatch_service::DispatchService,
    pub rules_repo: repo::pricing_rules_repo::PricingRulesRepo,
    pub riders_repo: repo::riders_repo::RidersRepo,
    pub pricing_audit_repo: repo::pricing_audit_repo::PricingAuditRepo,
    pub dispatch_audit_repo: repo::dispatch_audit_repo::DispatchAuditRepo,
    pub cache: cache::distance_cache::DistanceCache,
}
