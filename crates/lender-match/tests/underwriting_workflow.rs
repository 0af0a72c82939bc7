//! End-to-end underwriting scenarios driven through the public service facade, with the lender
//! catalog and application loaded from JSON the way the API service loads them.

mod common {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use serde_json::json;

    use lender_match::matching::{
        InMemoryApplications, InMemoryLenderCatalog, InMemoryMatchResults, LoanApplication,
        MatchingEngine, UnderwritingService,
    };

    pub(super) type Service =
        UnderwritingService<InMemoryApplications, InMemoryLenderCatalog, InMemoryMatchResults>;

    pub(super) fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 15).expect("valid date")
    }

    pub(super) fn trucking_application() -> LoanApplication {
        serde_json::from_value(json!({
            "borrower": {
                "business_name": "Redline Freight Inc",
                "industry": "Long Haul Trucking",
                "state": "ca",
                "years_in_business": 7,
                "annual_revenue": "2400000",
                "num_trucks": 9,
                "guarantors": [
                    {
                        "first_name": "Jordan",
                        "last_name": "Pike",
                        "ownership_percentage": "35",
                        "fico_score": 661,
                        "has_cdl": true,
                        "cdl_years": 2
                    },
                    {
                        "first_name": "Avery",
                        "last_name": "Pike",
                        "ownership_percentage": "65",
                        "fico_score": 705,
                        "is_homeowner": true,
                        "has_cdl": true,
                        "cdl_years": 11,
                        "cdl_class": "A"
                    }
                ]
            },
            "amount_requested": "120000",
            "term_months": 60,
            "equipment_type": "Class 8 Semi Truck",
            "equipment_year": 2021,
            "equipment_age_years": 4,
            "equipment_mileage": 450000,
            "paynet_score": 660
        }))
        .expect("application payload deserializes")
    }

    pub(super) const CATALOG: &str = r#"[
        {
            "id": "lender-coastal",
            "name": "Coastal Equipment Finance",
            "programs": [
                {
                    "id": "coastal-standard",
                    "name": "Standard",
                    "rules": [
                        { "rule_type": "excluded_states", "value": { "value": ["CA", "NV"] } },
                        { "rule_type": "fico_min", "value": { "value": 650 } }
                    ]
                }
            ]
        },
        {
            "id": "lender-prestige",
            "name": "Prestige Capital",
            "programs": [
                {
                    "id": "prestige-tier-2",
                    "name": "Tier 2",
                    "priority": 2,
                    "rules": [
                        { "rule_type": "fico_min", "value": { "value": 700 } },
                        { "rule_type": "paynet_min", "value": { "value": 680 }, "is_required": false }
                    ]
                },
                {
                    "id": "prestige-tier-1",
                    "name": "Tier 1",
                    "priority": 1,
                    "rules": [
                        { "rule_type": "fico_min", "value": { "value": 740 } },
                        { "rule_type": "tib_min", "value": { "value": 5 } }
                    ]
                }
            ]
        },
        {
            "id": "lender-paused",
            "name": "Paused Leasing",
            "programs": [
                { "id": "paused-main", "name": "Main", "is_active": false, "rules": [] }
            ]
        },
        {
            "id": "lender-roadway",
            "name": "Roadway Capital",
            "programs": [
                {
                    "id": "roadway-trucking",
                    "name": "Trucking",
                    "priority": 10,
                    "rules": [
                        { "rule_type": "fico_min", "value": { "value": 680 }, "weight": 20, "priority": 1 },
                        { "rule_type": "requires_cdl", "value": { "value": true }, "priority": 2 },
                        { "rule_type": "cdl_years_min", "value": { "value": 3 }, "priority": 3 },
                        { "rule_type": "equipment_mileage_max", "value": { "value": 500000 }, "priority": 4 },
                        { "rule_type": "amount_max", "value": { "value": 150000 }, "priority": 5 },
                        { "rule_type": "fleet_age_band", "value": { "min": 1, "max": 6 }, "priority": 6 }
                    ]
                }
            ]
        },
        {
            "id": "lender-retired",
            "name": "Retired Funding",
            "is_active": false,
            "programs": []
        }
    ]"#;

    pub(super) fn service() -> Service {
        let catalog = InMemoryLenderCatalog::from_json(CATALOG).expect("catalog parses");
        UnderwritingService::new(
            Arc::new(InMemoryApplications::default()),
            Arc::new(catalog),
            Arc::new(InMemoryMatchResults::default()),
            MatchingEngine::standard().with_parallel_lenders(true),
        )
    }
}

use common::*;
use serde_json::json;

use lender_match::matching::{
    ApplicationStatus, InMemoryLenderCatalog, LenderId, ProgramId, NO_ACTIVE_PROGRAMS,
};

#[test]
fn trucking_application_ranks_lenders_end_to_end() {
    let service = service();
    let stored = service
        .submit(trucking_application())
        .expect("application accepted");
    assert_eq!(stored.status, ApplicationStatus::Draft);

    let summary = service
        .underwrite_as_of(&stored.id, as_of())
        .expect("underwriting completes");

    let ranked: Vec<(&str, bool, u8)> = summary
        .results
        .iter()
        .map(|line| (line.lender_id.0.as_str(), line.is_eligible, line.fit_score))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("lender-roadway", true, 100),
            ("lender-prestige", true, 50),
            ("lender-coastal", false, 35),
            ("lender-paused", false, 0),
        ]
    );
    assert_eq!(summary.eligible_count, 2);
    assert_eq!(summary.ineligible_count, 2);
}

#[test]
fn stored_results_explain_each_lender_decision() {
    let service = service();
    let stored = service
        .submit(trucking_application())
        .expect("application accepted");
    service
        .underwrite_as_of(&stored.id, as_of())
        .expect("underwriting completes");

    let results = service.results(&stored.id).expect("results stored");
    assert_eq!(results.status, ApplicationStatus::Completed);

    let roadway = results.best_match.as_ref().expect("best match present");
    assert_eq!(roadway.lender_id, LenderId("lender-roadway".to_string()));
    let details = &roadway.evaluation_details;
    assert_eq!(details.rules_evaluated, 5);
    let reasons: Vec<&str> = details
        .summary
        .passed
        .iter()
        .map(|detail| detail.reason.as_str())
        .collect();
    assert_eq!(reasons[0], "FICO score 705 meets minimum requirement of 680");
    assert_eq!(details.summary.passed[2].actual_value, json!(11));

    let prestige = &results.results[1];
    assert_eq!(prestige.program_id, Some(ProgramId("prestige-tier-2".to_string())));
    assert_eq!(prestige.evaluation_details.summary.failed[0].rule_type, "paynet_min");

    let coastal = &results.results[2];
    let rejection = &coastal.evaluation_details.summary.failed[0];
    assert_eq!(rejection.actual_value, json!("CA"));
    assert!(rejection.is_required);

    let paused = &results.results[3];
    assert!(paused.program_id.is_none());
    assert_eq!(
        paused.evaluation_details.summary.warnings,
        vec![NO_ACTIVE_PROGRAMS.to_string()]
    );
}

#[test]
fn catalog_rule_types_without_evaluators_are_reported() {
    let service = service();
    let lenders = service.lenders().expect("catalog readable");

    let unknown = service.engine().registry().unknown_rule_types(&lenders);

    assert_eq!(unknown, vec!["fleet_age_band".to_string()]);
}

#[test]
fn malformed_catalog_is_rejected_at_load() {
    let catalog = r#"[{
        "id": "lender-broken",
        "name": "Broken",
        "programs": [{
            "id": "broken-main",
            "name": "Main",
            "rules": [{ "rule_type": "excluded_states", "value": { "value": 42 } }]
        }]
    }]"#;

    let error = InMemoryLenderCatalog::from_json(catalog).expect_err("payload shape rejected");
    assert!(error.to_string().contains("excluded_states"));
}
