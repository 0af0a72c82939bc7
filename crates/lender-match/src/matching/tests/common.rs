use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use crate::matching::context::EvaluationContext;
use crate::matching::domain::{
    ApplicationId, ApplicationStatus, Borrower, Guarantor, Lender, LenderId, LenderProgram,
    LoanApplication, ProgramId,
};
use crate::matching::memory::{InMemoryApplications, InMemoryLenderCatalog, InMemoryMatchResults};
use crate::matching::policy::{PolicyRule, RuleValueError};
use crate::matching::repository::{ApplicationRepository, LenderCatalog, RepositoryError};
use crate::matching::rules::{EvaluationResult, RuleEvaluator, RuleRegistry};
use crate::matching::{underwriting_router, MatchingEngine, UnderwritingService};

pub(super) type MemoryService =
    UnderwritingService<InMemoryApplications, InMemoryLenderCatalog, InMemoryMatchResults>;

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

pub(super) fn guarantor(first_name: &str, ownership: Decimal, fico_score: u32) -> Guarantor {
    Guarantor {
        id: format!("g-{}", first_name.to_lowercase()),
        first_name: first_name.to_string(),
        last_name: "Rivera".to_string(),
        ownership_percentage: ownership,
        fico_score,
        fico_source: "TransUnion".to_string(),
        is_homeowner: true,
        years_at_residence: Some(6),
        has_bankruptcy: false,
        bankruptcy_type: None,
        bankruptcy_discharge_date: None,
        has_judgments: false,
        has_foreclosure: false,
        has_repossession: false,
        has_tax_liens: false,
        has_collections_recent: false,
        revolving_available_pct: Some(dec!(45)),
        has_cdl: false,
        cdl_years: None,
        cdl_class: None,
    }
}

pub(super) fn borrower() -> Borrower {
    Borrower {
        id: "b-summit".to_string(),
        business_name: "Summit Excavation LLC".to_string(),
        dba_name: None,
        industry: "Construction".to_string(),
        industry_naics: Some("238910".to_string()),
        state: "TX".to_string(),
        years_in_business: 5,
        annual_revenue: dec!(1250000),
        num_employees: Some(14),
        num_trucks: None,
        is_startup: false,
        is_homeowner: false,
        is_us_citizen: true,
        guarantors: vec![
            guarantor("Maria", dec!(60), 720),
            guarantor("Dana", dec!(40), 680),
        ],
    }
}

pub(super) fn application() -> LoanApplication {
    LoanApplication {
        id: ApplicationId("app-fixture".to_string()),
        borrower: borrower(),
        amount_requested: dec!(75000),
        term_months: 48,
        down_payment_pct: Some(dec!(10)),
        equipment_type: "Excavator".to_string(),
        equipment_description: Some("2022 CAT 320".to_string()),
        equipment_year: 2022,
        equipment_age_years: 3,
        equipment_mileage: None,
        equipment_hours: Some(2100),
        equipment_condition: "used".to_string(),
        is_private_party_sale: false,
        is_titled_asset: false,
        is_refinance: false,
        is_sale_leaseback: false,
        paynet_score: Some(690),
        has_comparable_credit: true,
        comparable_credit_amount: Some(dec!(60000)),
        comparable_credit_pct: Some(dec!(80)),
        status: ApplicationStatus::Draft,
        submitted_at: None,
        underwriting_completed_at: None,
    }
}

pub(super) fn trucking_application() -> LoanApplication {
    let mut application = application();
    application.id = ApplicationId("app-trucking".to_string());
    application.borrower.business_name = "Redline Freight Inc".to_string();
    application.borrower.industry = "Long Haul Trucking".to_string();
    application.borrower.num_trucks = Some(6);
    application.equipment_type = "Class 8 Semi Truck".to_string();
    application.equipment_mileage = Some(425000);
    application.equipment_hours = None;
    application.is_titled_asset = true;
    for guarantor in &mut application.borrower.guarantors {
        guarantor.has_cdl = true;
        guarantor.cdl_years = Some(8);
        guarantor.cdl_class = Some("A".to_string());
    }
    application
}

pub(super) fn context() -> EvaluationContext {
    EvaluationContext::build(&application(), as_of())
}

pub(super) fn rule(rule_type: &str, payload: Value) -> PolicyRule {
    PolicyRule::new(rule_type, payload)
        .expect("fixture rule is well formed")
        .with_id(format!("rule-{rule_type}"))
}

pub(super) fn program(id: &str, priority: i32, rules: Vec<PolicyRule>) -> LenderProgram {
    LenderProgram {
        id: ProgramId(id.to_string()),
        name: id.replace('-', " "),
        description: None,
        credit_tier: None,
        min_loan_amount: None,
        max_loan_amount: None,
        max_term_months: None,
        is_app_only: false,
        requires_financials: false,
        priority,
        is_active: true,
        rules,
    }
}

pub(super) fn lender(id: &str, name: &str, programs: Vec<LenderProgram>) -> Lender {
    Lender {
        id: LenderId(id.to_string()),
        name: name.to_string(),
        short_name: None,
        description: None,
        is_active: true,
        programs,
    }
}

/// Four lenders: one clean approval, one eligible on its second program,
/// one declining the fixture, and one inactive.
pub(super) fn catalog() -> Vec<Lender> {
    let mut dormant = lender(
        "lender-dormant",
        "Dormant Leasing Co",
        vec![program("dormant-standard", 10, Vec::new())],
    );
    dormant.is_active = false;

    vec![
        lender(
            "lender-west",
            "Westbound Trucking Finance",
            vec![program(
                "west-fleet",
                10,
                vec![
                    rule("excluded_states", json!({ "value": ["TX", "OK"] })),
                    rule("requires_cdl", json!({ "value": true })),
                ],
            )],
        ),
        lender(
            "lender-apex",
            "Apex Commercial Capital",
            vec![
                program(
                    "apex-a-credit",
                    10,
                    vec![
                        rule("fico_min", json!({ "value": 740 })),
                        rule("paynet_min", json!({ "value": 680 })),
                    ],
                ),
                program(
                    "apex-b-credit",
                    20,
                    vec![
                        rule("fico_min", json!({ "value": 700 })),
                        rule("comparable_credit_pct", json!({ "value": 90 })).required(false),
                    ],
                ),
            ],
        ),
        lender(
            "lender-prime",
            "Prime Equipment Finance",
            vec![program(
                "prime-tier-1",
                10,
                vec![
                    rule("fico_min", json!({ "value": 700 })).weight(20),
                    rule("tib_min", json!({ "value": 2 })).weight(15),
                    rule("amount_max", json!({ "value": 250000 })),
                    rule("excluded_states", json!({ "value": ["CA"] })).weight(15),
                    rule("requires_homeowner", json!({ "value": true })).weight(15),
                ],
            )],
        ),
        dormant,
    ]
}

pub(super) fn build_service(
    lenders: Vec<Lender>,
) -> (
    MemoryService,
    Arc<InMemoryApplications>,
    Arc<InMemoryMatchResults>,
) {
    build_service_with_engine(lenders, MatchingEngine::standard())
}

pub(super) fn build_service_with_engine(
    lenders: Vec<Lender>,
    engine: MatchingEngine,
) -> (
    MemoryService,
    Arc<InMemoryApplications>,
    Arc<InMemoryMatchResults>,
) {
    let applications = Arc::new(InMemoryApplications::default());
    let results = Arc::new(InMemoryMatchResults::default());
    let service = UnderwritingService::new(
        applications.clone(),
        Arc::new(InMemoryLenderCatalog::new(lenders)),
        results.clone(),
        engine,
    );
    (service, applications, results)
}

/// Plugin evaluator for `fleet_age_band` that expects an integer payload,
/// so band objects like `{"min": 1, "max": 6}` fail at evaluation time.
pub(super) struct IntegerFleetAgeBand;

impl RuleEvaluator for IntegerFleetAgeBand {
    fn rule_type(&self) -> &str {
        "fleet_age_band"
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let max_age = rule.value().as_integer(rule.rule_type())?;
        Ok(EvaluationResult {
            passed: i64::from(ctx.equipment_age_years) <= max_age,
            rule_type: rule.rule_type().to_string(),
            rule_id: rule.id.clone(),
            required_value: json!(max_age),
            actual_value: json!(ctx.equipment_age_years),
            is_required: rule.is_required,
            weight: rule.weight,
            reason: "fleet age band checked".to_string(),
        })
    }
}

pub(super) fn fleet_band_engine() -> MatchingEngine {
    MatchingEngine::new(RuleRegistry::standard().with_evaluator(IntegerFleetAgeBand))
}

/// A lender whose only rule carries a band payload `IntegerFleetAgeBand` cannot read.
pub(super) fn fleet_band_lender() -> Lender {
    lender(
        "lender-fleet",
        "Fleet Band Leasing",
        vec![program(
            "fleet-band",
            10,
            vec![rule("fleet_age_band", json!({ "min": 1, "max": 6 }))],
        )],
    )
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    underwriting_router(Arc::new(service))
}

pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(&self, _application: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: LoanApplication) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(
        &self,
        _status: Option<ApplicationStatus>,
    ) -> Result<Vec<LoanApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct OfflineCatalog;

impl LenderCatalog for OfflineCatalog {
    fn active_lenders(&self) -> Result<Vec<Lender>, RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }

    fn lenders(&self) -> Result<Vec<Lender>, RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }

    fn fetch(&self, _id: &LenderId) -> Result<Option<Lender>, RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }

    fn insert(&self, _lender: Lender) -> Result<Lender, RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
