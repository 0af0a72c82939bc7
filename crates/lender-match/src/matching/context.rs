use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::domain::{Guarantor, LoanApplication};

const TRUCKING_KEYWORDS: [&str; 7] = [
    "truck", "trailer", "reefer", "class 8", "semi", "tractor", "otr",
];

/// Flattened, read-only view of an application used by every rule evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    pub business_name: String,
    pub industry: String,
    pub state: String,
    pub years_in_business: u32,
    pub annual_revenue: Decimal,
    pub num_trucks: Option<u32>,
    pub is_startup: bool,
    pub is_homeowner: bool,
    pub is_us_citizen: bool,

    pub guarantor_fico: u32,
    pub guarantor_fico_source: String,
    pub guarantor_is_homeowner: bool,
    pub guarantor_has_bankruptcy: bool,
    pub guarantor_bankruptcy_discharge_date: Option<NaiveDate>,
    pub guarantor_has_judgments: bool,
    pub guarantor_has_foreclosure: bool,
    pub guarantor_has_repossession: bool,
    pub guarantor_has_tax_liens: bool,
    pub guarantor_has_collections_recent: bool,
    pub guarantor_revolving_available_pct: Option<Decimal>,
    pub guarantor_has_cdl: bool,
    pub guarantor_cdl_years: Option<u32>,

    pub amount_requested: Decimal,
    pub term_months: u32,
    pub equipment_type: String,
    pub equipment_age_years: u32,
    pub equipment_mileage: Option<u32>,
    pub is_private_party_sale: bool,
    pub is_titled_asset: bool,
    pub is_refinance: bool,
    pub is_sale_leaseback: bool,
    pub paynet_score: Option<u32>,
    pub comparable_credit_pct: Option<Decimal>,

    /// Reference date for recency calculations.
    pub as_of: NaiveDate,
}

impl EvaluationContext {
    pub fn build(application: &LoanApplication, as_of: NaiveDate) -> Self {
        let borrower = &application.borrower;
        let primary = primary_guarantor(&borrower.guarantors);

        Self {
            business_name: borrower.business_name.clone(),
            industry: borrower.industry.clone(),
            state: borrower.state.clone(),
            years_in_business: borrower.years_in_business,
            annual_revenue: borrower.annual_revenue,
            num_trucks: borrower.num_trucks,
            is_startup: borrower.is_startup,
            is_homeowner: borrower.is_homeowner,
            is_us_citizen: borrower.is_us_citizen,

            guarantor_fico: primary.map_or(0, |g| g.fico_score),
            guarantor_fico_source: primary
                .map(|g| g.fico_source.clone())
                .unwrap_or_default(),
            guarantor_is_homeowner: primary.is_some_and(|g| g.is_homeowner),
            guarantor_has_bankruptcy: primary.is_some_and(|g| g.has_bankruptcy),
            guarantor_bankruptcy_discharge_date: primary
                .and_then(|g| g.bankruptcy_discharge_date),
            guarantor_has_judgments: primary.is_some_and(|g| g.has_judgments),
            guarantor_has_foreclosure: primary.is_some_and(|g| g.has_foreclosure),
            guarantor_has_repossession: primary.is_some_and(|g| g.has_repossession),
            guarantor_has_tax_liens: primary.is_some_and(|g| g.has_tax_liens),
            guarantor_has_collections_recent: primary.is_some_and(|g| g.has_collections_recent),
            guarantor_revolving_available_pct: primary.and_then(|g| g.revolving_available_pct),
            guarantor_has_cdl: primary.is_some_and(|g| g.has_cdl),
            guarantor_cdl_years: primary.and_then(|g| g.cdl_years),

            amount_requested: application.amount_requested,
            term_months: application.term_months,
            equipment_type: application.equipment_type.clone(),
            equipment_age_years: application.equipment_age_years,
            equipment_mileage: application.equipment_mileage,
            is_private_party_sale: application.is_private_party_sale,
            is_titled_asset: application.is_titled_asset,
            is_refinance: application.is_refinance,
            is_sale_leaseback: application.is_sale_leaseback,
            paynet_score: application.paynet_score,
            comparable_credit_pct: application.comparable_credit_pct,

            as_of,
        }
    }

    /// True when the equipment type or industry looks like trucking.
    pub fn is_trucking(&self) -> bool {
        let equipment = self.equipment_type.to_lowercase();
        let industry = self.industry.to_lowercase();
        TRUCKING_KEYWORDS
            .iter()
            .any(|keyword| equipment.contains(keyword) || industry.contains(keyword))
    }

    /// Whole years between the discharge date and `as_of`, floored on 365-day years.
    pub fn years_since_bankruptcy(&self) -> Option<i64> {
        self.guarantor_bankruptcy_discharge_date
            .map(|discharged| (self.as_of - discharged).num_days().div_euclid(365))
    }
}

/// Guarantor with the highest ownership share; the earliest listed wins ties.
pub fn primary_guarantor(guarantors: &[Guarantor]) -> Option<&Guarantor> {
    guarantors.iter().fold(None, |best: Option<&Guarantor>, candidate| match best {
        Some(current) if current.ownership_percentage >= candidate.ownership_percentage => {
            Some(current)
        }
        _ => Some(candidate),
    })
}
