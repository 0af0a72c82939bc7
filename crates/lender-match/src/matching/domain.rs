use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::policy::PolicyRule;

/// Identifier wrapper for submitted loan applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for lenders in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LenderId(pub String);

/// Identifier wrapper for a lender's financing programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub String);

/// Identifier wrapper for individual policy rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

macro_rules! display_id {
    ($($name:ident),+) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

display_id!(ApplicationId, LenderId, ProgramId, RuleId);

fn default_true() -> bool {
    true
}

fn default_fico_source() -> String {
    "TransUnion".to_string()
}

fn default_condition() -> String {
    "used".to_string()
}

fn default_priority() -> i32 {
    100
}

/// Business entity applying for equipment financing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    #[serde(default)]
    pub id: String,
    pub business_name: String,
    #[serde(default)]
    pub dba_name: Option<String>,
    pub industry: String,
    #[serde(default)]
    pub industry_naics: Option<String>,
    /// Two-letter state code.
    pub state: String,
    pub years_in_business: u32,
    pub annual_revenue: Decimal,
    #[serde(default)]
    pub num_employees: Option<u32>,
    #[serde(default)]
    pub num_trucks: Option<u32>,
    #[serde(default)]
    pub is_startup: bool,
    #[serde(default)]
    pub is_homeowner: bool,
    #[serde(default = "default_true")]
    pub is_us_citizen: bool,
    #[serde(default)]
    pub guarantors: Vec<Guarantor>,
}

/// Personal guarantor backing a business loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guarantor {
    #[serde(default)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Ownership share in percent, e.g. `51.00`.
    pub ownership_percentage: Decimal,
    pub fico_score: u32,
    #[serde(default = "default_fico_source")]
    pub fico_source: String,
    #[serde(default)]
    pub is_homeowner: bool,
    #[serde(default)]
    pub years_at_residence: Option<u32>,
    #[serde(default)]
    pub has_bankruptcy: bool,
    #[serde(default)]
    pub bankruptcy_type: Option<String>,
    #[serde(default)]
    pub bankruptcy_discharge_date: Option<NaiveDate>,
    #[serde(default)]
    pub has_judgments: bool,
    #[serde(default)]
    pub has_foreclosure: bool,
    #[serde(default)]
    pub has_repossession: bool,
    #[serde(default)]
    pub has_tax_liens: bool,
    #[serde(default)]
    pub has_collections_recent: bool,
    #[serde(default)]
    pub revolving_available_pct: Option<Decimal>,
    #[serde(default)]
    pub has_cdl: bool,
    #[serde(default)]
    pub cdl_years: Option<u32>,
    #[serde(default)]
    pub cdl_class: Option<String>,
}

impl Guarantor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Lifecycle of a loan application around an underwriting run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Draft,
    Submitted,
    Underwriting,
    Completed,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Underwriting => "underwriting",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Equipment financing request together with the borrower it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    #[serde(default)]
    pub id: ApplicationId,
    pub borrower: Borrower,
    pub amount_requested: Decimal,
    pub term_months: u32,
    #[serde(default)]
    pub down_payment_pct: Option<Decimal>,
    pub equipment_type: String,
    #[serde(default)]
    pub equipment_description: Option<String>,
    pub equipment_year: i32,
    pub equipment_age_years: u32,
    #[serde(default)]
    pub equipment_mileage: Option<u32>,
    #[serde(default)]
    pub equipment_hours: Option<u32>,
    #[serde(default = "default_condition")]
    pub equipment_condition: String,
    #[serde(default)]
    pub is_private_party_sale: bool,
    #[serde(default = "default_true")]
    pub is_titled_asset: bool,
    #[serde(default)]
    pub is_refinance: bool,
    #[serde(default)]
    pub is_sale_leaseback: bool,
    #[serde(default)]
    pub paynet_score: Option<u32>,
    #[serde(default)]
    pub has_comparable_credit: bool,
    #[serde(default)]
    pub comparable_credit_amount: Option<Decimal>,
    /// Comparable credit as a percentage of the requested amount.
    #[serde(default)]
    pub comparable_credit_pct: Option<Decimal>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub underwriting_completed_at: Option<DateTime<Utc>>,
}

/// Credit tier a lender program targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditTier {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    E,
}

/// Equipment finance lender and its programs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lender {
    #[serde(default)]
    pub id: LenderId,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub programs: Vec<LenderProgram>,
}

/// A lender's financing tier (e.g. "Tier 1", "Trucking", "A Credit").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LenderProgram {
    #[serde(default)]
    pub id: ProgramId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub credit_tier: Option<CreditTier>,
    #[serde(default)]
    pub min_loan_amount: Option<u64>,
    #[serde(default)]
    pub max_loan_amount: Option<u64>,
    #[serde(default)]
    pub max_term_months: Option<u32>,
    #[serde(default)]
    pub is_app_only: bool,
    #[serde(default)]
    pub requires_financials: bool,
    /// Lower values are evaluated first and win score ties.
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}
