mod business;
mod credit;
mod exclusions;
mod loan;
mod requirements;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::EvaluationContext;
use super::domain::{Lender, RuleId};
use super::policy::{PolicyRule, RuleOperator, RuleValueError};

pub use business::{NumTrucksMin, TimeInBusinessMin};
pub use credit::{
    BankruptcyYearsMin, FicoMin, NoBankruptcies, NoForeclosures, NoJudgments, NoRepossessions,
    NoTaxLiens, PaynetMin,
};
pub use exclusions::{ExcludedEquipment, ExcludedIndustries, ExcludedStates};
pub use loan::{AmountMax, AmountMin, EquipmentAgeMax, EquipmentMileageMax, TermMax};
pub use requirements::{
    CdlYearsMin, ComparableCreditPct, NoPrivateParty, NoRefinance, NoSaleLeaseback,
    RequiresCdl, RequiresHomeowner, RequiresUsCitizen, RevolvingAvailableMin,
};

/// Rule types understood by the standard registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    FicoMin,
    PaynetMin,
    TibMin,
    NumTrucksMin,
    AmountMin,
    AmountMax,
    TermMax,
    EquipmentAgeMax,
    EquipmentMileageMax,
    ExcludedStates,
    ExcludedIndustries,
    ExcludedEquipment,
    NoBankruptcies,
    BankruptcyYearsMin,
    NoJudgments,
    NoForeclosures,
    NoRepossessions,
    NoTaxLiens,
    RequiresHomeowner,
    RequiresCdl,
    CdlYearsMin,
    ComparableCreditPct,
    RevolvingAvailableMin,
    RequiresUsCitizen,
    NoPrivateParty,
    NoRefinance,
    NoSaleLeaseback,
}

/// JSON shape a rule type's payload must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Integer,
    Decimal,
    Terms,
    Flag,
}

impl RuleType {
    pub const ALL: [RuleType; 27] = [
        RuleType::FicoMin,
        RuleType::PaynetMin,
        RuleType::TibMin,
        RuleType::NumTrucksMin,
        RuleType::AmountMin,
        RuleType::AmountMax,
        RuleType::TermMax,
        RuleType::EquipmentAgeMax,
        RuleType::EquipmentMileageMax,
        RuleType::ExcludedStates,
        RuleType::ExcludedIndustries,
        RuleType::ExcludedEquipment,
        RuleType::NoBankruptcies,
        RuleType::BankruptcyYearsMin,
        RuleType::NoJudgments,
        RuleType::NoForeclosures,
        RuleType::NoRepossessions,
        RuleType::NoTaxLiens,
        RuleType::RequiresHomeowner,
        RuleType::RequiresCdl,
        RuleType::CdlYearsMin,
        RuleType::ComparableCreditPct,
        RuleType::RevolvingAvailableMin,
        RuleType::RequiresUsCitizen,
        RuleType::NoPrivateParty,
        RuleType::NoRefinance,
        RuleType::NoSaleLeaseback,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RuleType::FicoMin => "fico_min",
            RuleType::PaynetMin => "paynet_min",
            RuleType::TibMin => "tib_min",
            RuleType::NumTrucksMin => "num_trucks_min",
            RuleType::AmountMin => "amount_min",
            RuleType::AmountMax => "amount_max",
            RuleType::TermMax => "term_max",
            RuleType::EquipmentAgeMax => "equipment_age_max",
            RuleType::EquipmentMileageMax => "equipment_mileage_max",
            RuleType::ExcludedStates => "excluded_states",
            RuleType::ExcludedIndustries => "excluded_industries",
            RuleType::ExcludedEquipment => "excluded_equipment",
            RuleType::NoBankruptcies => "no_bankruptcies",
            RuleType::BankruptcyYearsMin => "bankruptcy_years_min",
            RuleType::NoJudgments => "no_judgments",
            RuleType::NoForeclosures => "no_foreclosures",
            RuleType::NoRepossessions => "no_repossessions",
            RuleType::NoTaxLiens => "no_tax_liens",
            RuleType::RequiresHomeowner => "requires_homeowner",
            RuleType::RequiresCdl => "requires_cdl",
            RuleType::CdlYearsMin => "cdl_years_min",
            RuleType::ComparableCreditPct => "comparable_credit_pct",
            RuleType::RevolvingAvailableMin => "revolving_available_min",
            RuleType::RequiresUsCitizen => "requires_us_citizen",
            RuleType::NoPrivateParty => "no_private_party",
            RuleType::NoRefinance => "no_refinance",
            RuleType::NoSaleLeaseback => "no_sale_leaseback",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub const fn payload_shape(self) -> PayloadShape {
        match self {
            RuleType::AmountMin
            | RuleType::AmountMax
            | RuleType::ComparableCreditPct
            | RuleType::RevolvingAvailableMin => PayloadShape::Decimal,
            RuleType::ExcludedStates
            | RuleType::ExcludedIndustries
            | RuleType::ExcludedEquipment => PayloadShape::Terms,
            RuleType::NoBankruptcies
            | RuleType::NoJudgments
            | RuleType::NoForeclosures
            | RuleType::NoRepossessions
            | RuleType::NoTaxLiens
            | RuleType::RequiresHomeowner
            | RuleType::RequiresCdl
            | RuleType::RequiresUsCitizen
            | RuleType::NoPrivateParty
            | RuleType::NoRefinance
            | RuleType::NoSaleLeaseback => PayloadShape::Flag,
            RuleType::FicoMin
            | RuleType::PaynetMin
            | RuleType::TibMin
            | RuleType::NumTrucksMin
            | RuleType::TermMax
            | RuleType::EquipmentAgeMax
            | RuleType::EquipmentMileageMax
            | RuleType::BankruptcyYearsMin
            | RuleType::CdlYearsMin => PayloadShape::Integer,
        }
    }

    /// Operator a catalog author would declare for this rule type.
    pub const fn declared_operator(self) -> RuleOperator {
        match self {
            RuleType::AmountMax
            | RuleType::TermMax
            | RuleType::EquipmentAgeMax
            | RuleType::EquipmentMileageMax => RuleOperator::Lte,
            RuleType::ExcludedStates
            | RuleType::ExcludedIndustries
            | RuleType::ExcludedEquipment => RuleOperator::NotIn,
            _ => match self.payload_shape() {
                PayloadShape::Flag => RuleOperator::Eq,
                _ => RuleOperator::Gte,
            },
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one rule against one context; persisted as a rule detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub passed: bool,
    pub rule_type: String,
    pub rule_id: RuleId,
    pub required_value: Value,
    pub actual_value: Value,
    pub is_required: bool,
    pub weight: u32,
    pub reason: String,
}

pub type RuleDetail = EvaluationResult;

impl EvaluationResult {
    pub(crate) fn for_rule(
        rule: &PolicyRule,
        passed: bool,
        required_value: Value,
        actual_value: Value,
        reason: String,
    ) -> Self {
        Self {
            passed,
            rule_type: rule.rule_type().to_string(),
            rule_id: rule.id.clone(),
            required_value,
            actual_value,
            is_required: rule.is_required,
            weight: rule.weight,
            reason,
        }
    }
}

/// Stateless check of one rule type against an evaluation context.
///
/// The error arm only fires when a rule's payload does not fit the evaluator;
/// business conditions always produce a result.
pub trait RuleEvaluator: Send + Sync {
    fn rule_type(&self) -> &str;

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError>;
}

fn standard_evaluator(kind: RuleType) -> Arc<dyn RuleEvaluator> {
    match kind {
        RuleType::FicoMin => Arc::new(FicoMin),
        RuleType::PaynetMin => Arc::new(PaynetMin),
        RuleType::TibMin => Arc::new(TimeInBusinessMin),
        RuleType::NumTrucksMin => Arc::new(NumTrucksMin),
        RuleType::AmountMin => Arc::new(AmountMin),
        RuleType::AmountMax => Arc::new(AmountMax),
        RuleType::TermMax => Arc::new(TermMax),
        RuleType::EquipmentAgeMax => Arc::new(EquipmentAgeMax),
        RuleType::EquipmentMileageMax => Arc::new(EquipmentMileageMax),
        RuleType::ExcludedStates => Arc::new(ExcludedStates),
        RuleType::ExcludedIndustries => Arc::new(ExcludedIndustries),
        RuleType::ExcludedEquipment => Arc::new(ExcludedEquipment),
        RuleType::NoBankruptcies => Arc::new(NoBankruptcies),
        RuleType::BankruptcyYearsMin => Arc::new(BankruptcyYearsMin),
        RuleType::NoJudgments => Arc::new(NoJudgments),
        RuleType::NoForeclosures => Arc::new(NoForeclosures),
        RuleType::NoRepossessions => Arc::new(NoRepossessions),
        RuleType::NoTaxLiens => Arc::new(NoTaxLiens),
        RuleType::RequiresHomeowner => Arc::new(RequiresHomeowner),
        RuleType::RequiresCdl => Arc::new(RequiresCdl),
        RuleType::CdlYearsMin => Arc::new(CdlYearsMin),
        RuleType::ComparableCreditPct => Arc::new(ComparableCreditPct),
        RuleType::RevolvingAvailableMin => Arc::new(RevolvingAvailableMin),
        RuleType::RequiresUsCitizen => Arc::new(RequiresUsCitizen),
        RuleType::NoPrivateParty => Arc::new(NoPrivateParty),
        RuleType::NoRefinance => Arc::new(NoRefinance),
        RuleType::NoSaleLeaseback => Arc::new(NoSaleLeaseback),
    }
}

/// Immutable lookup from rule-type key to evaluator.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    evaluators: BTreeMap<String, Arc<dyn RuleEvaluator>>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with an evaluator for every [`RuleType`].
    pub fn standard() -> Self {
        let evaluators = RuleType::ALL
            .into_iter()
            .map(|kind| (kind.as_str().to_string(), standard_evaluator(kind)))
            .collect();
        Self { evaluators }
    }

    /// Add or replace the evaluator for `evaluator.rule_type()`.
    pub fn with_evaluator(mut self, evaluator: impl RuleEvaluator + 'static) -> Self {
        self.evaluators
            .insert(evaluator.rule_type().to_string(), Arc::new(evaluator));
        self
    }

    pub fn get(&self, rule_type: &str) -> Option<&dyn RuleEvaluator> {
        self.evaluators.get(rule_type).map(|evaluator| evaluator.as_ref())
    }

    pub fn supports(&self, rule_type: &str) -> bool {
        self.evaluators.contains_key(rule_type)
    }

    /// Registered rule-type keys in ascending order.
    pub fn supported_rule_types(&self) -> Vec<String> {
        self.evaluators.keys().cloned().collect()
    }

    /// Rule types used anywhere in `lenders` that have no evaluator.
    pub fn unknown_rule_types(&self, lenders: &[Lender]) -> Vec<String> {
        lenders
            .iter()
            .flat_map(|lender| &lender.programs)
            .flat_map(|program| &program.rules)
            .filter(|rule| !self.supports(rule.rule_type()))
            .map(|rule| rule.rule_type().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rule_types", &self.evaluators.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub(crate) fn outcome(passed: bool, pass: &'static str, fail: &'static str) -> &'static str {
    if passed {
        pass
    } else {
        fail
    }
}

/// Result for a boolean rule, echoing the expected and observed flags.
pub(crate) fn flag_result(
    rule: &PolicyRule,
    passed: bool,
    expected: bool,
    actual: bool,
    pass: &str,
    fail: &str,
) -> EvaluationResult {
    let reason = if passed { pass } else { fail };
    EvaluationResult::for_rule(
        rule,
        passed,
        Value::Bool(expected),
        Value::Bool(actual),
        reason.to_string(),
    )
}

/// Digits grouped with commas, e.g. `150,000`.
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Dollar amount with thousands separators and two decimals, e.g. `$75,000.00`.
pub(crate) fn format_currency(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = match whole.parse::<u64>() {
        Ok(value) => group_thousands(value),
        Err(_) => whole.to_string(),
    };
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}
