use serde_json::Value;

use super::{flag_result, outcome, EvaluationResult, RuleEvaluator, RuleType};
use crate::matching::context::EvaluationContext;
use crate::matching::policy::{PolicyRule, RuleValueError};

pub struct FicoMin;

impl RuleEvaluator for FicoMin {
    fn rule_type(&self) -> &str {
        RuleType::FicoMin.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_integer(rule.rule_type())?;
        let actual = ctx.guarantor_fico;
        let passed = i64::from(actual) >= required;

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(required),
            Value::from(actual),
            format!(
                "FICO score {actual} {} minimum requirement of {required}",
                outcome(passed, "meets", "is below")
            ),
        ))
    }
}

/// Business credit score minimum; a missing score fails.
pub struct PaynetMin;

impl RuleEvaluator for PaynetMin {
    fn rule_type(&self) -> &str {
        RuleType::PaynetMin.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_integer(rule.rule_type())?;

        let Some(actual) = ctx.paynet_score else {
            return Ok(EvaluationResult::for_rule(
                rule,
                false,
                Value::from(required),
                Value::Null,
                format!("PayNet score required ({required} minimum) but not provided"),
            ));
        };

        let passed = i64::from(actual) >= required;
        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(required),
            Value::from(actual),
            format!(
                "PayNet score {actual} {} minimum requirement of {required}",
                outcome(passed, "meets", "is below")
            ),
        ))
    }
}

/// Shared shape of the "no adverse record" checks: pass iff the flag is unset.
fn clean_record(
    rule: &PolicyRule,
    on_record: bool,
    clean: &str,
    adverse: &str,
) -> EvaluationResult {
    flag_result(rule, !on_record, false, on_record, clean, adverse)
}

pub struct NoBankruptcies;

impl RuleEvaluator for NoBankruptcies {
    fn rule_type(&self) -> &str {
        RuleType::NoBankruptcies.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(clean_record(
            rule,
            ctx.guarantor_has_bankruptcy,
            "No bankruptcy history",
            "Bankruptcy on record - lender does not accept bankruptcies",
        ))
    }
}

/// Minimum whole years since bankruptcy discharge.
pub struct BankruptcyYearsMin;

impl RuleEvaluator for BankruptcyYearsMin {
    fn rule_type(&self) -> &str {
        RuleType::BankruptcyYearsMin.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_integer(rule.rule_type())?;

        if !ctx.guarantor_has_bankruptcy {
            return Ok(EvaluationResult::for_rule(
                rule,
                true,
                Value::from(required),
                Value::Null,
                "No bankruptcy history".to_string(),
            ));
        }

        let Some(years_since) = ctx.years_since_bankruptcy() else {
            return Ok(EvaluationResult::for_rule(
                rule,
                false,
                Value::from(required),
                Value::Null,
                "Bankruptcy on record but discharge date not provided".to_string(),
            ));
        };

        let passed = years_since >= required;
        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(required),
            Value::from(years_since),
            format!(
                "Bankruptcy discharged {years_since} years ago {} {required} year minimum",
                outcome(passed, "meets", "does not meet")
            ),
        ))
    }
}

pub struct NoJudgments;

impl RuleEvaluator for NoJudgments {
    fn rule_type(&self) -> &str {
        RuleType::NoJudgments.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(clean_record(
            rule,
            ctx.guarantor_has_judgments,
            "No judgments on record",
            "Judgments on record - lender does not accept judgments",
        ))
    }
}

pub struct NoForeclosures;

impl RuleEvaluator for NoForeclosures {
    fn rule_type(&self) -> &str {
        RuleType::NoForeclosures.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(clean_record(
            rule,
            ctx.guarantor_has_foreclosure,
            "No foreclosure history",
            "Foreclosure on record - lender does not accept foreclosures",
        ))
    }
}

pub struct NoRepossessions;

impl RuleEvaluator for NoRepossessions {
    fn rule_type(&self) -> &str {
        RuleType::NoRepossessions.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(clean_record(
            rule,
            ctx.guarantor_has_repossession,
            "No repossession history",
            "Repossession on record - lender does not accept repossessions",
        ))
    }
}

pub struct NoTaxLiens;

impl RuleEvaluator for NoTaxLiens {
    fn rule_type(&self) -> &str {
        RuleType::NoTaxLiens.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(clean_record(
            rule,
            ctx.guarantor_has_tax_liens,
            "No tax liens",
            "Tax liens on record - lender does not accept tax liens",
        ))
    }
}
