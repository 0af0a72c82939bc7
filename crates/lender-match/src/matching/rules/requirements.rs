use serde_json::Value;

use super::{flag_result, outcome, EvaluationResult, RuleEvaluator, RuleType};
use crate::matching::context::EvaluationContext;
use crate::matching::policy::{decimal_json, PolicyRule, RuleValueError};

/// Satisfied when either the primary guarantor or the business owns a home.
pub struct RequiresHomeowner;

impl RuleEvaluator for RequiresHomeowner {
    fn rule_type(&self) -> &str {
        RuleType::RequiresHomeowner.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let is_homeowner = ctx.guarantor_is_homeowner || ctx.is_homeowner;
        Ok(flag_result(
            rule,
            is_homeowner,
            true,
            is_homeowner,
            "Homeowner requirement met",
            "Homeownership is required by this lender",
        ))
    }
}

pub struct RequiresCdl;

impl RuleEvaluator for RequiresCdl {
    fn rule_type(&self) -> &str {
        RuleType::RequiresCdl.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(flag_result(
            rule,
            ctx.guarantor_has_cdl,
            true,
            ctx.guarantor_has_cdl,
            "CDL requirement met",
            "CDL is required for trucking equipment",
        ))
    }
}

/// Minimum years holding a CDL; unreported experience fails.
pub struct CdlYearsMin;

impl RuleEvaluator for CdlYearsMin {
    fn rule_type(&self) -> &str {
        RuleType::CdlYearsMin.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_integer(rule.rule_type())?;

        let Some(actual) = ctx.guarantor_cdl_years else {
            return Ok(EvaluationResult::for_rule(
                rule,
                false,
                Value::from(required),
                Value::Null,
                format!("CDL experience of {required} years required but not provided"),
            ));
        };

        let passed = i64::from(actual) >= required;
        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(required),
            Value::from(actual),
            format!(
                "CDL experience {actual} years {} minimum of {required} years",
                outcome(passed, "meets", "is below")
            ),
        ))
    }
}

/// Largest comparable prior financing as a percentage of the request.
pub struct ComparableCreditPct;

impl RuleEvaluator for ComparableCreditPct {
    fn rule_type(&self) -> &str {
        RuleType::ComparableCreditPct.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_decimal(rule.rule_type())?;

        let Some(actual) = ctx.comparable_credit_pct else {
            return Ok(EvaluationResult::for_rule(
                rule,
                false,
                decimal_json(required),
                Value::Null,
                format!("Comparable credit of {required}% required but not provided"),
            ));
        };

        let passed = actual >= required;
        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            decimal_json(required),
            decimal_json(actual),
            format!(
                "Comparable credit {actual}% {} {required}% requirement",
                outcome(passed, "meets", "is below")
            ),
        ))
    }
}

pub struct RevolvingAvailableMin;

impl RuleEvaluator for RevolvingAvailableMin {
    fn rule_type(&self) -> &str {
        RuleType::RevolvingAvailableMin.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_decimal(rule.rule_type())?;

        let Some(actual) = ctx.guarantor_revolving_available_pct else {
            return Ok(EvaluationResult::for_rule(
                rule,
                false,
                decimal_json(required),
                Value::Null,
                format!("Revolving credit availability of {required}% required but not provided"),
            ));
        };

        let passed = actual >= required;
        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            decimal_json(required),
            decimal_json(actual),
            format!(
                "Revolving credit {actual}% available {} {required}% requirement",
                outcome(passed, "meets", "is below")
            ),
        ))
    }
}

pub struct RequiresUsCitizen;

impl RuleEvaluator for RequiresUsCitizen {
    fn rule_type(&self) -> &str {
        RuleType::RequiresUsCitizen.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(flag_result(
            rule,
            ctx.is_us_citizen,
            true,
            ctx.is_us_citizen,
            "US citizenship requirement met",
            "US citizenship is required",
        ))
    }
}

pub struct NoPrivateParty;

impl RuleEvaluator for NoPrivateParty {
    fn rule_type(&self) -> &str {
        RuleType::NoPrivateParty.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(flag_result(
            rule,
            !ctx.is_private_party_sale,
            false,
            ctx.is_private_party_sale,
            "Dealer transaction",
            "Private party sales not accepted by this lender",
        ))
    }
}

pub struct NoRefinance;

impl RuleEvaluator for NoRefinance {
    fn rule_type(&self) -> &str {
        RuleType::NoRefinance.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(flag_result(
            rule,
            !ctx.is_refinance,
            false,
            ctx.is_refinance,
            "New financing transaction",
            "Refinance transactions not accepted by this lender",
        ))
    }
}

pub struct NoSaleLeaseback;

impl RuleEvaluator for NoSaleLeaseback {
    fn rule_type(&self) -> &str {
        RuleType::NoSaleLeaseback.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        Ok(flag_result(
            rule,
            !ctx.is_sale_leaseback,
            false,
            ctx.is_sale_leaseback,
            "Standard purchase transaction",
            "Sale-leaseback transactions not accepted by this lender",
        ))
    }
}
