use serde_json::Value;

use super::{format_currency, group_thousands, outcome, EvaluationResult, RuleEvaluator, RuleType};
use crate::matching::context::EvaluationContext;
use crate::matching::policy::{decimal_json, PolicyRule, RuleValueError};

pub struct AmountMin;

impl RuleEvaluator for AmountMin {
    fn rule_type(&self) -> &str {
        RuleType::AmountMin.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_decimal(rule.rule_type())?;
        let actual = ctx.amount_requested;
        let passed = actual >= required;

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            decimal_json(required),
            decimal_json(actual),
            format!(
                "Loan amount {} {} minimum of {}",
                format_currency(actual),
                outcome(passed, "meets", "is below"),
                format_currency(required)
            ),
        ))
    }
}

pub struct AmountMax;

impl RuleEvaluator for AmountMax {
    fn rule_type(&self) -> &str {
        RuleType::AmountMax.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_decimal(rule.rule_type())?;
        let actual = ctx.amount_requested;
        let passed = actual <= required;

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            decimal_json(required),
            decimal_json(actual),
            format!(
                "Loan amount {} {} maximum of {}",
                format_currency(actual),
                outcome(passed, "is within", "exceeds"),
                format_currency(required)
            ),
        ))
    }
}

pub struct TermMax;

impl RuleEvaluator for TermMax {
    fn rule_type(&self) -> &str {
        RuleType::TermMax.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_integer(rule.rule_type())?;
        let actual = ctx.term_months;
        let passed = i64::from(actual) <= required;

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(required),
            Value::from(actual),
            format!(
                "Term {actual} months {} maximum of {required} months",
                outcome(passed, "is within", "exceeds")
            ),
        ))
    }
}

pub struct EquipmentAgeMax;

impl RuleEvaluator for EquipmentAgeMax {
    fn rule_type(&self) -> &str {
        RuleType::EquipmentAgeMax.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_integer(rule.rule_type())?;
        let actual = ctx.equipment_age_years;
        let passed = i64::from(actual) <= required;

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(required),
            Value::from(actual),
            format!(
                "Equipment age {actual} years {} maximum of {required} years",
                outcome(passed, "is within", "exceeds")
            ),
        ))
    }
}

/// Mileage cap; equipment without an odometer reading passes.
pub struct EquipmentMileageMax;

impl RuleEvaluator for EquipmentMileageMax {
    fn rule_type(&self) -> &str {
        RuleType::EquipmentMileageMax.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_integer(rule.rule_type())?;

        let Some(actual) = ctx.equipment_mileage else {
            return Ok(EvaluationResult::for_rule(
                rule,
                true,
                Value::from(required),
                Value::Null,
                "Mileage not applicable for this equipment type".to_string(),
            ));
        };

        let passed = i64::from(actual) <= required;
        let required_text = u64::try_from(required)
            .map(group_thousands)
            .unwrap_or_else(|_| required.to_string());

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(required),
            Value::from(actual),
            format!(
                "Mileage {} {} maximum of {required_text}",
                group_thousands(u64::from(actual)),
                outcome(passed, "is within", "exceeds")
            ),
        ))
    }
}
