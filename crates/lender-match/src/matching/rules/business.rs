use serde_json::Value;

use super::{outcome, EvaluationResult, RuleEvaluator, RuleType};
use crate::matching::context::EvaluationContext;
use crate::matching::policy::{PolicyRule, RuleValueError};

pub struct TimeInBusinessMin;

impl RuleEvaluator for TimeInBusinessMin {
    fn rule_type(&self) -> &str {
        RuleType::TibMin.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_integer(rule.rule_type())?;
        let actual = ctx.years_in_business;
        let passed = i64::from(actual) >= required;

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(required),
            Value::from(actual),
            format!(
                "Time in business {actual} years {} minimum of {required} years",
                outcome(passed, "meets", "is below")
            ),
        ))
    }
}

/// Fleet size minimum; an unreported truck count counts as zero.
pub struct NumTrucksMin;

impl RuleEvaluator for NumTrucksMin {
    fn rule_type(&self) -> &str {
        RuleType::NumTrucksMin.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let required = rule.value().as_integer(rule.rule_type())?;
        let actual = ctx.num_trucks.unwrap_or(0);
        let passed = i64::from(actual) >= required;

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(required),
            Value::from(actual),
            format!(
                "Operating {actual} trucks {} minimum of {required} trucks",
                outcome(passed, "meets", "is below")
            ),
        ))
    }
}
