use serde_json::Value;

use super::{outcome, EvaluationResult, RuleEvaluator, RuleType};
use crate::matching::context::EvaluationContext;
use crate::matching::policy::{PolicyRule, RuleValueError};

/// Case-insensitive containment in either direction, so "trucking" matches
/// an exclusion of "long haul trucking" and vice versa.
fn overlaps(actual: &str, excluded: &[String]) -> bool {
    let actual = actual.to_lowercase();
    excluded.iter().any(|term| {
        let term = term.to_lowercase();
        actual.contains(&term) || term.contains(&actual)
    })
}

pub struct ExcludedStates;

impl RuleEvaluator for ExcludedStates {
    fn rule_type(&self) -> &str {
        RuleType::ExcludedStates.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let excluded = rule.value().as_terms(rule.rule_type())?;
        let actual = ctx.state.to_uppercase();
        let passed = !excluded.iter().any(|state| state.to_uppercase() == actual);

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(excluded.to_vec()),
            Value::from(actual.as_str()),
            format!(
                "State {actual} {} excluded states list",
                outcome(passed, "is not in", "is in")
            ),
        ))
    }
}

pub struct ExcludedIndustries;

impl RuleEvaluator for ExcludedIndustries {
    fn rule_type(&self) -> &str {
        RuleType::ExcludedIndustries.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let excluded = rule.value().as_terms(rule.rule_type())?;
        let passed = !overlaps(&ctx.industry, excluded);

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(excluded.to_vec()),
            Value::from(ctx.industry.as_str()),
            format!(
                "Industry '{}' {}",
                ctx.industry,
                outcome(passed, "is allowed", "is in excluded industries list")
            ),
        ))
    }
}

pub struct ExcludedEquipment;

impl RuleEvaluator for ExcludedEquipment {
    fn rule_type(&self) -> &str {
        RuleType::ExcludedEquipment.as_str()
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext,
        rule: &PolicyRule,
    ) -> Result<EvaluationResult, RuleValueError> {
        let excluded = rule.value().as_terms(rule.rule_type())?;
        let passed = !overlaps(&ctx.equipment_type, excluded);

        Ok(EvaluationResult::for_rule(
            rule,
            passed,
            Value::from(excluded.to_vec()),
            Value::from(ctx.equipment_type.as_str()),
            format!(
                "Equipment '{}' {}",
                ctx.equipment_type,
                outcome(passed, "is allowed", "is in excluded types list")
            ),
        ))
    }
}
