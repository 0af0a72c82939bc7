use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::RuleId;
use super::rules::{PayloadShape, RuleType};

/// Comparison operator recorded alongside a rule.
///
/// Evaluators hard-code their comparison direction; the operator is carried
/// for catalog authoring and display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Gte,
    Lte,
    Gt,
    Lt,
    Eq,
    Neq,
    In,
    NotIn,
    Between,
    Exists,
    NotExists,
}

/// Rule payload, typed according to the rule's `rule_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleValue {
    Integer(i64),
    Decimal(Decimal),
    Terms(Vec<String>),
    Flag(bool),
    /// Payload of a rule type without a standard evaluator, kept verbatim.
    Raw(Value),
}

impl RuleValue {
    /// Resolve a catalog payload for `rule_type`, unwrapping `{"value": X}`.
    pub fn parse(rule_type: &str, payload: &Value) -> Result<Self, RuleValueError> {
        let Some(kind) = RuleType::parse(rule_type) else {
            return Ok(RuleValue::Raw(payload.clone()));
        };

        let inner = unwrap_payload(payload);
        let mismatch = |expected: &'static str| RuleValueError::Shape {
            rule_type: rule_type.to_string(),
            expected,
            found: inner.to_string(),
        };

        match kind.payload_shape() {
            PayloadShape::Integer => integer_payload(inner)
                .map(RuleValue::Integer)
                .ok_or_else(|| mismatch("an integer")),
            PayloadShape::Decimal => decimal_payload(inner)
                .map(RuleValue::Decimal)
                .ok_or_else(|| mismatch("a decimal number")),
            PayloadShape::Terms => terms_payload(inner)
                .map(RuleValue::Terms)
                .ok_or_else(|| mismatch("a string or a list of strings")),
            PayloadShape::Flag => match inner {
                Value::Bool(flag) => Ok(RuleValue::Flag(*flag)),
                Value::Null => Ok(RuleValue::Flag(true)),
                _ => Err(mismatch("a boolean")),
            },
        }
    }

    pub fn as_integer(&self, rule_type: &str) -> Result<i64, RuleValueError> {
        match self {
            RuleValue::Integer(value) => Ok(*value),
            other => Err(other.mismatch(rule_type, "an integer")),
        }
    }

    pub fn as_decimal(&self, rule_type: &str) -> Result<Decimal, RuleValueError> {
        match self {
            RuleValue::Decimal(value) => Ok(*value),
            RuleValue::Integer(value) => Ok(Decimal::from(*value)),
            other => Err(other.mismatch(rule_type, "a decimal number")),
        }
    }

    pub fn as_terms(&self, rule_type: &str) -> Result<&[String], RuleValueError> {
        match self {
            RuleValue::Terms(terms) => Ok(terms),
            other => Err(other.mismatch(rule_type, "a list of strings")),
        }
    }

    /// JSON echo of the payload, as surfaced in `required_value`.
    pub fn to_json(&self) -> Value {
        match self {
            RuleValue::Integer(value) => Value::from(*value),
            RuleValue::Decimal(value) => decimal_json(*value),
            RuleValue::Terms(terms) => Value::from(terms.clone()),
            RuleValue::Flag(flag) => Value::Bool(*flag),
            RuleValue::Raw(raw) => raw.clone(),
        }
    }

    fn mismatch(&self, rule_type: &str, expected: &'static str) -> RuleValueError {
        RuleValueError::Shape {
            rule_type: rule_type.to_string(),
            expected,
            found: self.to_json().to_string(),
        }
    }
}

/// Render a decimal as a JSON number, falling back to its string form.
pub(crate) fn decimal_json(value: Decimal) -> Value {
    value
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

fn unwrap_payload(payload: &Value) -> &Value {
    match payload {
        Value::Object(map) => map.get("value").unwrap_or(payload),
        _ => payload,
    }
}

fn integer_payload(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    if let Some(integer) = number.as_i64() {
        return Some(integer);
    }
    let float = number.as_f64()?;
    (float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64)
        .then_some(float as i64)
}

fn decimal_payload(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

fn terms_payload(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(term) => Some(vec![term.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

/// Raised when a rule payload does not have the JSON shape its type needs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleValueError {
    #[error("rule `{rule_type}` expects {expected} but found {found}")]
    Shape {
        rule_type: String,
        expected: &'static str,
        found: String,
    },
}

fn default_true() -> bool {
    true
}

fn default_priority() -> i32 {
    100
}

fn default_weight() -> u32 {
    10
}

/// Wire form of a policy rule as stored in the lender catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRuleRecord {
    #[serde(default)]
    pub id: RuleId,
    pub rule_type: String,
    #[serde(default)]
    pub operator: Option<RuleOperator>,
    pub value: Value,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rejection_message: String,
    #[serde(default = "default_true")]
    pub is_required: bool,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A single lender credit-policy rule with its payload already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyRuleRecord", into = "PolicyRuleRecord")]
pub struct PolicyRule {
    pub id: RuleId,
    rule_type: String,
    pub operator: RuleOperator,
    value: RuleValue,
    pub description: Option<String>,
    pub rejection_message: String,
    /// Hard requirement when true, soft preference otherwise.
    pub is_required: bool,
    pub priority: i32,
    pub weight: u32,
    pub is_active: bool,
}

impl PolicyRule {
    /// Build an active, required rule with default priority and weight.
    pub fn new(rule_type: impl Into<String>, payload: Value) -> Result<Self, RuleValueError> {
        Self::try_from(PolicyRuleRecord {
            id: RuleId::default(),
            rule_type: rule_type.into(),
            operator: None,
            value: payload,
            description: None,
            rejection_message: String::new(),
            is_required: default_true(),
            priority: default_priority(),
            weight: default_weight(),
            is_active: default_true(),
        })
    }

    /// Rule type the payload was validated against.
    pub fn rule_type(&self) -> &str {
        &self.rule_type
    }

    pub fn value(&self) -> &RuleValue {
        &self.value
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = RuleId(id.into());
        self
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

impl TryFrom<PolicyRuleRecord> for PolicyRule {
    type Error = RuleValueError;

    fn try_from(record: PolicyRuleRecord) -> Result<Self, Self::Error> {
        let value = RuleValue::parse(&record.rule_type, &record.value)?;
        let operator = record.operator.unwrap_or_else(|| {
            RuleType::parse(&record.rule_type)
                .map(RuleType::declared_operator)
                .unwrap_or(RuleOperator::Eq)
        });

        Ok(Self {
            id: record.id,
            rule_type: record.rule_type,
            operator,
            value,
            description: record.description,
            rejection_message: record.rejection_message,
            is_required: record.is_required,
            priority: record.priority,
            weight: record.weight,
            is_active: record.is_active,
        })
    }
}

impl From<PolicyRule> for PolicyRuleRecord {
    fn from(rule: PolicyRule) -> Self {
        let value = match &rule.value {
            RuleValue::Raw(raw) => raw.clone(),
            typed => serde_json::json!({ "value": typed.to_json() }),
        };

        Self {
            id: rule.id,
            rule_type: rule.rule_type,
            operator: Some(rule.operator),
            value,
            description: rule.description,
            rejection_message: rule.rejection_message,
            is_required: rule.is_required,
            priority: rule.priority,
            weight: rule.weight,
            is_active: rule.is_active,
        }
    }
}
