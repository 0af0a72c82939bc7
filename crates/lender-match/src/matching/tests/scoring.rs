use serde_json::Value;

use crate::matching::domain::RuleId;
use crate::matching::rules::EvaluationResult;
use crate::matching::scoring::fit_score;

fn outcome(passed: bool, is_required: bool, weight: u32) -> EvaluationResult {
    EvaluationResult {
        passed,
        rule_type: "fico_min".to_string(),
        rule_id: RuleId::default(),
        required_value: Value::Null,
        actual_value: Value::Null,
        is_required,
        weight,
        reason: String::new(),
    }
}

#[test]
fn empty_results_score_zero() {
    assert_eq!(fit_score(&[]), 0);
}

#[test]
fn all_passing_scores_one_hundred() {
    let results = [outcome(true, true, 10), outcome(true, false, 25)];
    assert_eq!(fit_score(&results), 100);
}

#[test]
fn single_required_failure_scores_forty_seven() {
    let results = [
        outcome(true, true, 10),
        outcome(true, true, 10),
        outcome(false, true, 10),
    ];
    assert_eq!(fit_score(&results), 47);
}

#[test]
fn soft_failure_keeps_required_bonus() {
    let results = [outcome(true, true, 10), outcome(false, false, 10)];
    assert_eq!(fit_score(&results), 50);
}

#[test]
fn high_pass_bonus_applies_at_ninety_percent() {
    let results = [outcome(true, true, 9), outcome(false, false, 1)];
    assert_eq!(fit_score(&results), 93);
}

#[test]
fn zero_total_weight_depends_on_required_outcomes() {
    assert_eq!(fit_score(&[outcome(true, true, 0)]), 100);
    assert_eq!(fit_score(&[outcome(false, false, 0)]), 100);
    assert_eq!(fit_score(&[outcome(false, true, 0)]), 50);
}

#[test]
fn halfway_scores_round_to_even() {
    // 0.75 * 70 = 52.5 with no bonuses
    let results = [outcome(true, false, 3), outcome(false, true, 1)];
    assert_eq!(fit_score(&results), 52);

    // 0.25 * 70 + 15 = 32.5
    let results = [outcome(true, true, 1), outcome(false, false, 3)];
    assert_eq!(fit_score(&results), 32);
}

#[test]
fn systemic_failure_scores_zero() {
    let results = [outcome(false, true, 10), outcome(false, true, 5)];
    assert_eq!(fit_score(&results), 0);
}

#[test]
fn score_stays_within_bounds() {
    for passed_weight in 0..=20u32 {
        for failed_weight in 0..=20u32 {
            let results = [
                outcome(true, true, passed_weight),
                outcome(false, failed_weight % 2 == 0, failed_weight),
            ];
            assert!(fit_score(&results) <= 100);
        }
    }
}
