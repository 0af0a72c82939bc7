use super::rules::EvaluationResult;

const BASE_POINTS: f64 = 70.0;
const REQUIRED_BONUS: f64 = 15.0;
const HIGH_PASS_BONUS: f64 = 15.0;
const HIGH_PASS_THRESHOLD: f64 = 0.9;

/// Fold rule outcomes into a 0-100 fit score.
///
/// Up to 70 points scale with the passed share of total weight; 15 more are
/// awarded when every required rule passed and another 15 when at least 90%
/// of the weight passed. An empty outcome set scores 0.
pub fn fit_score(results: &[EvaluationResult]) -> u8 {
    if results.is_empty() {
        return 0;
    }

    let total_weight: u64 = results.iter().map(|result| u64::from(result.weight)).sum();
    let passed_weight: u64 = results
        .iter()
        .filter(|result| result.passed)
        .map(|result| u64::from(result.weight))
        .sum();
    let required_passed = results
        .iter()
        .filter(|result| result.is_required)
        .all(|result| result.passed);

    if total_weight == 0 {
        return if required_passed { 100 } else { 50 };
    }

    let pass_ratio = passed_weight as f64 / total_weight as f64;
    let mut score = pass_ratio * BASE_POINTS;
    if required_passed {
        score += REQUIRED_BONUS;
    }
    if pass_ratio >= HIGH_PASS_THRESHOLD {
        score += HIGH_PASS_BONUS;
    }

    score.round_ties_even().clamp(0.0, 100.0) as u8
}
