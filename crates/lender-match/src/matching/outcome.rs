use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationStatus, LenderId, ProgramId};
use super::engine::{LenderEvaluation, ProgramEvaluation};
use super::rules::RuleDetail;

/// Stored verdict for one lender after an underwriting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub application_id: ApplicationId,
    pub lender_id: LenderId,
    pub lender_name: String,
    pub program_id: Option<ProgramId>,
    pub program_name: Option<String>,
    pub is_eligible: bool,
    pub fit_score: u8,
    pub evaluation_details: EvaluationDetails,
}

impl MatchResult {
    pub fn from_evaluation(application_id: &ApplicationId, evaluation: &LenderEvaluation<'_>) -> Self {
        let best = evaluation.best_program();
        let evaluation_details = match best {
            Some(program) => EvaluationDetails::from_program(program, &evaluation.warnings),
            None => EvaluationDetails::without_program(&evaluation.warnings),
        };

        Self {
            application_id: application_id.clone(),
            lender_id: evaluation.lender.id.clone(),
            lender_name: evaluation.lender.name.clone(),
            program_id: best.map(|program| program.program.id.clone()),
            program_name: best.map(|program| program.program.name.clone()),
            is_eligible: evaluation.is_eligible,
            fit_score: evaluation.fit_score,
            evaluation_details,
        }
    }

    pub fn outcome(&self) -> LenderOutcome {
        LenderOutcome {
            lender_id: self.lender_id.clone(),
            lender_name: self.lender_name.clone(),
            program_id: self.program_id.clone(),
            program_name: self.program_name.clone(),
            is_eligible: self.is_eligible,
            fit_score: self.fit_score,
        }
    }
}

/// Rule-level breakdown of the representative program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDetails {
    pub rules_evaluated: usize,
    pub rules_passed: usize,
    pub rules_failed: usize,
    /// Share of evaluated rules that passed; zero when none ran.
    pub pass_rate: f64,
    pub details: Vec<RuleDetail>,
    pub summary: EvaluationSummary,
}

impl EvaluationDetails {
    fn from_program(program: &ProgramEvaluation<'_>, warnings: &[String]) -> Self {
        let evaluated = program.results.len();
        let pass_rate = if evaluated == 0 {
            0.0
        } else {
            program.passed_count as f64 / evaluated as f64
        };
        let (passed, failed): (Vec<RuleDetail>, Vec<RuleDetail>) = program
            .results
            .iter()
            .cloned()
            .partition(|result| result.passed);

        Self {
            rules_evaluated: evaluated,
            rules_passed: program.passed_count,
            rules_failed: program.failed_count,
            pass_rate,
            details: program.results.clone(),
            summary: EvaluationSummary {
                passed,
                failed,
                warnings: warnings.to_vec(),
            },
        }
    }

    fn without_program(warnings: &[String]) -> Self {
        Self {
            rules_evaluated: 0,
            rules_passed: 0,
            rules_failed: 0,
            pass_rate: 0.0,
            details: Vec::new(),
            summary: EvaluationSummary {
                passed: Vec::new(),
                failed: Vec::new(),
                warnings: warnings.to_vec(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub passed: Vec<RuleDetail>,
    pub failed: Vec<RuleDetail>,
    pub warnings: Vec<String>,
}

/// Condensed per-lender line of an underwriting summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LenderOutcome {
    pub lender_id: LenderId,
    pub lender_name: String,
    pub program_id: Option<ProgramId>,
    pub program_name: Option<String>,
    pub is_eligible: bool,
    pub fit_score: u8,
}

/// Response of an underwriting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingSummary {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub total_lenders: usize,
    pub eligible_count: usize,
    pub ineligible_count: usize,
    pub results: Vec<LenderOutcome>,
}

impl UnderwritingSummary {
    pub fn from_results(
        application_id: &ApplicationId,
        status: ApplicationStatus,
        results: &[MatchResult],
    ) -> Self {
        let eligible_count = results.iter().filter(|result| result.is_eligible).count();
        Self {
            application_id: application_id.clone(),
            status,
            total_lenders: results.len(),
            eligible_count,
            ineligible_count: results.len() - eligible_count,
            results: results.iter().map(MatchResult::outcome).collect(),
        }
    }
}

/// Stored results for an application, ranked, with the top eligible match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingResults {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub total_lenders: usize,
    pub eligible_count: usize,
    pub ineligible_count: usize,
    pub best_match: Option<MatchResult>,
    pub results: Vec<MatchResult>,
}

impl UnderwritingResults {
    pub fn new(
        application_id: &ApplicationId,
        status: ApplicationStatus,
        results: Vec<MatchResult>,
    ) -> Self {
        let eligible_count = results.iter().filter(|result| result.is_eligible).count();
        let best_match = results.iter().find(|result| result.is_eligible).cloned();
        Self {
            application_id: application_id.clone(),
            status,
            total_lenders: results.len(),
            eligible_count,
            ineligible_count: results.len() - eligible_count,
            best_match,
            results,
        }
    }
}
