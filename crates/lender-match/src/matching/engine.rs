use std::cmp::Reverse;
use std::sync::Arc;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::context::EvaluationContext;
use super::domain::{ApplicationId, Lender, LenderProgram, LoanApplication};
use super::outcome::MatchResult;
use super::policy::{PolicyRule, RuleValueError};
use super::rules::{EvaluationResult, RuleRegistry};
use super::scoring::fit_score;

pub const NO_ACTIVE_PROGRAMS: &str = "No active programs found for this lender";

/// Outcome of running one program's active rules.
#[derive(Debug, Clone)]
pub struct ProgramEvaluation<'a> {
    pub program: &'a LenderProgram,
    pub is_eligible: bool,
    pub fit_score: u8,
    pub results: Vec<EvaluationResult>,
    pub passed_count: usize,
    pub failed_count: usize,
}

/// Outcome of running every active program of a lender.
#[derive(Debug, Clone)]
pub struct LenderEvaluation<'a> {
    pub lender: &'a Lender,
    pub programs: Vec<ProgramEvaluation<'a>>,
    best: Option<usize>,
    pub is_eligible: bool,
    pub fit_score: u8,
    pub warnings: Vec<String>,
}

impl<'a> LenderEvaluation<'a> {
    /// Representative program: best eligible, else best ineligible.
    pub fn best_program(&self) -> Option<&ProgramEvaluation<'a>> {
        self.best.and_then(|index| self.programs.get(index))
    }
}

/// Index of the highest score; earlier entries win ties.
fn first_max(candidates: impl Iterator<Item = (usize, u8)>) -> Option<usize> {
    candidates
        .fold(None, |best: Option<(usize, u8)>, (index, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((index, score)),
        })
        .map(|(index, _)| index)
}

fn select_best(programs: &[ProgramEvaluation<'_>]) -> Option<usize> {
    let scored = || {
        programs
            .iter()
            .enumerate()
            .map(|(index, program)| (index, program.fit_score, program.is_eligible))
    };

    first_max(
        scored()
            .filter(|(_, _, eligible)| *eligible)
            .map(|(index, score, _)| (index, score)),
    )
    .or_else(|| first_max(scored().map(|(index, score, _)| (index, score))))
}

/// Runs lender policies against applications using an immutable registry.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    registry: Arc<RuleRegistry>,
    parallel_lenders: bool,
}

impl MatchingEngine {
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            parallel_lenders: false,
        }
    }

    pub fn standard() -> Self {
        Self::new(RuleRegistry::standard())
    }

    /// Evaluate lenders on the rayon pool; ranking is unaffected.
    pub fn with_parallel_lenders(mut self, parallel: bool) -> Self {
        self.parallel_lenders = parallel;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn evaluate_program<'a>(
        &self,
        ctx: &EvaluationContext,
        program: &'a LenderProgram,
    ) -> Result<ProgramEvaluation<'a>, RuleValueError> {
        let mut rules: Vec<&PolicyRule> = program.rules.iter().filter(|rule| rule.is_active).collect();
        rules.sort_by_key(|rule| rule.priority);

        let mut results = Vec::with_capacity(rules.len());
        for rule in rules {
            let Some(evaluator) = self.registry.get(rule.rule_type()) else {
                warn!(
                    rule_type = rule.rule_type(),
                    rule_id = %rule.id,
                    program = %program.name,
                    "no evaluator registered for rule type; skipping"
                );
                continue;
            };
            results.push(evaluator.evaluate(ctx, rule)?);
        }

        let is_eligible = !results
            .iter()
            .any(|result| result.is_required && !result.passed);
        let passed_count = results.iter().filter(|result| result.passed).count();

        Ok(ProgramEvaluation {
            program,
            is_eligible,
            fit_score: fit_score(&results),
            failed_count: results.len() - passed_count,
            passed_count,
            results,
        })
    }

    pub fn evaluate_lender<'a>(
        &self,
        ctx: &EvaluationContext,
        lender: &'a Lender,
    ) -> Result<LenderEvaluation<'a>, RuleValueError> {
        let mut active: Vec<&LenderProgram> = lender
            .programs
            .iter()
            .filter(|program| program.is_active)
            .collect();
        active.sort_by_key(|program| program.priority);

        let programs = active
            .into_iter()
            .map(|program| self.evaluate_program(ctx, program))
            .collect::<Result<Vec<_>, _>>()?;

        let best = select_best(&programs);
        let (is_eligible, score) = best
            .and_then(|index| programs.get(index))
            .map_or((false, 0), |program| (program.is_eligible, program.fit_score));
        let warnings = if programs.is_empty() {
            vec![NO_ACTIVE_PROGRAMS.to_string()]
        } else {
            Vec::new()
        };

        debug!(
            lender = %lender.name,
            programs = programs.len(),
            eligible = is_eligible,
            fit_score = score,
            "evaluated lender"
        );

        Ok(LenderEvaluation {
            lender,
            programs,
            best,
            is_eligible,
            fit_score: score,
            warnings,
        })
    }

    /// Match an application against the active lenders of `lenders`.
    pub fn match_application(
        &self,
        application: &LoanApplication,
        lenders: &[Lender],
        as_of: NaiveDate,
    ) -> Result<Vec<MatchResult>, RuleValueError> {
        let ctx = EvaluationContext::build(application, as_of);
        self.match_context(&application.id, &ctx, lenders)
    }

    /// Results are ranked eligible first, then by fit score; ties keep catalog order.
    pub fn match_context(
        &self,
        application_id: &ApplicationId,
        ctx: &EvaluationContext,
        lenders: &[Lender],
    ) -> Result<Vec<MatchResult>, RuleValueError> {
        let active: Vec<&Lender> = lenders.iter().filter(|lender| lender.is_active).collect();

        let to_result = |lender: &&Lender| {
            self.evaluate_lender(ctx, lender)
                .map(|evaluation| MatchResult::from_evaluation(application_id, &evaluation))
        };
        let mut results = if self.parallel_lenders {
            active.par_iter().map(to_result).collect::<Result<Vec<_>, _>>()?
        } else {
            active.iter().map(to_result).collect::<Result<Vec<_>, _>>()?
        };

        results.sort_by_key(|result| (Reverse(result.is_eligible), Reverse(result.fit_score)));
        Ok(results)
    }
}
