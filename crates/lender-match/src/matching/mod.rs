//! Lender policy matching: context building, rule evaluation, scoring, and the
//! underwriting workflow around them.

pub mod context;
pub mod domain;
pub mod engine;
pub mod memory;
pub mod outcome;
pub mod policy;
pub mod repository;
pub mod router;
pub mod rules;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use context::{primary_guarantor, EvaluationContext};
pub use domain::{
    ApplicationId, ApplicationStatus, Borrower, CreditTier, Guarantor, Lender, LenderId,
    LenderProgram, LoanApplication, ProgramId, RuleId,
};
pub use engine::{LenderEvaluation, MatchingEngine, ProgramEvaluation, NO_ACTIVE_PROGRAMS};
pub use memory::{InMemoryApplications, InMemoryLenderCatalog, InMemoryMatchResults};
pub use outcome::{
    EvaluationDetails, EvaluationSummary, LenderOutcome, MatchResult, UnderwritingResults,
    UnderwritingSummary,
};
pub use policy::{PolicyRule, PolicyRuleRecord, RuleOperator, RuleValue, RuleValueError};
pub use repository::{
    ApplicationRepository, ApplicationStatusView, LenderCatalog, MatchResultStore,
    RepositoryError,
};
pub use router::underwriting_router;
pub use rules::{EvaluationResult, RuleDetail, RuleEvaluator, RuleRegistry, RuleType};
pub use scoring::fit_score;
pub use service::{LenderRegistration, UnderwritingError, UnderwritingService};
