use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{ApplicationId, ApplicationStatus, Lender, LenderId, LoanApplication};
use super::engine::MatchingEngine;
use super::outcome::{UnderwritingResults, UnderwritingSummary};
use super::policy::RuleValueError;
use super::repository::{
    ApplicationRepository, LenderCatalog, MatchResultStore, RepositoryError,
};

/// Service composing the application store, lender catalog, result store, and engine.
pub struct UnderwritingService<A, L, M> {
    applications: Arc<A>,
    lenders: Arc<L>,
    results: Arc<M>,
    engine: Arc<MatchingEngine>,
    in_flight: Mutex<HashSet<ApplicationId>>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Releases an application's in-flight claim when the run ends.
struct RunClaim<'a> {
    in_flight: &'a Mutex<HashSet<ApplicationId>>,
    application_id: ApplicationId,
}

impl Drop for RunClaim<'_> {
    fn drop(&mut self) {
        if let Ok(mut running) = self.in_flight.lock() {
            running.remove(&self.application_id);
        }
    }
}

/// A stored lender along with rule types the engine cannot evaluate.
#[derive(Debug, Clone, Serialize)]
pub struct LenderRegistration {
    pub lender: Lender,
    pub unknown_rule_types: Vec<String>,
}

impl<A, L, M> UnderwritingService<A, L, M>
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    pub fn new(
        applications: Arc<A>,
        lenders: Arc<L>,
        results: Arc<M>,
        engine: MatchingEngine,
    ) -> Self {
        Self {
            applications,
            lenders,
            results,
            engine: Arc::new(engine),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Store a new application as a draft, assigning an id when none is given.
    pub fn submit(
        &self,
        mut application: LoanApplication,
    ) -> Result<LoanApplication, UnderwritingError> {
        if application.id.0.trim().is_empty() {
            application.id = next_application_id();
        }
        application.status = ApplicationStatus::Draft;
        application.underwriting_completed_at = None;

        let stored = self.applications.insert(application)?;
        info!(application_id = %stored.id, business = %stored.borrower.business_name, "application submitted");
        Ok(stored)
    }

    pub fn get(&self, application_id: &ApplicationId) -> Result<LoanApplication, UnderwritingError> {
        self.applications
            .fetch(application_id)?
            .ok_or_else(|| UnderwritingError::NotFound(application_id.clone()))
    }

    pub fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<LoanApplication>, UnderwritingError> {
        Ok(self.applications.list(status)?)
    }

    /// Run underwriting dated today in local time.
    pub fn underwrite(
        &self,
        application_id: &ApplicationId,
    ) -> Result<UnderwritingSummary, UnderwritingError> {
        self.underwrite_as_of(application_id, Local::now().date_naive())
    }

    /// Match the application against every active lender and replace its results.
    pub fn underwrite_as_of(
        &self,
        application_id: &ApplicationId,
        as_of: NaiveDate,
    ) -> Result<UnderwritingSummary, UnderwritingError> {
        let _claim = self.claim(application_id)?;

        let mut application = self.get(application_id)?;
        if application.status == ApplicationStatus::Withdrawn {
            return Err(UnderwritingError::Withdrawn(application_id.clone()));
        }

        let previous_status = application.status;
        application.status = ApplicationStatus::Underwriting;
        self.applications.update(application.clone())?;

        match self.run_underwriting(&application, as_of) {
            Ok(summary) => Ok(summary),
            Err(error) => {
                application.status = previous_status;
                if let Err(restore_error) = self.applications.update(application) {
                    warn!(
                        application_id = %application_id,
                        error = %restore_error,
                        "could not restore application status after failed run"
                    );
                }
                Err(error)
            }
        }
    }

    /// Everything after the `Underwriting` transition; any error here is rolled back by the caller.
    fn run_underwriting(
        &self,
        application: &LoanApplication,
        as_of: NaiveDate,
    ) -> Result<UnderwritingSummary, UnderwritingError> {
        let lenders = self.lenders.active_lenders()?;
        info!(application_id = %application.id, lenders = lenders.len(), "underwriting started");

        let matched = self.engine.match_application(application, &lenders, as_of)?;
        let summary =
            UnderwritingSummary::from_results(&application.id, ApplicationStatus::Completed, &matched);
        self.results.replace(&application.id, matched)?;

        let mut completed = application.clone();
        completed.status = ApplicationStatus::Completed;
        completed.underwriting_completed_at = Some(Utc::now());
        self.applications.update(completed)?;

        info!(
            application_id = %application.id,
            total = summary.total_lenders,
            eligible = summary.eligible_count,
            "underwriting completed"
        );
        Ok(summary)
    }

    /// Move an application between the caller-controlled states: draft, submitted, withdrawn.
    pub fn set_status(
        &self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<LoanApplication, UnderwritingError> {
        if matches!(
            status,
            ApplicationStatus::Underwriting | ApplicationStatus::Completed
        ) {
            return Err(UnderwritingError::StatusNotSettable(status));
        }
        let _claim = self.claim(application_id)?;

        let mut application = self.get(application_id)?;
        application.status = status;
        if status == ApplicationStatus::Submitted {
            application.submitted_at = Some(Utc::now());
        }
        self.applications.update(application.clone())?;
        info!(application_id = %application_id, status = %status, "application status changed");
        Ok(application)
    }

    /// Stored results for an application, ranked, with its best eligible match.
    pub fn results(
        &self,
        application_id: &ApplicationId,
    ) -> Result<UnderwritingResults, UnderwritingError> {
        let application = self.get(application_id)?;
        let results = self.results.results(application_id)?;
        Ok(UnderwritingResults::new(
            application_id,
            application.status,
            results,
        ))
    }

    /// Add a lender to the catalog, reporting rule types that would be skipped.
    pub fn register_lender(&self, lender: Lender) -> Result<LenderRegistration, UnderwritingError> {
        let unknown_rule_types = self
            .engine
            .registry()
            .unknown_rule_types(std::slice::from_ref(&lender));
        let lender = self.lenders.insert(lender)?;
        Ok(LenderRegistration {
            lender,
            unknown_rule_types,
        })
    }

    pub fn lenders(&self) -> Result<Vec<Lender>, UnderwritingError> {
        Ok(self.lenders.lenders()?)
    }

    pub fn lender(&self, lender_id: &LenderId) -> Result<Lender, UnderwritingError> {
        self.lenders
            .fetch(lender_id)?
            .ok_or_else(|| UnderwritingError::LenderNotFound(lender_id.clone()))
    }

    pub fn supported_rule_types(&self) -> Vec<String> {
        self.engine.registry().supported_rule_types()
    }

    fn claim(&self, application_id: &ApplicationId) -> Result<RunClaim<'_>, UnderwritingError> {
        let mut running = self
            .in_flight
            .lock()
            .map_err(|_| RepositoryError::Unavailable("in-flight registry poisoned".to_string()))?;
        if !running.insert(application_id.clone()) {
            return Err(UnderwritingError::AlreadyRunning(application_id.clone()));
        }
        Ok(RunClaim {
            in_flight: &self.in_flight,
            application_id: application_id.clone(),
        })
    }
}

/// Error raised by the underwriting service.
#[derive(Debug, thiserror::Error)]
pub enum UnderwritingError {
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("underwriting already running for application {0}")]
    AlreadyRunning(ApplicationId),
    #[error("application {0} has been withdrawn")]
    Withdrawn(ApplicationId),
    #[error("lender {0} not found")]
    LenderNotFound(LenderId),
    #[error("status {0} is set by underwriting runs only")]
    StatusNotSettable(ApplicationStatus),
    #[error(transparent)]
    Rule(#[from] RuleValueError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
