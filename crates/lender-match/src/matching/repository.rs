use serde::Serialize;

use super::domain::{ApplicationId, ApplicationStatus, Lender, LenderId, LoanApplication};
use super::outcome::MatchResult;

/// Storage abstraction for loan applications.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, RepositoryError>;
    fn update(&self, application: LoanApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError>;
    fn list(&self, status: Option<ApplicationStatus>)
        -> Result<Vec<LoanApplication>, RepositoryError>;
}

/// Read side of the lender policy catalog, plus insertion for authoring tools.
pub trait LenderCatalog: Send + Sync {
    /// Active lenders in catalog order.
    fn active_lenders(&self) -> Result<Vec<Lender>, RepositoryError>;
    fn lenders(&self) -> Result<Vec<Lender>, RepositoryError>;
    fn fetch(&self, id: &LenderId) -> Result<Option<Lender>, RepositoryError>;
    fn insert(&self, lender: Lender) -> Result<Lender, RepositoryError>;
}

/// Per-application match results; a run swaps the whole set at once.
pub trait MatchResultStore: Send + Sync {
    fn replace(
        &self,
        application_id: &ApplicationId,
        results: Vec<MatchResult>,
    ) -> Result<(), RepositoryError>;
    fn results(&self, application_id: &ApplicationId) -> Result<Vec<MatchResult>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub business_name: String,
    pub status: &'static str,
    pub amount_requested: String,
    pub equipment_type: String,
}

impl From<&LoanApplication> for ApplicationStatusView {
    fn from(application: &LoanApplication) -> Self {
        Self {
            application_id: application.id.clone(),
            business_name: application.borrower.business_name.clone(),
            status: application.status.label(),
            amount_requested: application.amount_requested.to_string(),
            equipment_type: application.equipment_type.clone(),
        }
    }
}
