//! In-memory collaborators for development, the CLI, and tests.

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Mutex, MutexGuard};

use super::domain::{ApplicationId, ApplicationStatus, Lender, LenderId, LoanApplication};
use super::outcome::MatchResult;
use super::repository::{
    ApplicationRepository, LenderCatalog, MatchResultStore, RepositoryError,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}

/// Applications keyed by id, listed in submission order.
#[derive(Debug, Default)]
pub struct InMemoryApplications {
    records: Mutex<Vec<LoanApplication>>,
}

impl ApplicationRepository for InMemoryApplications {
    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        let mut records = lock(&self.records)?;
        if records.iter().any(|existing| existing.id == application.id) {
            return Err(RepositoryError::Conflict);
        }
        records.push(application.clone());
        Ok(application)
    }

    fn update(&self, application: LoanApplication) -> Result<(), RepositoryError> {
        let mut records = lock(&self.records)?;
        let slot = records
            .iter_mut()
            .find(|existing| existing.id == application.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = application;
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        let records = lock(&self.records)?;
        Ok(records.iter().find(|existing| &existing.id == id).cloned())
    }

    fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<LoanApplication>, RepositoryError> {
        let records = lock(&self.records)?;
        Ok(records
            .iter()
            .filter(|application| status.map_or(true, |wanted| application.status == wanted))
            .cloned()
            .collect())
    }
}

/// Lender catalog held in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryLenderCatalog {
    lenders: Mutex<Vec<Lender>>,
}

impl InMemoryLenderCatalog {
    pub fn new(lenders: Vec<Lender>) -> Self {
        Self {
            lenders: Mutex::new(lenders),
        }
    }

    /// Load a JSON array of lenders; rule payloads are validated while parsing.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        let lenders: Vec<Lender> = serde_json::from_reader(reader)?;
        Ok(Self::new(lenders))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Self::from_reader(json.as_bytes())
    }
}

impl LenderCatalog for InMemoryLenderCatalog {
    fn active_lenders(&self) -> Result<Vec<Lender>, RepositoryError> {
        let lenders = lock(&self.lenders)?;
        Ok(lenders.iter().filter(|lender| lender.is_active).cloned().collect())
    }

    fn lenders(&self) -> Result<Vec<Lender>, RepositoryError> {
        Ok(lock(&self.lenders)?.clone())
    }

    fn fetch(&self, id: &LenderId) -> Result<Option<Lender>, RepositoryError> {
        let lenders = lock(&self.lenders)?;
        Ok(lenders.iter().find(|lender| &lender.id == id).cloned())
    }

    fn insert(&self, lender: Lender) -> Result<Lender, RepositoryError> {
        let mut lenders = lock(&self.lenders)?;
        if lenders.iter().any(|existing| existing.id == lender.id) {
            return Err(RepositoryError::Conflict);
        }
        lenders.push(lender.clone());
        Ok(lender)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMatchResults {
    results: Mutex<HashMap<ApplicationId, Vec<MatchResult>>>,
}

impl MatchResultStore for InMemoryMatchResults {
    fn replace(
        &self,
        application_id: &ApplicationId,
        results: Vec<MatchResult>,
    ) -> Result<(), RepositoryError> {
        let mut store = lock(&self.results)?;
        store.insert(application_id.clone(), results);
        Ok(())
    }

    fn results(&self, application_id: &ApplicationId) -> Result<Vec<MatchResult>, RepositoryError> {
        let store = lock(&self.results)?;
        Ok(store.get(application_id).cloned().unwrap_or_default())
    }
}
