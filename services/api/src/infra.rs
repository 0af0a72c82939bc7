use chrono::NaiveDate;
use lender_match::error::AppError;
use lender_match::matching::{InMemoryLenderCatalog, MatchingEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

/// Lender catalog bundled with the binary, used when no catalog path is configured.
pub(crate) const DEMO_CATALOG: &str = include_str!("../catalog/demo_lenders.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<MatchingEngine>,
    pub(crate) catalog: Arc<InMemoryLenderCatalog>,
}

/// Load the lender catalog from `path`, or the bundled demo catalog.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<InMemoryLenderCatalog, AppError> {
    match path {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            let catalog = InMemoryLenderCatalog::from_reader(reader)?;
            info!(path = %path.display(), "loaded lender catalog");
            Ok(catalog)
        }
        None => Ok(InMemoryLenderCatalog::from_json(DEMO_CATALOG)?),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lender_match::matching::LenderCatalog;

    #[test]
    fn demo_catalog_parses_with_known_rule_types() {
        let catalog = load_catalog(None).expect("demo catalog parses");
        let lenders = catalog.active_lenders().expect("catalog readable");

        assert_eq!(lenders.len(), 5);
        let unknown = MatchingEngine::standard()
            .registry()
            .unknown_rule_types(&lenders);
        assert!(unknown.is_empty(), "unexpected rule types: {unknown:?}");
    }

    #[test]
    fn missing_catalog_file_is_an_io_error() {
        match load_catalog(Some(Path::new("/nonexistent/lenders.json"))) {
            Err(AppError::Io(_)) => {}
            other => panic!("expected io error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_date(" 2025-06-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"))
        );
        assert!(parse_date("06/01/2025").is_err());
    }
}
