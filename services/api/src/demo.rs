use crate::infra::{load_catalog, parse_date};
use crate::output::{render_results, OutputFormat};
use chrono::{Local, NaiveDate};
use clap::Args;
use lender_match::error::AppError;
use lender_match::matching::{
    primary_guarantor, Guarantor, InMemoryApplications, InMemoryMatchResults, LoanApplication,
    MatchingEngine, UnderwritingService,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) const CONSTRUCTION_APPLICATION: &str =
    include_str!("../catalog/applications/construction.json");
pub(crate) const TRUCKING_APPLICATION: &str = include_str!("../catalog/applications/trucking.json");

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Lender catalog JSON to match against instead of the bundled demo lenders.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Output layout for each ranked result set.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

pub(crate) fn sample_applications() -> Result<Vec<LoanApplication>, AppError> {
    [CONSTRUCTION_APPLICATION, TRUCKING_APPLICATION]
        .into_iter()
        .map(|raw| serde_json::from_str(raw).map_err(AppError::from))
        .collect()
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        as_of,
        catalog,
        format,
    } = args;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let service = UnderwritingService::new(
        Arc::new(InMemoryApplications::default()),
        Arc::new(load_catalog(catalog.as_deref())?),
        Arc::new(InMemoryMatchResults::default()),
        MatchingEngine::standard(),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Lender matching demo (evaluated {as_of})")?;

    for application in sample_applications()? {
        let stored = service.submit(application)?;
        let summary = service.underwrite_as_of(&stored.id, as_of)?;
        writeln!(
            out,
            "\n{} | {} for ${} over {} months",
            stored.borrower.business_name,
            stored.equipment_type,
            stored.amount_requested,
            stored.term_months
        )?;
        let guarantor = primary_guarantor(&stored.borrower.guarantors)
            .map(Guarantor::full_name)
            .unwrap_or_else(|| "none on file".to_string());
        writeln!(out, "- Primary guarantor: {guarantor}")?;
        writeln!(
            out,
            "- {} lenders evaluated | {} eligible | {} declined",
            summary.total_lenders, summary.eligible_count, summary.ineligible_count
        )?;

        let results = service.results(&stored.id)?;
        match &results.best_match {
            Some(best) => writeln!(
                out,
                "- Best match: {} / {} (score {})",
                best.lender_name,
                best.program_name.as_deref().unwrap_or("-"),
                best.fit_score
            )?,
            None => writeln!(out, "- No eligible lender found")?,
        }
        render_results(&mut out, &results.results, format)?;
    }

    Ok(())
}
