use crate::infra::{load_catalog, parse_date};
use crate::output::{render_results, OutputFormat};
use chrono::{Local, NaiveDate};
use clap::Args;
use lender_match::error::AppError;
use lender_match::matching::{
    LenderCatalog, LoanApplication, MatchingEngine, RuleRegistry, UnderwritingError,
};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Loan application JSON file
    #[arg(long)]
    pub(crate) application: PathBuf,
    /// Lender catalog JSON file (defaults to the bundled demo lenders)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Evaluation date for time-based rules (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Output layout
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
    /// Evaluate lenders in parallel
    #[arg(long)]
    pub(crate) parallel: bool,
}

/// Rank the catalog's active lenders for one application file without storing anything.
pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let MatchArgs {
        application,
        catalog,
        as_of,
        format,
        parallel,
    } = args;

    let application: LoanApplication =
        serde_json::from_reader(BufReader::new(File::open(&application)?))?;
    let lenders = load_catalog(catalog.as_deref())?
        .active_lenders()
        .map_err(UnderwritingError::from)?;
    let engine = MatchingEngine::standard().with_parallel_lenders(parallel);

    let unknown = engine.registry().unknown_rule_types(&lenders);
    if !unknown.is_empty() {
        eprintln!(
            "warning: catalog rule types without evaluators are skipped: {}",
            unknown.join(", ")
        );
    }

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let results = engine
        .match_application(&application, &lenders, as_of)
        .map_err(UnderwritingError::from)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_results(&mut out, &results, format)
}

pub(crate) fn run_rule_types() -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_rule_types(&mut out, &RuleRegistry::standard())?;
    Ok(())
}

fn write_rule_types<W: Write>(out: &mut W, registry: &RuleRegistry) -> io::Result<()> {
    for rule_type in registry.supported_rule_types() {
        writeln!(out, "{rule_type}")?;
    }
    Ok(())
}
