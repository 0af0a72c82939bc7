use clap::ValueEnum;
use lender_match::error::AppError;
use lender_match::matching::MatchResult;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// One ranked line, flattened for CSV export.
#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    rank: usize,
    lender_id: &'a str,
    lender_name: &'a str,
    program: &'a str,
    eligible: bool,
    fit_score: u8,
    rules_passed: usize,
    rules_failed: usize,
    failed_rules: String,
}

impl<'a> MatchRow<'a> {
    fn new(rank: usize, result: &'a MatchResult) -> Self {
        let details = &result.evaluation_details;
        Self {
            rank,
            lender_id: &result.lender_id.0,
            lender_name: &result.lender_name,
            program: result.program_name.as_deref().unwrap_or("-"),
            eligible: result.is_eligible,
            fit_score: result.fit_score,
            rules_passed: details.rules_passed,
            rules_failed: details.rules_failed,
            failed_rules: details
                .summary
                .failed
                .iter()
                .map(|detail| detail.rule_type.as_str())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

pub(crate) fn render_results<W: Write>(
    out: &mut W,
    results: &[MatchResult],
    format: OutputFormat,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Table => render_table(out, results)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => render_csv(out, results)?,
    }
    Ok(())
}

fn render_table<W: Write>(out: &mut W, results: &[MatchResult]) -> std::io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "No active lenders in the catalog");
    }

    writeln!(
        out,
        "{:<4} {:<28} {:<26} {:<10} {:>5}",
        "#", "Lender", "Program", "Eligible", "Score"
    )?;
    for (index, result) in results.iter().enumerate() {
        let row = MatchRow::new(index + 1, result);
        writeln!(
            out,
            "{:<4} {:<28} {:<26} {:<10} {:>5}",
            row.rank,
            row.lender_name,
            row.program,
            if row.eligible { "yes" } else { "no" },
            row.fit_score
        )?;
        for failed in &result.evaluation_details.summary.failed {
            let marker = if failed.is_required { "required" } else { "soft" };
            writeln!(out, "       x [{marker}] {}", failed.reason)?;
        }
        for warning in &result.evaluation_details.summary.warnings {
            writeln!(out, "       ! {warning}")?;
        }
    }
    Ok(())
}

fn render_csv<W: Write>(out: &mut W, results: &[MatchResult]) -> std::io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for (index, result) in results.iter().enumerate() {
        writer.serialize(MatchRow::new(index + 1, result))?;
    }
    writer.flush()
}
