//! Terminal rendering of run summaries and validation failures.

use colored::Colorize;
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};

use leadrouter_domain::error::SourceValidationError;
use leadrouter_domain::outcome::{FormOutcome, FormRecord, RunStatus, RunSummary};

fn heading(outcome: FormOutcome, count: usize) -> String {
    let text = format!("{} ({count})", outcome.to_string().to_uppercase());
    match outcome {
        FormOutcome::Success => text.green().bold().to_string(),
        FormOutcome::Skipped => text.yellow().bold().to_string(),
        FormOutcome::Failed => text.red().bold().to_string(),
    }
}

fn bucket_table(records: &[FormRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Form", "Likely cause"]);
    for record in records {
        table.add_row(vec![
            Cell::new(record.form.id.as_str()),
            Cell::new(&record.form.title),
            Cell::new(record.cause.as_deref().unwrap_or("-")),
        ]);
    }
    table
}

/// Render the end-of-run summary, one table per non-empty bucket.
#[must_use]
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\nTotal forms: {}  completed: {}  skipped: {}  failed: {}\n",
        "ROUTING RUN SUMMARY".bold(),
        summary.total,
        summary.completed.len(),
        summary.skipped.len(),
        summary.failed.len(),
    ));
    if summary.halted_early {
        out.push_str(&format!(
            "{}\n",
            "Run halted early: the console became unreachable.".red()
        ));
    }
    for outcome in [FormOutcome::Success, FormOutcome::Skipped, FormOutcome::Failed] {
        let records = summary.bucket(outcome);
        if records.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "\n{}\n{}\n",
            heading(outcome, records.len()),
            bucket_table(records)
        ));
    }
    let verdict = match summary.status() {
        RunStatus::AllSucceeded => "All forms were configured.".green(),
        RunStatus::Partial => "Some forms need attention.".yellow(),
        RunStatus::NoneSucceeded => "No form was configured.".red(),
    };
    out.push_str(&format!("\n{verdict}\n"));
    out
}

/// Render every validation issue of the rule source.
#[must_use]
pub fn format_validation(err: &SourceValidationError) -> String {
    let mut out = format!(
        "{} the rule source has {} problem(s); nothing was changed:\n",
        "Validation failed:".red().bold(),
        err.issues.len()
    );
    for issue in &err.issues {
        out.push_str(&format!("  - {issue}\n"));
    }
    out
}
