//! Form outcomes and the run-level buckets they are sorted into.
//!
//! Every discovered form ends the run in exactly one of three buckets:
//! completed, skipped, or failed. [`RunLedger`] enforces that a form is
//! recorded at most once, and [`RunLedger::finish`] places any form that
//! was never recorded in the failed bucket, so the buckets always
//! partition the discovered set.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::{FormId, FormRef};
use crate::notification::NotificationResult;

/// Final classification of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormOutcome {
    Success,
    Skipped,
    Failed,
}

impl FormOutcome {
    /// Combine the results of the two notifications.
    ///
    /// `second` is `None` when the second notification was not attempted.
    /// Success needs both to succeed; any failure wins over a skip.
    #[must_use]
    pub fn from_results(first: NotificationResult, second: Option<NotificationResult>) -> Self {
        let results = [Some(first), second];
        if results.contains(&Some(NotificationResult::Failed)) {
            return Self::Failed;
        }
        if results.contains(&Some(NotificationResult::Skipped)) {
            return Self::Skipped;
        }
        if second == Some(NotificationResult::Success) {
            Self::Success
        } else {
            Self::Failed
        }
    }
}

impl fmt::Display for FormOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("completed"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// A form in its bucket, with the likely cause for skips and failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub form: FormRef,
    pub outcome: FormOutcome,
    pub cause: Option<String>,
}

/// Accumulates form outcomes during a run.
#[derive(Debug)]
pub struct RunLedger {
    started_at: DateTime<Utc>,
    seen: HashSet<FormId>,
    completed: Vec<FormRecord>,
    skipped: Vec<FormRecord>,
    failed: Vec<FormRecord>,
}

impl Default for RunLedger {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            seen: HashSet::new(),
            completed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl RunLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a form into the bucket for `outcome`.
    ///
    /// Returns `false` (and records nothing) if the form is already in a bucket.
    pub fn record(&mut self, form: FormRef, outcome: FormOutcome, cause: Option<String>) -> bool {
        if !self.seen.insert(form.id.clone()) {
            return false;
        }
        let record = FormRecord {
            form,
            outcome,
            cause,
        };
        match outcome {
            FormOutcome::Success => self.completed.push(record),
            FormOutcome::Skipped => self.skipped.push(record),
            FormOutcome::Failed => self.failed.push(record),
        }
        true
    }

    /// Whether a form has been classified.
    #[must_use]
    pub fn contains(&self, id: &FormId) -> bool {
        self.seen.contains(id)
    }

    /// Close the run against the full discovered list.
    ///
    /// Discovered forms that were never classified count as failed. Forms
    /// recorded but not discovered are dropped so totals stay consistent.
    #[must_use]
    pub fn finish(mut self, discovered: &[FormRef], halted_early: bool) -> RunSummary {
        let known: HashSet<&FormId> = discovered.iter().map(|form| &form.id).collect();
        for bucket in [&mut self.completed, &mut self.skipped, &mut self.failed] {
            bucket.retain(|record| known.contains(&record.form.id));
        }

        let cause = if halted_early {
            "run halted before this form was processed"
        } else {
            "form was not processed"
        };
        let mut pending = HashSet::new();
        for form in discovered {
            if !self.seen.contains(&form.id) && pending.insert(form.id.clone()) {
                self.failed.push(FormRecord {
                    form: form.clone(),
                    outcome: FormOutcome::Failed,
                    cause: Some(cause.to_string()),
                });
            }
        }

        RunSummary {
            total: self.completed.len() + self.skipped.len() + self.failed.len(),
            completed: self.completed,
            skipped: self.skipped,
            failed: self.failed,
            halted_early,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Machine-usable verdict for scripting callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    AllSucceeded,
    Partial,
    NoneSucceeded,
}

/// End-of-run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub completed: Vec<FormRecord>,
    pub skipped: Vec<FormRecord>,
    pub failed: Vec<FormRecord>,
    pub halted_early: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Overall verdict. A run that discovered no forms succeeded at nothing.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        if self.total > 0 && self.completed.len() == self.total {
            RunStatus::AllSucceeded
        } else if self.completed.is_empty() {
            RunStatus::NoneSucceeded
        } else {
            RunStatus::Partial
        }
    }

    /// Bucket records for an outcome.
    #[must_use]
    pub fn bucket(&self, outcome: FormOutcome) -> &[FormRecord] {
        match outcome {
            FormOutcome::Success => &self.completed,
            FormOutcome::Skipped => &self.skipped,
            FormOutcome::Failed => &self.failed,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total forms: {}", self.total)?;
        writeln!(f, "Completed: {}", self.completed.len())?;
        writeln!(f, "Skipped: {}", self.skipped.len())?;
        writeln!(f, "Failed: {}", self.failed.len())?;
        if self.halted_early {
            writeln!(f, "Run halted early: automation surface became unreachable")?;
        }
        for outcome in [FormOutcome::Success, FormOutcome::Skipped, FormOutcome::Failed] {
            let records = self.bucket(outcome);
            if records.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{outcome} forms:")?;
            for record in records {
                match &record.cause {
                    Some(cause) => writeln!(f, "  - {} - {cause}", record.form)?,
                    None => writeln!(f, "  - {}", record.form)?,
                }
            }
        }
        Ok(())
    }
}
