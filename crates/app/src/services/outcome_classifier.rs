//! Outcome classifier: folds notification results into per-form outcomes
//! and keeps the run's completed / skipped / failed buckets.

use leadrouter_domain::form::{FormId, FormRef};
use leadrouter_domain::notification::{NotificationKind, NotificationReport, NotificationResult};
use leadrouter_domain::outcome::{FormOutcome, RunLedger, RunSummary};

/// Classifies every processed form exactly once.
#[derive(Debug, Default)]
pub struct OutcomeClassifier {
    ledger: RunLedger,
}

impl OutcomeClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a form from its notification reports and record it.
    ///
    /// `second` is `None` when the second notification was never attempted
    /// (the first one did not succeed). The recorded cause is the first
    /// non-success cause among the reports.
    pub fn classify(
        &mut self,
        form: &FormRef,
        first: &NotificationReport,
        second: Option<&NotificationReport>,
    ) -> FormOutcome {
        let outcome = FormOutcome::from_results(first.result, second.map(|report| report.result));
        let cause = if outcome == FormOutcome::Success {
            None
        } else {
            Some(
                std::iter::once(first)
                    .chain(second)
                    .find(|report| report.result != NotificationResult::Success)
                    .map_or_else(
                        || format!("{} was not attempted", second_title(first)),
                        |report| match &report.cause {
                            Some(cause) => format!("{}: {cause}", report.kind),
                            None => report.kind.to_string(),
                        },
                    ),
            )
        };
        self.record(form, outcome, cause);
        outcome
    }

    /// Record a form that failed before its notifications could be reconciled.
    pub fn record_failure(&mut self, form: &FormRef, cause: impl Into<String>) {
        self.record(form, FormOutcome::Failed, Some(cause.into()));
    }

    /// Whether a form has already been classified.
    #[must_use]
    pub fn contains(&self, id: &FormId) -> bool {
        self.ledger.contains(id)
    }

    /// Close the run; unclassified discovered forms become failures.
    #[must_use]
    pub fn finish(self, discovered: &[FormRef], halted_early: bool) -> RunSummary {
        let summary = self.ledger.finish(discovered, halted_early);
        tracing::info!(
            total = summary.total,
            completed = summary.completed.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            halted_early,
            "run finished"
        );
        summary
    }

    fn record(&mut self, form: &FormRef, outcome: FormOutcome, cause: Option<String>) {
        match &cause {
            Some(cause) => tracing::info!(form = %form, %outcome, %cause, "form classified"),
            None => tracing::info!(form = %form, %outcome, "form classified"),
        }
        if !self.ledger.record(form.clone(), outcome, cause) {
            tracing::warn!(form = %form, "form already classified, keeping first outcome");
        }
    }
}

fn second_title(first: &NotificationReport) -> String {
    NotificationKind::ORDER
        .into_iter()
        .find(|kind| *kind != first.kind)
        .unwrap_or(first.kind)
        .to_string()
}
