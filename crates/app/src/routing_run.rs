//! A complete routing run: validate the rule source, then reconcile every
//! active form in console order.
//!
//! Processing is strictly sequential since the surface is a single
//! stateful session. Within a form the ADF notification is reconciled
//! first; the text notification is only attempted when ADF succeeded.
//!
//! A form whose page cannot be opened is failed and the run moves on. When
//! the surface becomes unavailable the current form is failed and one
//! return to the form list is attempted; if that also fails the run halts
//! and every remaining form is reported as failed.

use leadrouter_domain::error::{LeadRouterError, SurfaceError};
use leadrouter_domain::form::FormRef;
use leadrouter_domain::notification::{NotificationKind, NotificationResult};
use leadrouter_domain::outcome::RunSummary;
use leadrouter_domain::rule::RuleRecord;

use crate::options::RunOptions;
use crate::ports::{FormSurface, RuleSource};
use crate::services::outcome_classifier::OutcomeClassifier;
use crate::services::slot_reconciler::SlotReconciler;
use crate::services::strategy_selector::StrategySelector;

/// Read and validate the rules of `source`, rejecting an empty source.
///
/// # Errors
///
/// Returns [`LeadRouterError::Validation`] with every issue found,
/// [`LeadRouterError::NoRules`] for an empty source, or the source's own
/// read error.
#[tracing::instrument(skip_all)]
pub async fn load_rules<R: RuleSource>(source: &R) -> Result<Vec<RuleRecord>, LeadRouterError> {
    let rules = source.read_rules().await?;
    if rules.is_empty() {
        tracing::error!("rule source contains no rows");
        return Err(LeadRouterError::NoRules);
    }
    tracing::info!(count = rules.len(), "loaded routing rules");
    Ok(rules)
}

/// Drives one run from rule loading to the final summary.
pub struct RoutingRun<R, S> {
    source: R,
    surface: S,
    options: RunOptions,
}

impl<R, S> RoutingRun<R, S>
where
    R: RuleSource,
    S: FormSurface + Clone,
{
    /// Create a new run over the given source and surface.
    pub fn new(source: R, surface: S, options: RunOptions) -> Self {
        Self {
            source,
            surface,
            options,
        }
    }

    /// Load and validate the rules. Nothing touches the surface before this
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRouterError::Validation`] with every issue found,
    /// [`LeadRouterError::NoRules`] for an empty source, or the source's
    /// own read error.
    pub async fn load_rules(&self) -> Result<Vec<RuleRecord>, LeadRouterError> {
        load_rules(&self.source).await
    }

    /// Reconcile every active form against `rules`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the active forms cannot be listed; every
    /// later problem is reported in the summary.
    #[tracing::instrument(skip_all, fields(rules = rules.len()))]
    pub async fn execute(&self, rules: &[RuleRecord]) -> Result<RunSummary, LeadRouterError> {
        let forms = self.surface.list_active_forms().await?;
        tracing::info!(count = forms.len(), "discovered active forms");

        let selector = StrategySelector::new(self.surface.clone());
        let reconciler = SlotReconciler::new(self.surface.clone(), self.options);
        let mut classifier = OutcomeClassifier::new();
        let mut halted = false;

        for (position, form) in forms.iter().enumerate() {
            if classifier.contains(&form.id) {
                tracing::warn!(form = %form, "form listed twice, processing it once");
                continue;
            }
            tracing::info!(
                form = %form,
                position = position + 1,
                of = forms.len(),
                "processing form"
            );

            let Err(err) = self
                .process_form(form, rules, &selector, &reconciler, &mut classifier)
                .await
            else {
                continue;
            };

            tracing::error!(form = %form, error = %err, "automation surface unavailable");
            classifier.record_failure(form, format!("automation surface unavailable: {err}"));
            match self.surface.return_to_form_list().await {
                Ok(()) => tracing::info!("recovered by returning to the form list"),
                Err(recovery) => {
                    tracing::error!(error = %recovery, "recovery failed, halting run");
                    halted = true;
                    break;
                }
            }
        }

        Ok(classifier.finish(&forms, halted))
    }

    /// Load the rules and reconcile every form.
    ///
    /// # Errors
    ///
    /// See [`Self::load_rules`] and [`Self::execute`].
    pub async fn run(&self) -> Result<RunSummary, LeadRouterError> {
        let rules = self.load_rules().await?;
        self.execute(&rules).await
    }

    /// Reconcile one form. Only a fatal surface error escapes.
    #[tracing::instrument(skip_all, fields(form_id = %form.id))]
    async fn process_form(
        &self,
        form: &FormRef,
        rules: &[RuleRecord],
        selector: &StrategySelector<S>,
        reconciler: &SlotReconciler<S>,
        classifier: &mut OutcomeClassifier,
    ) -> Result<(), SurfaceError> {
        if let Err(err) = self.surface.open_form(&form.id).await {
            if err.is_fatal() {
                return Err(err);
            }
            tracing::error!(error = %err, "could not open form");
            classifier.record_failure(form, format!("could not open form: {err}"));
            return Ok(());
        }

        let selection = selector.select_strategy(&form.id).await;
        let [first_kind, second_kind] = NotificationKind::ORDER;

        let first = reconciler
            .reconcile(&form.id, first_kind, selection.strategy, rules)
            .await?;
        let second = if first.result == NotificationResult::Success {
            Some(
                reconciler
                    .reconcile(&form.id, second_kind, selection.strategy, rules)
                    .await?,
            )
        } else {
            tracing::info!(
                notification = %second_kind,
                "not attempted because {first_kind} did not succeed"
            );
            None
        };

        classifier.classify(form, &first, second.as_ref());
        Ok(())
    }
}
