//! Slot reconciler: writes the desired rules into one notification's
//! routing slots.
//!
//! Steps, each returning a classified outcome instead of unwinding:
//!
//! 1. capability check: the field the strategy routes on must be offered,
//!    otherwise the notification is skipped;
//! 2. slot inventory and planning (see [`SlotPlan`]), comparing filled
//!    slots against the value each rule actually stores, which for a
//!    selectable location list is the chosen option text;
//! 3. write + verify per assigned rule, retrying a mismatch once;
//! 4. save.
//!
//! Structural errors are contained to the smallest unit: a failed write
//! skips that rule, a failed inventory fails the notification. Only a
//! surface that became unavailable escapes as an error.
//!
//! Filled slots are never written. A slot listed as holding a rule that
//! reads back differently is left alone and the rule moves on to the next
//! spare blank or a new slot.

use std::collections::VecDeque;

use leadrouter_domain::error::SurfaceError;
use leadrouter_domain::form::FormId;
use leadrouter_domain::notification::{NotificationKind, NotificationReport};
use leadrouter_domain::option_match::choose_option;
use leadrouter_domain::plan::{DesiredRule, SlotPlan, SlotTarget};
use leadrouter_domain::routing::RoutingStrategy;
use leadrouter_domain::rule::RuleRecord;
use leadrouter_domain::slot::{MATCH_OPERATOR, RuleSlot, SlotField, ValueControl};

use crate::options::RunOptions;
use crate::ports::FormSurface;

/// Reconciles desired rules against the slots of a notification editor.
pub struct SlotReconciler<S> {
    surface: S,
    options: RunOptions,
}

/// What a single rule should look like once written.
struct RuleWrite<'a> {
    rule: &'a RuleRecord,
    email: &'a str,
    field: &'a str,
    /// The match value a correctly configured slot reads back.
    match_value: &'a str,
    strategy: RoutingStrategy,
}

impl<S: FormSurface> SlotReconciler<S> {
    /// Create a new reconciler driving the given surface.
    pub fn new(surface: S, options: RunOptions) -> Self {
        Self { surface, options }
    }

    /// Reconcile `rules` into the `kind` notification of a form.
    ///
    /// # Errors
    ///
    /// Returns the [`SurfaceError`] only when the surface became
    /// unavailable; every other problem is folded into the report.
    #[tracing::instrument(skip_all, fields(form_id = %form_id, notification = %kind, strategy = %strategy))]
    pub async fn reconcile(
        &self,
        form_id: &FormId,
        kind: NotificationKind,
        strategy: RoutingStrategy,
        rules: &[RuleRecord],
    ) -> Result<NotificationReport, SurfaceError> {
        let mut report = NotificationReport::new(kind);

        if kind == NotificationKind::Text
            && strategy == RoutingStrategy::LocationBased
            && !self.options.text_for_location_forms
        {
            tracing::info!("text notifications are disabled for location-based forms");
            return Ok(report.skipped("text notifications disabled for location-based forms"));
        }

        if let Err(err) = self.surface.open_notification(form_id, kind).await {
            let cause = contain(err)?;
            tracing::error!(%cause, "could not open notification editor");
            return Ok(report.failed(format!("could not open {kind}: {cause}")));
        }

        let offered = match self.surface.routing_field_options().await {
            Ok(offered) => offered,
            Err(err) => {
                let cause = contain(err)?;
                tracing::error!(%cause, "could not read routing fields");
                return Ok(report.failed(format!("could not read routing fields: {cause}")));
            }
        };
        let Some(field) = strategy.resolve_field(&offered).map(str::to_string) else {
            let cause = match strategy {
                RoutingStrategy::LocationBased => "no location field offered",
                RoutingStrategy::IdentifierBased => "no dealer id field offered",
            };
            tracing::warn!(?offered, "{cause}, skipping notification");
            return Ok(report.skipped(cause));
        };

        let slots = match self.surface.rule_slots().await {
            Ok(slots) => slots,
            Err(err) => {
                let cause = contain(err)?;
                tracing::error!(%cause, "could not enumerate rule slots");
                return Ok(report.failed(format!("could not enumerate rule slots: {cause}")));
            }
        };

        let expected = self
            .expected_match_values(kind, strategy, &field, &slots, rules)
            .await?;
        let desired: Vec<DesiredRule<'_>> = rules
            .iter()
            .zip(&expected)
            .map(|(rule, match_value)| DesiredRule {
                email: rule.email_for(kind),
                match_value,
            })
            .collect();
        let plan = SlotPlan::build(&desired, &slots);
        let mut spare_blanks: VecDeque<usize> = plan.unused_blanks.iter().copied().collect();
        tracing::info!(
            existing = slots.len(),
            present = plan.already_present(),
            overwrite = plan.overwritten(),
            create = plan.created(),
            %field,
            "planned rule slots"
        );

        for assignment in &plan.assignments {
            let rule = &rules[assignment.rule];
            let write = RuleWrite {
                rule,
                email: rule.email_for(kind),
                field: &field,
                match_value: &expected[assignment.rule],
                strategy,
            };
            match self
                .apply(assignment.target, &write, &mut spare_blanks, &mut report)
                .await
            {
                Ok(index) => {
                    report.rules_configured += 1;
                    tracing::info!(slot = index, %rule, "rule configured");
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    report.rules_skipped += 1;
                    tracing::warn!(%err, %rule, "rule skipped after structural error");
                    report.warnings.push(format!("{rule} skipped: {err}"));
                }
            }
        }

        match self.surface.save().await {
            Ok(true) => {
                tracing::info!(
                    configured = report.rules_configured,
                    skipped = report.rules_skipped,
                    "notification saved"
                );
                Ok(report)
            }
            Ok(false) => {
                tracing::error!("no save control found");
                Ok(report.failed("save control not found"))
            }
            Err(err) => {
                let cause = contain(err)?;
                tracing::error!(%cause, "save failed");
                Ok(report.failed(format!("save failed: {cause}")))
            }
        }
    }

    /// The match value each rule reads back once written, in rule order.
    ///
    /// Location lists store the chosen option text, so when a filled slot
    /// already routes on `field` through a select control the options are
    /// resolved up front. Rules no option accepts keep their raw value.
    async fn expected_match_values(
        &self,
        kind: NotificationKind,
        strategy: RoutingStrategy,
        field: &str,
        slots: &[RuleSlot],
        rules: &[RuleRecord],
    ) -> Result<Vec<String>, SurfaceError> {
        let raw = |rule: &RuleRecord| rule.match_value_for(strategy).to_string();
        if strategy != RoutingStrategy::LocationBased {
            return Ok(rules.iter().map(raw).collect());
        }
        let Some(sample) = slots
            .iter()
            .filter(|slot| !slot.is_blank() && slot.match_field.trim() == field)
            .min_by_key(|slot| slot.index)
        else {
            return Ok(rules.iter().map(raw).collect());
        };

        let options = match self.surface.value_control(sample.index).await {
            Ok(ValueControl::Select { options }) => options,
            Ok(ValueControl::FreeText) => return Ok(rules.iter().map(raw).collect()),
            Err(err) => {
                let cause = contain(err)?;
                tracing::warn!(slot = sample.index, %cause, "could not inspect match value control");
                return Ok(rules.iter().map(raw).collect());
            }
        };
        Ok(rules
            .iter()
            .map(|rule| {
                choose_option(&options, &rule.dealership_name, rule.email_for(kind))
                    .map_or_else(|| raw(rule), |chosen| chosen.text.to_string())
            })
            .collect())
    }

    /// Put one rule into its target slot, returning the slot index.
    async fn apply(
        &self,
        target: SlotTarget,
        write: &RuleWrite<'_>,
        spare_blanks: &mut VecDeque<usize>,
        report: &mut NotificationReport,
    ) -> Result<usize, SurfaceError> {
        let blank = match target {
            SlotTarget::Present(index) => {
                let mismatched = self
                    .mismatches(index, write.email, Some(write.match_value))
                    .await?;
                if mismatched.is_empty() {
                    tracing::debug!(slot = index, "rule already present");
                    return Ok(index);
                }
                tracing::warn!(
                    slot = index,
                    ?mismatched,
                    "filled slot reads back differently, leaving it untouched"
                );
                report.warnings.push(format!(
                    "slot {index}: listed as holding {} but reads back differently, left untouched",
                    write.rule
                ));
                spare_blanks.pop_front()
            }
            SlotTarget::Blank(index) => Some(index),
            SlotTarget::New => None,
        };
        let index = match blank {
            Some(index) => index,
            None => {
                let index = self.surface.create_rule_slot().await?;
                report.slots_created += 1;
                tracing::debug!(slot = index, "created rule slot");
                index
            }
        };

        self.surface
            .write_slot_field(index, SlotField::Email, write.email)
            .await?;
        self.surface
            .write_slot_field(index, SlotField::MatchField, write.field)
            .await?;
        self.surface
            .write_slot_field(index, SlotField::MatchOperator, MATCH_OPERATOR)
            .await?;
        let value = self.write_match_value(index, write, report).await?;
        self.verify(index, write.email, value.as_deref(), report)
            .await?;
        Ok(index)
    }

    /// Write the match value and return what should read back, if anything.
    async fn write_match_value(
        &self,
        index: usize,
        write: &RuleWrite<'_>,
        report: &mut NotificationReport,
    ) -> Result<Option<String>, SurfaceError> {
        let value = write.rule.match_value_for(write.strategy);
        let control = match write.strategy {
            RoutingStrategy::LocationBased => self.surface.value_control(index).await?,
            RoutingStrategy::IdentifierBased => ValueControl::FreeText,
        };
        if let ValueControl::Select { options } = control {
            let Some(chosen) = choose_option(&options, &write.rule.dealership_name, write.email)
            else {
                tracing::warn!(
                    slot = index,
                    dealership = %write.rule.dealership_name,
                    "no location option matches, leaving selection unchanged"
                );
                report.warnings.push(format!(
                    "slot {index}: no location option matches '{}', selection left unchanged",
                    write.rule.dealership_name
                ));
                return Ok(None);
            };
            tracing::debug!(
                slot = index,
                option = chosen.text,
                matched_by = ?chosen.matched_by,
                "selected location option"
            );
            let text = chosen.text.to_string();
            self.surface
                .write_slot_field(index, SlotField::MatchValue, &text)
                .await?;
            return Ok(Some(text));
        }

        self.surface
            .write_slot_field(index, SlotField::MatchValue, value)
            .await?;
        Ok(Some(value.to_string()))
    }

    /// Read back the written values, rewriting mismatches once.
    async fn verify(
        &self,
        index: usize,
        email: &str,
        value: Option<&str>,
        report: &mut NotificationReport,
    ) -> Result<(), SurfaceError> {
        let mismatched = self.mismatches(index, email, value).await?;
        if mismatched.is_empty() {
            return Ok(());
        }

        tracing::debug!(slot = index, ?mismatched, "read-back mismatch, retrying write");
        for (field, expected, _) in &mismatched {
            self.surface.write_slot_field(index, *field, expected).await?;
        }

        for (field, expected, actual) in self.mismatches(index, email, value).await? {
            tracing::warn!(slot = index, %field, %expected, %actual, "value still differs after retry");
            report.warnings.push(format!(
                "slot {index}: {field} reads back '{actual}', expected '{expected}'"
            ));
        }
        Ok(())
    }

    /// Fields whose current value differs from the expected one, as
    /// `(field, expected, actual)`.
    async fn mismatches(
        &self,
        index: usize,
        email: &str,
        value: Option<&str>,
    ) -> Result<Vec<(SlotField, String, String)>, SurfaceError> {
        let mut expected = vec![(SlotField::Email, email)];
        if let Some(value) = value {
            expected.push((SlotField::MatchValue, value));
        }

        let mut mismatched = Vec::new();
        for (field, wanted) in expected {
            let actual = self.surface.read_slot_field(index, field).await?;
            if actual.trim() != wanted.trim() {
                mismatched.push((field, wanted.to_string(), actual));
            }
        }
        Ok(mismatched)
    }
}

/// Turn a structural error into a cause; let a fatal one escape.
fn contain(err: SurfaceError) -> Result<String, SurfaceError> {
    if err.is_fatal() {
        Err(err)
    } else {
        Ok(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Editor, FakeSurface, Form, Op, rules};
    use leadrouter_domain::notification::NotificationResult;
    use leadrouter_domain::slot::RuleSlot;

    const ADF: NotificationKind = NotificationKind::AdfXml;

    fn surface(editor: Editor) -> FakeSurface {
        FakeSurface::with_forms(vec![Form::new("1", editor)])
    }

    async fn reconcile(
        surface: &FakeSurface,
        kind: NotificationKind,
        strategy: RoutingStrategy,
        count: usize,
    ) -> NotificationReport {
        SlotReconciler::new(surface.clone(), RunOptions::default())
            .reconcile(&FormId::new("1"), kind, strategy, &rules(count))
            .await
            .unwrap()
    }

    fn configured(index: usize, field: &str, email: &str, value: &str) -> RuleSlot {
        RuleSlot {
            index,
            email_value: email.to_string(),
            match_field: field.to_string(),
            match_operator: MATCH_OPERATOR.to_string(),
            match_value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn should_fill_two_blanks_and_create_one_slot_for_three_rules() {
        let surface = surface(Editor::offering(&["Name", "Dealer ID"]).with_blank_slots(2));
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 3).await;

        assert_eq!(report.result, NotificationResult::Success);
        assert_eq!(report.rules_configured, 3);
        assert_eq!(report.slots_created, 1);
        assert_eq!(
            surface.slots("1", ADF),
            vec![
                configured(0, "Dealer ID", "adf0@dealer.example", "F-0"),
                configured(1, "Dealer ID", "adf1@dealer.example", "F-1"),
                configured(2, "Dealer ID", "adf2@dealer.example", "F-2"),
            ]
        );
        let creates: Vec<Op> = surface
            .log()
            .into_iter()
            .filter(|op| matches!(op, Op::Create(_)))
            .collect();
        assert_eq!(creates, vec![Op::Create(2)]);
    }

    #[tokio::test]
    async fn should_leave_extra_blanks_untouched_when_enough_blanks() {
        let surface = surface(Editor::offering(&["Dealer ID"]).with_blank_slots(4));
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 2).await;

        assert_eq!(report.slots_created, 0);
        let slots = surface.slots("1", ADF);
        assert!(!slots[0].is_blank());
        assert!(!slots[1].is_blank());
        assert!(slots[2].is_blank());
        assert!(slots[3].is_blank());
    }

    #[tokio::test]
    async fn should_not_overwrite_filled_slots() {
        let mut editor = Editor::offering(&["Dealer ID"]);
        editor.slots = vec![
            configured(0, "Dealer ID", "someone@else.example", "X-9"),
            RuleSlot::blank(1),
        ];
        let surface = surface(editor);
        reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 2).await;

        let slots = surface.slots("1", ADF);
        assert_eq!(slots[0], configured(0, "Dealer ID", "someone@else.example", "X-9"));
        assert_eq!(slots[1].match_value, "F-0");
        assert_eq!(slots[2].match_value, "F-1");
        assert!(!surface.writes().iter().any(|op| matches!(op, Op::Write(0, ..))));
    }

    #[tokio::test]
    async fn should_only_read_when_rules_already_configured() {
        let mut editor = Editor::offering(&["Dealer ID"]);
        editor.slots = (0..3)
            .map(|i| {
                configured(
                    i,
                    "Dealer ID",
                    &format!("adf{i}@dealer.example"),
                    &format!("F-{i}"),
                )
            })
            .collect();
        let surface = surface(editor);
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 3).await;

        assert_eq!(report.result, NotificationResult::Success);
        assert_eq!(report.rules_configured, 3);
        assert!(surface.writes().is_empty());
        assert!(surface.log().contains(&Op::Read(2, SlotField::MatchValue)));
    }

    #[tokio::test]
    async fn should_skip_when_strategy_field_not_offered() {
        let surface = surface(Editor::offering(&["Name", "Email"]).with_blank_slots(1));
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 1).await;

        assert_eq!(report.result, NotificationResult::Skipped);
        assert_eq!(report.cause.as_deref(), Some("no dealer id field offered"));
        assert!(!surface.log().contains(&Op::ListSlots));
        assert!(surface.writes().is_empty());
    }

    #[tokio::test]
    async fn should_skip_location_strategy_without_location_field() {
        let surface = surface(Editor::offering(&["Dealer ID"]));
        let report = reconcile(&surface, ADF, RoutingStrategy::LocationBased, 1).await;
        assert_eq!(report.result, NotificationResult::Skipped);
        assert_eq!(report.cause.as_deref(), Some("no location field offered"));
    }

    #[tokio::test]
    async fn should_skip_text_on_location_forms_when_disabled() {
        let surface = surface(Editor::offering(&["Location"]));
        let reconciler = SlotReconciler::new(
            surface.clone(),
            RunOptions {
                text_for_location_forms: false,
            },
        );
        let report = reconciler
            .reconcile(
                &FormId::new("1"),
                NotificationKind::Text,
                RoutingStrategy::LocationBased,
                &rules(1),
            )
            .await
            .unwrap();

        assert_eq!(report.result, NotificationResult::Skipped);
        assert!(surface.log().is_empty());
    }

    #[tokio::test]
    async fn should_write_text_email_for_text_notification() {
        let surface = surface(Editor::offering(&["Dealer ID"]).with_blank_slots(1));
        reconcile(&surface, NotificationKind::Text, RoutingStrategy::IdentifierBased, 1).await;
        assert_eq!(
            surface.slots("1", NotificationKind::Text)[0].email_value,
            "text0@dealer.example"
        );
    }

    #[tokio::test]
    async fn should_write_dealership_name_for_location_strategy() {
        let surface = surface(Editor::offering(&["Choose A Location"]).with_blank_slots(1));
        reconcile(&surface, ADF, RoutingStrategy::LocationBased, 1).await;
        assert_eq!(
            surface.slots("1", ADF)[0],
            configured(0, "Choose A Location", "adf0@dealer.example", "Dealer 0")
        );
    }

    #[tokio::test]
    async fn should_pick_matching_option_when_value_is_selectable() {
        let mut editor = Editor::offering(&["Location"]).with_blank_slots(1);
        editor.select_options = Some(vec![
            "-- Select --".to_string(),
            "DEALER 0 - Downtown".to_string(),
        ]);
        let surface = surface(editor);
        let report = reconcile(&surface, ADF, RoutingStrategy::LocationBased, 1).await;

        assert_eq!(report.result, NotificationResult::Success);
        assert!(report.warnings.is_empty());
        assert_eq!(surface.slots("1", ADF)[0].match_value, "DEALER 0 - Downtown");
    }

    #[tokio::test]
    async fn should_not_write_again_when_selected_option_already_present() {
        let mut editor = Editor::offering(&["Location"]).with_blank_slots(1);
        editor.select_options = Some(vec!["DEALER 0 - Downtown".to_string()]);
        let surface = surface(editor);
        let first = reconcile(&surface, ADF, RoutingStrategy::LocationBased, 1).await;
        assert_eq!(first.result, NotificationResult::Success);
        let writes_after_first = surface.writes().len();

        let second = reconcile(&surface, ADF, RoutingStrategy::LocationBased, 1).await;

        assert_eq!(second.result, NotificationResult::Success);
        assert_eq!(second.rules_configured, 1);
        assert_eq!(second.slots_created, 0);
        assert_eq!(surface.writes().len(), writes_after_first);
        assert_eq!(
            surface.slots("1", ADF),
            vec![configured(
                0,
                "Location",
                "adf0@dealer.example",
                "DEALER 0 - Downtown"
            )]
        );
    }

    #[tokio::test]
    async fn should_use_dealership_name_when_no_filled_slot_routes_on_field() {
        let mut editor = Editor::offering(&["Location"]).with_blank_slots(1);
        editor.select_options = Some(vec!["DEALER 0 - Downtown".to_string()]);
        let surface = surface(editor);
        reconcile(&surface, ADF, RoutingStrategy::LocationBased, 1).await;

        let inspected: Vec<Op> = surface
            .log()
            .into_iter()
            .filter(|op| matches!(op, Op::ValueControl(_)))
            .collect();
        assert_eq!(inspected, vec![Op::ValueControl(0)]);
    }

    #[tokio::test]
    async fn should_leave_filled_slot_untouched_when_it_reads_back_differently() {
        let mut editor = Editor::offering(&["Dealer ID"]);
        editor.slots = vec![configured(0, "Dealer ID", "someone@else.example", "X-9")];
        editor.stale_listing = Some(vec![configured(
            0,
            "Dealer ID",
            "adf0@dealer.example",
            "F-0",
        )]);
        let surface = surface(editor);
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 1).await;

        assert_eq!(report.result, NotificationResult::Success);
        assert_eq!(report.rules_configured, 1);
        assert_eq!(report.slots_created, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(!surface.writes().iter().any(|op| matches!(op, Op::Write(0, ..))));
        assert_eq!(
            surface.slots("1", ADF),
            vec![
                configured(0, "Dealer ID", "someone@else.example", "X-9"),
                configured(1, "Dealer ID", "adf0@dealer.example", "F-0"),
            ]
        );
    }

    #[tokio::test]
    async fn should_fall_back_to_spare_blank_when_listed_slot_reads_back_differently() {
        let mut editor = Editor::offering(&["Dealer ID"]);
        editor.slots = vec![
            configured(0, "Dealer ID", "someone@else.example", "X-9"),
            RuleSlot::blank(1),
        ];
        editor.stale_listing = Some(vec![
            configured(0, "Dealer ID", "adf0@dealer.example", "F-0"),
            RuleSlot::blank(1),
        ]);
        let surface = surface(editor);
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 1).await;

        assert_eq!(report.slots_created, 0);
        assert!(!surface.writes().iter().any(|op| matches!(op, Op::Write(0, ..))));
        assert_eq!(surface.slots("1", ADF)[1].match_value, "F-0");
    }

    #[tokio::test]
    async fn should_leave_selection_unchanged_when_no_option_matches() {
        let mut editor = Editor::offering(&["Location"]).with_blank_slots(1);
        editor.select_options = Some(vec!["North".to_string(), "South".to_string()]);
        let surface = surface(editor);
        let report = reconcile(&surface, ADF, RoutingStrategy::LocationBased, 1).await;

        assert_eq!(report.result, NotificationResult::Success);
        assert_eq!(report.rules_configured, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(
            !surface
                .writes()
                .iter()
                .any(|op| matches!(op, Op::Write(_, SlotField::MatchValue, _)))
        );
    }

    #[tokio::test]
    async fn should_retry_once_and_warn_when_value_does_not_stick() {
        let mut editor = Editor::offering(&["Dealer ID"]).with_blank_slots(1);
        editor.sticky_value = Some("garbled".to_string());
        let surface = surface(editor);
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 1).await;

        assert_eq!(report.result, NotificationResult::Success);
        assert_eq!(report.rules_configured, 1);
        assert_eq!(report.warnings.len(), 1);
        let value_writes = surface
            .writes()
            .into_iter()
            .filter(|op| matches!(op, Op::Write(0, SlotField::MatchValue, _)))
            .count();
        assert_eq!(value_writes, 2);
        assert_eq!(surface.log().last(), Some(&Op::Save));
    }

    #[tokio::test]
    async fn should_skip_rule_and_continue_when_slot_is_broken() {
        let mut editor = Editor::offering(&["Dealer ID"]).with_blank_slots(2);
        editor.broken_slots.insert(0);
        let surface = surface(editor);
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 2).await;

        assert_eq!(report.result, NotificationResult::Success);
        assert_eq!(report.rules_skipped, 1);
        assert_eq!(report.rules_configured, 1);
        assert_eq!(surface.slots("1", ADF)[1].match_value, "F-1");
    }

    #[tokio::test]
    async fn should_fail_when_slots_cannot_be_enumerated() {
        let mut editor = Editor::offering(&["Dealer ID"]);
        editor.slot_listing_fails = true;
        let surface = surface(editor);
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 1).await;

        assert_eq!(report.result, NotificationResult::Failed);
        assert!(surface.writes().is_empty());
    }

    #[tokio::test]
    async fn should_fail_when_no_save_control() {
        let mut editor = Editor::offering(&["Dealer ID"]).with_blank_slots(1);
        editor.no_save_control = true;
        let surface = surface(editor);
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 1).await;

        assert_eq!(report.result, NotificationResult::Failed);
        assert_eq!(report.cause.as_deref(), Some("save control not found"));
    }

    #[tokio::test]
    async fn should_fail_when_editor_cannot_be_opened() {
        let surface = FakeSurface::with_forms(Vec::new());
        let report = reconcile(&surface, ADF, RoutingStrategy::IdentifierBased, 1).await;
        assert_eq!(report.result, NotificationResult::Failed);
    }

    #[tokio::test]
    async fn should_propagate_unavailable_surface() {
        let surface = surface(Editor::offering(&["Dealer ID"]).with_blank_slots(1));
        surface.unavailable_after(3, true);
        let result = SlotReconciler::new(surface.clone(), RunOptions::default())
            .reconcile(&FormId::new("1"), ADF, RoutingStrategy::IdentifierBased, &rules(1))
            .await;

        assert!(matches!(result, Err(SurfaceError::Unavailable(_))));
    }
}
