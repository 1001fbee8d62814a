//! Form automation surface port: the admin console as seen by the engine.
//!
//! The surface is stateful: navigation calls position it, and the slot
//! operations act on whichever notification editor is currently open. It
//! is the sole source of truth for slot state; the engine re-reads slots on
//! every visit and caches nothing.
//!
//! Every operation may fail with a [`SurfaceError`]. A capability that is
//! simply absent (no routing field, no save control) is reported through
//! the return value, not as an error.

use std::future::Future;

use leadrouter_domain::error::SurfaceError;
use leadrouter_domain::form::{FormId, FormRef};
use leadrouter_domain::notification::NotificationKind;
use leadrouter_domain::slot::{RuleSlot, SlotField, ValueControl};

/// Drives a single interactive console session.
///
/// Callers must not drive one surface concurrently.
pub trait FormSurface {
    /// List the active forms, in console order.
    fn list_active_forms(&self)
    -> impl Future<Output = Result<Vec<FormRef>, SurfaceError>> + Send;

    /// Open a form's page.
    fn open_form(&self, form_id: &FormId) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Open the list of notifications configured on a form.
    fn open_notifications(
        &self,
        form_id: &FormId,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Open one notification's editor with routing mode enabled.
    fn open_notification(
        &self,
        form_id: &FormId,
        kind: NotificationKind,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Field names offered by the open editor's routing condition control.
    fn routing_field_options(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, SurfaceError>> + Send;

    /// All routing rule slots of the open editor.
    fn rule_slots(&self) -> impl Future<Output = Result<Vec<RuleSlot>, SurfaceError>> + Send;

    /// Append a new slot and return its index.
    fn create_rule_slot(&self) -> impl Future<Output = Result<usize, SurfaceError>> + Send;

    /// How the match value of a slot is entered.
    fn value_control(
        &self,
        index: usize,
    ) -> impl Future<Output = Result<ValueControl, SurfaceError>> + Send;

    /// Write one field of a slot.
    fn write_slot_field(
        &self,
        index: usize,
        field: SlotField,
        value: &str,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Read back one field of a slot.
    fn read_slot_field(
        &self,
        index: usize,
        field: SlotField,
    ) -> impl Future<Output = Result<String, SurfaceError>> + Send;

    /// Persist the open editor. Returns `false` when no save control exists.
    fn save(&self) -> impl Future<Output = Result<bool, SurfaceError>> + Send;

    /// Navigate back to the form list (used to recover after an error).
    fn return_to_form_list(&self) -> impl Future<Output = Result<(), SurfaceError>> + Send;
}

impl<T: FormSurface + Send + Sync> FormSurface for std::sync::Arc<T> {
    fn list_active_forms(
        &self,
    ) -> impl Future<Output = Result<Vec<FormRef>, SurfaceError>> + Send {
        (**self).list_active_forms()
    }

    fn open_form(&self, form_id: &FormId) -> impl Future<Output = Result<(), SurfaceError>> + Send {
        (**self).open_form(form_id)
    }

    fn open_notifications(
        &self,
        form_id: &FormId,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send {
        (**self).open_notifications(form_id)
    }

    fn open_notification(
        &self,
        form_id: &FormId,
        kind: NotificationKind,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send {
        (**self).open_notification(form_id, kind)
    }

    fn routing_field_options(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, SurfaceError>> + Send {
        (**self).routing_field_options()
    }

    fn rule_slots(&self) -> impl Future<Output = Result<Vec<RuleSlot>, SurfaceError>> + Send {
        (**self).rule_slots()
    }

    fn create_rule_slot(&self) -> impl Future<Output = Result<usize, SurfaceError>> + Send {
        (**self).create_rule_slot()
    }

    fn value_control(
        &self,
        index: usize,
    ) -> impl Future<Output = Result<ValueControl, SurfaceError>> + Send {
        (**self).value_control(index)
    }

    fn write_slot_field(
        &self,
        index: usize,
        field: SlotField,
        value: &str,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send {
        (**self).write_slot_field(index, field, value)
    }

    fn read_slot_field(
        &self,
        index: usize,
        field: SlotField,
    ) -> impl Future<Output = Result<String, SurfaceError>> + Send {
        (**self).read_slot_field(index, field)
    }

    fn save(&self) -> impl Future<Output = Result<bool, SurfaceError>> + Send {
        (**self).save()
    }

    fn return_to_form_list(&self) -> impl Future<Output = Result<(), SurfaceError>> + Send {
        (**self).return_to_form_list()
    }
}
