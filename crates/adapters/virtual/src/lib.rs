//! # leadrouter-adapter-virtual
//!
//! Virtual admin console that implements the form automation surface in
//! memory, for dry runs, demonstrations and tests.
//!
//! ## Behaviour
//!
//! | Action | Effect |
//! |--------|--------|
//! | open a notification | starts a draft copy of its rule slots |
//! | write / create | edits the draft only |
//! | save | commits the draft (returns `false` without a save control) |
//! | navigate elsewhere | discards an unsaved draft |
//!
//! Match fields must be one of the offered routing fields, and when a
//! notification has a value option list the match value must be one of its
//! options, as with the real console's dropdowns. Every call is recorded in
//! an operation log.
//!
//! ## Dependency rule
//!
//! Depends on `leadrouter-app` (port traits) and `leadrouter-domain` only.

mod error;
mod fixture;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use leadrouter_app::ports::FormSurface;
use leadrouter_domain::error::SurfaceError;
use leadrouter_domain::form::{FormId, FormRef};
use leadrouter_domain::notification::NotificationKind;
use leadrouter_domain::slot::{RuleSlot, SlotField, ValueControl};

pub use error::VirtualError;
pub use fixture::{ConsoleFixture, FormFixture, NotificationFixture, SlotFixture};

/// One call made against the virtual console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListForms,
    OpenForm(FormId),
    OpenNotifications(FormId),
    OpenNotification(FormId, NotificationKind),
    ListRoutingFields,
    ListSlots,
    CreateSlot,
    Write {
        index: usize,
        field: SlotField,
        value: String,
    },
    Read {
        index: usize,
        field: SlotField,
    },
    InspectValueControl(usize),
    Save,
    ReturnToFormList,
}

impl Operation {
    /// Whether the operation changes slot content.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::CreateSlot | Self::Write { .. })
    }
}

#[derive(Debug)]
struct Notification {
    kind: NotificationKind,
    routing_fields: Vec<String>,
    slots: Vec<RuleSlot>,
    value_options: Option<Vec<String>>,
    has_save_control: bool,
}

#[derive(Debug)]
struct ConsoleForm {
    form: FormRef,
    active: bool,
    notifications: Vec<Notification>,
}

#[derive(Debug)]
struct Draft {
    form: FormId,
    kind: NotificationKind,
    routing_fields: Vec<String>,
    value_options: Option<Vec<String>>,
    has_save_control: bool,
    slots: Vec<RuleSlot>,
}

#[derive(Debug, Default)]
struct State {
    forms: Vec<ConsoleForm>,
    draft: Option<Draft>,
    operations: Vec<Operation>,
    closed: bool,
}

impl State {
    fn active_form(&self, id: &FormId) -> Result<&ConsoleForm, SurfaceError> {
        self.forms
            .iter()
            .find(|form| &form.form.id == id && form.active)
            .ok_or_else(|| SurfaceError::ElementNotFound(format!("form {id}")))
    }

    fn draft(&mut self) -> Result<&mut Draft, SurfaceError> {
        self.draft
            .as_mut()
            .ok_or_else(|| SurfaceError::ElementNotFound("notification editor".to_string()))
    }

    fn discard_draft(&mut self) {
        if let Some(draft) = self.draft.take() {
            tracing::debug!(form_id = %draft.form, notification = %draft.kind, "discarding unsaved draft");
        }
    }
}

impl Draft {
    fn slot(&mut self, index: usize) -> Result<&mut RuleSlot, SurfaceError> {
        self.slots
            .iter_mut()
            .find(|slot| slot.index == index)
            .ok_or_else(|| SurfaceError::ElementNotFound(format!("rule slot {index}")))
    }
}

/// In-memory admin console.
///
/// Cloning shares the same console.
#[derive(Debug, Clone)]
pub struct VirtualConsole {
    state: Arc<Mutex<State>>,
}

impl Default for VirtualConsole {
    fn default() -> Self {
        Self::from_forms(ConsoleFixture::demo().forms)
    }
}

impl VirtualConsole {
    /// Build a console from a fixture.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::DuplicateForm`] if two forms share an id.
    pub fn new(fixture: ConsoleFixture) -> Result<Self, VirtualError> {
        let mut seen = HashSet::new();
        if let Some(dup) = fixture.forms.iter().find(|form| !seen.insert(form.id.as_str())) {
            return Err(VirtualError::DuplicateForm(dup.id.clone()));
        }
        Ok(Self::from_forms(fixture.forms))
    }

    /// Build a console from a JSON fixture file.
    ///
    /// # Errors
    ///
    /// Returns a [`VirtualError`] if the file cannot be read or decoded.
    pub fn from_json_file(path: &Path) -> Result<Self, VirtualError> {
        let bytes = std::fs::read(path)?;
        let fixture: ConsoleFixture = serde_json::from_slice(&bytes)?;
        tracing::info!(path = %path.display(), forms = fixture.forms.len(), "loaded console fixture");
        Self::new(fixture)
    }

    fn from_forms(forms: Vec<FormFixture>) -> Self {
        let forms = forms
            .into_iter()
            .map(|form| ConsoleForm {
                form: FormRef::new(form.id.as_str(), form.title),
                active: form.active,
                notifications: form
                    .notifications
                    .into_iter()
                    .map(|notification| Notification {
                        kind: notification.kind,
                        routing_fields: notification.routing_fields,
                        slots: notification
                            .slots
                            .into_iter()
                            .enumerate()
                            .map(|(index, slot)| slot.into_slot(index))
                            .collect(),
                        value_options: notification.value_options,
                        has_save_control: notification.has_save_control,
                    })
                    .collect(),
            })
            .collect();
        Self {
            state: Arc::new(Mutex::new(State {
                forms,
                ..State::default()
            })),
        }
    }

    /// Every call made so far, in order.
    pub async fn operations(&self) -> Vec<Operation> {
        self.state.lock().await.operations.clone()
    }

    /// The committed slots of a notification.
    pub async fn saved_slots(&self, form_id: &FormId, kind: NotificationKind) -> Vec<RuleSlot> {
        let state = self.state.lock().await;
        state
            .forms
            .iter()
            .filter(|form| &form.form.id == form_id)
            .flat_map(|form| &form.notifications)
            .find(|notification| notification.kind == kind)
            .map(|notification| notification.slots.clone())
            .unwrap_or_default()
    }

    /// Close the console; every later call fails as unavailable.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        state.discard_draft();
    }

    async fn call<T>(
        &self,
        operation: Operation,
        action: impl FnOnce(&mut State) -> Result<T, SurfaceError>,
    ) -> Result<T, SurfaceError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(error::closed());
        }
        tracing::trace!(?operation, "virtual console call");
        state.operations.push(operation);
        action(&mut *state)
    }
}

impl FormSurface for VirtualConsole {
    async fn list_active_forms(&self) -> Result<Vec<FormRef>, SurfaceError> {
        self.call(Operation::ListForms, |state| {
            state.discard_draft();
            Ok(state
                .forms
                .iter()
                .filter(|form| form.active)
                .map(|form| form.form.clone())
                .collect())
        })
        .await
    }

    async fn open_form(&self, form_id: &FormId) -> Result<(), SurfaceError> {
        self.call(Operation::OpenForm(form_id.clone()), |state| {
            state.discard_draft();
            state.active_form(form_id).map(|_| ())
        })
        .await
    }

    async fn open_notifications(&self, form_id: &FormId) -> Result<(), SurfaceError> {
        self.call(Operation::OpenNotifications(form_id.clone()), |state| {
            state.discard_draft();
            state.active_form(form_id).map(|_| ())
        })
        .await
    }

    async fn open_notification(
        &self,
        form_id: &FormId,
        kind: NotificationKind,
    ) -> Result<(), SurfaceError> {
        self.call(Operation::OpenNotification(form_id.clone(), kind), |state| {
            state.discard_draft();
            let notification = state
                .active_form(form_id)?
                .notifications
                .iter()
                .find(|notification| notification.kind == kind)
                .ok_or_else(|| SurfaceError::ElementNotFound(kind.title().to_string()))?;
            let draft = Draft {
                form: form_id.clone(),
                kind,
                routing_fields: notification.routing_fields.clone(),
                value_options: notification.value_options.clone(),
                has_save_control: notification.has_save_control,
                slots: notification.slots.clone(),
            };
            state.draft = Some(draft);
            Ok(())
        })
        .await
    }

    async fn routing_field_options(&self) -> Result<Vec<String>, SurfaceError> {
        self.call(Operation::ListRoutingFields, |state| {
            Ok(state.draft()?.routing_fields.clone())
        })
        .await
    }

    async fn rule_slots(&self) -> Result<Vec<RuleSlot>, SurfaceError> {
        self.call(Operation::ListSlots, |state| Ok(state.draft()?.slots.clone()))
            .await
    }

    async fn create_rule_slot(&self) -> Result<usize, SurfaceError> {
        self.call(Operation::CreateSlot, |state| {
            let draft = state.draft()?;
            let index = draft.slots.iter().map(|slot| slot.index + 1).max().unwrap_or(0);
            draft.slots.push(RuleSlot::blank(index));
            Ok(index)
        })
        .await
    }

    async fn value_control(&self, index: usize) -> Result<ValueControl, SurfaceError> {
        self.call(Operation::InspectValueControl(index), |state| {
            let draft = state.draft()?;
            draft.slot(index)?;
            Ok(match &draft.value_options {
                Some(options) => ValueControl::Select {
                    options: options.clone(),
                },
                None => ValueControl::FreeText,
            })
        })
        .await
    }

    async fn write_slot_field(
        &self,
        index: usize,
        field: SlotField,
        value: &str,
    ) -> Result<(), SurfaceError> {
        let operation = Operation::Write {
            index,
            field,
            value: value.to_string(),
        };
        self.call(operation, |state| {
            let draft = state.draft()?;
            let allowed = match field {
                SlotField::MatchField => Some(&draft.routing_fields),
                SlotField::MatchValue => draft.value_options.as_ref(),
                SlotField::Email | SlotField::MatchOperator => None,
            };
            if allowed.is_some_and(|allowed| !allowed.iter().any(|option| option == value)) {
                return Err(SurfaceError::ElementNotFound(format!(
                    "{field} option '{value}'"
                )));
            }
            *draft.slot(index)?.get_mut(field) = value.to_string();
            Ok(())
        })
        .await
    }

    async fn read_slot_field(&self, index: usize, field: SlotField) -> Result<String, SurfaceError> {
        self.call(Operation::Read { index, field }, |state| {
            Ok(state.draft()?.slot(index)?.get(field).to_string())
        })
        .await
    }

    async fn save(&self) -> Result<bool, SurfaceError> {
        self.call(Operation::Save, |state| {
            let draft = state.draft()?;
            if !draft.has_save_control {
                return Ok(false);
            }
            let (form_id, kind, slots) = (draft.form.clone(), draft.kind, draft.slots.clone());
            let notification = state
                .forms
                .iter_mut()
                .filter(|form| form.form.id == form_id)
                .flat_map(|form| form.notifications.iter_mut())
                .find(|notification| notification.kind == kind)
                .ok_or_else(|| SurfaceError::ElementNotFound(kind.title().to_string()))?;
            notification.slots = slots;
            tracing::debug!(%form_id, notification = %kind, "virtual notification saved");
            Ok(true)
        })
        .await
    }

    async fn return_to_form_list(&self) -> Result<(), SurfaceError> {
        self.call(Operation::ReturnToFormList, |state| {
            state.discard_draft();
            Ok(())
        })
        .await
    }
}
