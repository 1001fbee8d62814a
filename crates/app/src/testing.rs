//! Scripted in-memory surface and rule source shared by the engine tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};

use leadrouter_domain::error::{LeadRouterError, SurfaceError};
use leadrouter_domain::form::{FormId, FormRef};
use leadrouter_domain::notification::NotificationKind;
use leadrouter_domain::rule::RuleRecord;
use leadrouter_domain::slot::{RuleSlot, SlotField, ValueControl};

use crate::ports::{FormSurface, RuleSource};

/// Every call the engine made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    ListForms,
    OpenForm(String),
    OpenNotifications(String),
    OpenNotification(String, NotificationKind),
    ListFields,
    ListSlots,
    Create(usize),
    Write(usize, SlotField, String),
    Read(usize, SlotField),
    ValueControl(usize),
    Save,
    ReturnToList,
}

/// One notification editor.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    pub fields: Vec<String>,
    pub slots: Vec<RuleSlot>,
    pub select_options: Option<Vec<String>>,
    /// Match value writes are silently replaced by this text.
    pub sticky_value: Option<String>,
    /// Slots whose writes fail structurally.
    pub broken_slots: HashSet<usize>,
    /// Slots reported by the listing instead of the real ones.
    pub stale_listing: Option<Vec<RuleSlot>>,
    pub slot_listing_fails: bool,
    pub no_save_control: bool,
}

impl Editor {
    pub fn offering(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn with_blank_slots(mut self, count: usize) -> Self {
        self.slots = (0..count).map(RuleSlot::blank).collect();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    pub form: FormRef,
    pub editors: HashMap<NotificationKind, Editor>,
    pub page_missing: bool,
}

impl Form {
    pub fn new(id: &str, editor: Editor) -> Self {
        let editors = NotificationKind::ORDER
            .into_iter()
            .map(|kind| (kind, editor.clone()))
            .collect();
        Self {
            form: FormRef::new(id, format!("Form {id}")),
            editors,
            page_missing: false,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    forms: Vec<Form>,
    open_editor: Option<(FormId, NotificationKind)>,
    log: Vec<Op>,
    /// Fail every call with `Unavailable` once the log reaches this length,
    /// until a return to the form list succeeds.
    unavailable_after: Option<usize>,
    recovery_fails: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    state: Arc<Mutex<State>>,
}

impl FakeSurface {
    pub fn with_forms(forms: Vec<Form>) -> Self {
        let surface = Self::default();
        surface.state.lock().unwrap().forms = forms;
        surface
    }

    pub fn unavailable_after(&self, ops: usize, recovery_fails: bool) {
        let mut state = self.state.lock().unwrap();
        state.unavailable_after = Some(ops);
        state.recovery_fails = recovery_fails;
    }

    pub fn log(&self) -> Vec<Op> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn writes(&self) -> Vec<Op> {
        self.log()
            .into_iter()
            .filter(|op| matches!(op, Op::Write(..) | Op::Create(_)))
            .collect()
    }

    pub fn slots(&self, id: &str, kind: NotificationKind) -> Vec<RuleSlot> {
        let state = self.state.lock().unwrap();
        state
            .forms
            .iter()
            .find(|form| form.form.id.as_str() == id)
            .map(|form| form.editors[&kind].slots.clone())
            .unwrap_or_default()
    }

    fn call<T>(
        &self,
        op: Op,
        action: impl FnOnce(&mut State) -> Result<T, SurfaceError>,
    ) -> Result<T, SurfaceError> {
        let mut state = self.state.lock().unwrap();
        let down = state
            .unavailable_after
            .is_some_and(|limit| state.log.len() >= limit);
        if down {
            if op == Op::ReturnToList && !state.recovery_fails {
                state.unavailable_after = None;
            } else {
                state.log.push(op);
                return Err(SurfaceError::Unavailable(Box::new(std::io::Error::other(
                    "session closed",
                ))));
            }
        }
        state.log.push(op);
        action(&mut *state)
    }
}

impl State {
    fn editor(&mut self) -> Result<&mut Editor, SurfaceError> {
        let (id, kind) = self
            .open_editor
            .clone()
            .ok_or_else(|| SurfaceError::ElementNotFound("notification editor".to_string()))?;
        self.forms
            .iter_mut()
            .find(|form| form.form.id == id)
            .and_then(|form| form.editors.get_mut(&kind))
            .ok_or_else(|| SurfaceError::ElementNotFound("notification editor".to_string()))
    }

    fn slot(&mut self, index: usize) -> Result<&mut RuleSlot, SurfaceError> {
        let editor = self.editor()?;
        if editor.broken_slots.contains(&index) {
            return Err(SurfaceError::Unresponsive(format!("editing slot {index}")));
        }
        editor
            .slots
            .iter_mut()
            .find(|slot| slot.index == index)
            .ok_or_else(|| SurfaceError::ElementNotFound(format!("slot {index}")))
    }
}

impl FormSurface for FakeSurface {
    async fn list_active_forms(&self) -> Result<Vec<FormRef>, SurfaceError> {
        self.call(Op::ListForms, |state| {
            Ok(state.forms.iter().map(|form| form.form.clone()).collect())
        })
    }

    async fn open_form(&self, form_id: &FormId) -> Result<(), SurfaceError> {
        self.call(Op::OpenForm(form_id.to_string()), |state| {
            let present = state
                .forms
                .iter()
                .any(|form| &form.form.id == form_id && !form.page_missing);
            if !present {
                return Err(SurfaceError::ElementNotFound("form settings".to_string()));
            }
            Ok(())
        })
    }

    async fn open_notifications(&self, form_id: &FormId) -> Result<(), SurfaceError> {
        self.call(Op::OpenNotifications(form_id.to_string()), |state| {
            if state.forms.iter().any(|form| &form.form.id == form_id) {
                Ok(())
            } else {
                Err(SurfaceError::ElementNotFound("notifications".to_string()))
            }
        })
    }

    async fn open_notification(
        &self,
        form_id: &FormId,
        kind: NotificationKind,
    ) -> Result<(), SurfaceError> {
        self.call(Op::OpenNotification(form_id.to_string(), kind), |state| {
            state.open_editor = Some((form_id.clone(), kind));
            state.editor().map(|_| ())
        })
    }

    async fn routing_field_options(&self) -> Result<Vec<String>, SurfaceError> {
        self.call(Op::ListFields, |state| Ok(state.editor()?.fields.clone()))
    }

    async fn rule_slots(&self) -> Result<Vec<RuleSlot>, SurfaceError> {
        self.call(Op::ListSlots, |state| {
            let editor = state.editor()?;
            if editor.slot_listing_fails {
                return Err(SurfaceError::ElementNotFound("routing rows".to_string()));
            }
            Ok(editor
                .stale_listing
                .clone()
                .unwrap_or_else(|| editor.slots.clone()))
        })
    }

    async fn create_rule_slot(&self) -> Result<usize, SurfaceError> {
        let next = {
            let mut state = self.state.lock().unwrap();
            state.editor().map(|editor| editor.slots.len()).unwrap_or_default()
        };
        self.call(Op::Create(next), |state| {
            let editor = state.editor()?;
            let index = editor.slots.len();
            editor.slots.push(RuleSlot::blank(index));
            Ok(index)
        })
    }

    async fn value_control(&self, index: usize) -> Result<ValueControl, SurfaceError> {
        self.call(Op::ValueControl(index), |state| {
            let editor = state.editor()?;
            Ok(match &editor.select_options {
                Some(options) => ValueControl::Select {
                    options: options.clone(),
                },
                None => ValueControl::FreeText,
            })
        })
    }

    async fn write_slot_field(
        &self,
        index: usize,
        field: SlotField,
        value: &str,
    ) -> Result<(), SurfaceError> {
        self.call(Op::Write(index, field, value.to_string()), |state| {
            let sticky = state.editor()?.sticky_value.clone();
            let slot = state.slot(index)?;
            *slot.get_mut(field) = match (field, sticky) {
                (SlotField::MatchValue, Some(sticky)) => sticky,
                _ => value.to_string(),
            };
            Ok(())
        })
    }

    async fn read_slot_field(&self, index: usize, field: SlotField) -> Result<String, SurfaceError> {
        self.call(Op::Read(index, field), |state| {
            Ok(state.slot(index)?.get(field).to_string())
        })
    }

    async fn save(&self) -> Result<bool, SurfaceError> {
        self.call(Op::Save, |state| Ok(!state.editor()?.no_save_control))
    }

    async fn return_to_form_list(&self) -> Result<(), SurfaceError> {
        self.call(Op::ReturnToList, |state| {
            state.open_editor = None;
            Ok(())
        })
    }
}

/// Rule source returning a fixed result.
pub struct FixedRules(pub Result<Vec<RuleRecord>, fn() -> LeadRouterError>);

impl RuleSource for FixedRules {
    fn read_rules(&self) -> impl Future<Output = Result<Vec<RuleRecord>, LeadRouterError>> + Send {
        let result = match &self.0 {
            Ok(rules) => Ok(rules.clone()),
            Err(make) => Err(make()),
        };
        async { result }
    }
}

pub fn rule(n: usize) -> RuleRecord {
    RuleRecord::builder()
        .dealership_name(format!("Dealer {n}"))
        .feed_id(format!("F-{n}"))
        .adf_email(format!("adf{n}@dealer.example"))
        .text_email(format!("text{n}@dealer.example"))
        .build()
        .unwrap()
}

pub fn rules(count: usize) -> Vec<RuleRecord> {
    (0..count).map(rule).collect()
}
