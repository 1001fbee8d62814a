//! Console fixtures: the forms, notifications and slots a virtual console
//! starts with.

use serde::{Deserialize, Serialize};

use leadrouter_domain::notification::NotificationKind;
use leadrouter_domain::slot::{MATCH_OPERATOR, RuleSlot};

/// Everything the virtual console knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleFixture {
    #[serde(default)]
    pub forms: Vec<FormFixture>,
}

/// One form of the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFixture {
    pub id: String,
    pub title: String,
    /// Inactive forms are not listed.
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub notifications: Vec<NotificationFixture>,
}

/// One notification editor of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFixture {
    pub kind: NotificationKind,
    /// Field names offered by the routing condition control.
    #[serde(default)]
    pub routing_fields: Vec<String>,
    #[serde(default)]
    pub slots: Vec<SlotFixture>,
    /// When set, match values are picked from this list.
    #[serde(default)]
    pub value_options: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub has_save_control: bool,
}

/// A routing rule slot as stored in a fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotFixture {
    pub email: String,
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl SlotFixture {
    /// A populated slot routing `value` of `field` to `email`.
    #[must_use]
    pub fn routing(email: &str, field: &str, value: &str) -> Self {
        Self {
            email: email.to_string(),
            field: field.to_string(),
            operator: MATCH_OPERATOR.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn into_slot(self, index: usize) -> RuleSlot {
        RuleSlot {
            index,
            email_value: self.email,
            match_field: self.field,
            match_operator: self.operator,
            match_value: self.value,
        }
    }
}

impl NotificationFixture {
    /// An editor offering `fields` with `blanks` empty slots.
    #[must_use]
    pub fn offering(kind: NotificationKind, fields: &[&str], blanks: usize) -> Self {
        Self {
            kind,
            routing_fields: fields.iter().map(ToString::to_string).collect(),
            slots: vec![SlotFixture::default(); blanks],
            value_options: None,
            has_save_control: true,
        }
    }
}

impl FormFixture {
    /// An active form with both notifications offering the same fields.
    #[must_use]
    pub fn with_both_notifications(id: &str, title: &str, fields: &[&str], blanks: usize) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            active: true,
            notifications: NotificationKind::ORDER
                .into_iter()
                .map(|kind| NotificationFixture::offering(kind, fields, blanks))
                .collect(),
        }
    }
}

impl ConsoleFixture {
    /// A small console with one form per routing situation.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            forms: vec![
                FormFixture::with_both_notifications(
                    "1",
                    "Schedule Test Drive",
                    &["Name", "Email", "Choose A Location"],
                    1,
                ),
                FormFixture::with_both_notifications(
                    "2",
                    "Get ePrice",
                    &["Name", "Email", "Dealer ID"],
                    0,
                ),
                FormFixture::with_both_notifications("3", "Newsletter", &["Email"], 1),
            ],
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_missing_flags_when_deserializing() {
        let json = serde_json::json!({
            "forms": [{
                "id": "12",
                "title": "Contact Us",
                "notifications": [{ "kind": "adf_xml", "routing_fields": ["Dealer ID"] }]
            }]
        });
        let fixture: ConsoleFixture = serde_json::from_value(json).unwrap();
        let form = &fixture.forms[0];

        assert!(form.active);
        assert_eq!(form.notifications[0].kind, NotificationKind::AdfXml);
        assert!(form.notifications[0].has_save_control);
        assert!(form.notifications[0].slots.is_empty());
    }

    #[test]
    fn should_build_demo_with_three_forms() {
        let demo = ConsoleFixture::demo();
        assert_eq!(demo.forms.len(), 3);
        assert!(demo.forms.iter().all(|form| form.notifications.len() == 2));
    }

    #[test]
    fn should_convert_slot_fixture_into_indexed_slot() {
        let slot = SlotFixture::routing("a@x.example", "Dealer ID", "A-1").into_slot(4);
        assert_eq!(slot.index, 4);
        assert_eq!(slot.match_operator, "is");
        assert!(!slot.is_blank());
    }
}
