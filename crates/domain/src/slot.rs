//! Rule slots: the rows of routing configuration present in the UI.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operator written into every routing condition.
pub const MATCH_OPERATOR: &str = "is";

/// One row of routing configuration as read from the live UI.
///
/// Identity is the `index` the automation surface assigns; the engine never
/// keeps slots beyond a single notification visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSlot {
    pub index: usize,
    pub email_value: String,
    pub match_field: String,
    pub match_operator: String,
    pub match_value: String,
}

impl RuleSlot {
    /// A slot with nothing configured.
    #[must_use]
    pub fn blank(index: usize) -> Self {
        Self {
            index,
            email_value: String::new(),
            match_field: String::new(),
            match_operator: String::new(),
            match_value: String::new(),
        }
    }

    /// A slot is blank when either its email or its match value is unset.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.email_value.trim().is_empty() || self.match_value.trim().is_empty()
    }

    /// Whether the slot already routes `email` for `match_value`.
    #[must_use]
    pub fn holds(&self, email: &str, match_value: &str) -> bool {
        !self.is_blank()
            && self.email_value.trim() == email.trim()
            && self.match_value.trim() == match_value.trim()
    }

    /// Current value of one field.
    #[must_use]
    pub fn get(&self, field: SlotField) -> &str {
        match field {
            SlotField::Email => &self.email_value,
            SlotField::MatchField => &self.match_field,
            SlotField::MatchOperator => &self.match_operator,
            SlotField::MatchValue => &self.match_value,
        }
    }

    /// Mutable access to one field.
    pub fn get_mut(&mut self, field: SlotField) -> &mut String {
        match field {
            SlotField::Email => &mut self.email_value,
            SlotField::MatchField => &mut self.match_field,
            SlotField::MatchOperator => &mut self.match_operator,
            SlotField::MatchValue => &mut self.match_value,
        }
    }
}

/// The writable parts of a rule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotField {
    Email,
    MatchField,
    MatchOperator,
    MatchValue,
}

impl fmt::Display for SlotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::MatchField => f.write_str("match field"),
            Self::MatchOperator => f.write_str("match operator"),
            Self::MatchValue => f.write_str("match value"),
        }
    }
}

/// How a slot's match value is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueControl {
    /// Free text input.
    FreeText,
    /// Selectable list; only the listed option texts can be chosen.
    Select { options: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(index: usize) -> RuleSlot {
        RuleSlot {
            index,
            email_value: "leads@a.example".to_string(),
            match_field: "Dealer ID".to_string(),
            match_operator: MATCH_OPERATOR.to_string(),
            match_value: "A-1".to_string(),
        }
    }

    #[test]
    fn should_treat_slot_without_email_as_blank() {
        let mut slot = filled(0);
        slot.email_value = "   ".to_string();
        assert!(slot.is_blank());
    }

    #[test]
    fn should_treat_slot_without_match_value_as_blank() {
        let mut slot = filled(0);
        slot.match_value.clear();
        assert!(slot.is_blank());
    }

    #[test]
    fn should_treat_fully_populated_slot_as_filled() {
        assert!(!filled(3).is_blank());
        assert!(RuleSlot::blank(3).is_blank());
    }

    #[test]
    fn should_hold_rule_when_email_and_value_match() {
        let slot = filled(0);
        assert!(slot.holds("leads@a.example", "A-1"));
        assert!(!slot.holds("leads@a.example", "A-2"));
        assert!(!RuleSlot::blank(0).holds("", ""));
    }

    #[test]
    fn should_update_field_through_mutable_access() {
        let mut slot = RuleSlot::blank(1);
        *slot.get_mut(SlotField::MatchOperator) = MATCH_OPERATOR.to_string();
        assert_eq!(slot.get(SlotField::MatchOperator), "is");
    }

    #[test]
    fn should_deserialize_select_control_from_tagged_json() {
        let json = serde_json::json!({ "type": "select", "options": ["North", "South"] });
        let control: ValueControl = serde_json::from_value(json).unwrap();
        assert_eq!(
            control,
            ValueControl::Select {
                options: vec!["North".to_string(), "South".to_string()]
            }
        );
    }
}
