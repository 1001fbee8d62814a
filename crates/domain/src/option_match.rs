//! Choosing an option in a selectable match-value list.
//!
//! When the location match value is a dropdown rather than free text, the
//! dealership name rarely appears verbatim. Matchers run in priority order
//! and the first one that accepts an option wins. When nothing matches the
//! caller leaves the current selection alone and warns.

/// One way of accepting a list option for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMatcher {
    /// Option text equals the dealership name exactly.
    ExactName,
    /// Either text contains the other, ignoring case.
    OverlappingName,
    /// Option text contains the notification email, ignoring case.
    ContainsEmail,
}

impl OptionMatcher {
    /// Priority order used by [`choose_option`].
    pub const PRIORITY: [Self; 3] = [Self::ExactName, Self::OverlappingName, Self::ContainsEmail];

    fn accepts(self, option: &str, name: &str, email: &str) -> bool {
        match self {
            Self::ExactName => option == name,
            Self::OverlappingName => {
                let option = option.to_lowercase();
                let name = name.to_lowercase();
                !name.is_empty() && (option.contains(&name) || name.contains(&option))
            }
            Self::ContainsEmail => {
                !email.is_empty() && option.to_lowercase().contains(&email.to_lowercase())
            }
        }
    }
}

/// The option picked for a rule and the matcher that picked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChosenOption<'a> {
    pub text: &'a str,
    pub matched_by: OptionMatcher,
}

/// Pick the option for `name`, falling back to the notification `email`.
///
/// Blank options are never chosen. Option texts are compared trimmed.
#[must_use]
pub fn choose_option<'a, S: AsRef<str>>(
    options: &'a [S],
    name: &str,
    email: &str,
) -> Option<ChosenOption<'a>> {
    OptionMatcher::PRIORITY.into_iter().find_map(|matcher| {
        options
            .iter()
            .map(|option| option.as_ref().trim())
            .filter(|option| !option.is_empty())
            .find(|option| matcher.accepts(option, name, email))
            .map(|text| ChosenOption {
                text,
                matched_by: matcher,
            })
    })
}
