//! Routing strategies and the field matchers that recognise routing fields.
//!
//! A form routes leads either on a location-selection field or on a dealer
//! identifier field. Which one applies is decided from the field names the
//! routing UI offers, using priority-ordered matcher lists evaluated left to
//! right: the first matcher that finds an offered field wins.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How routing conditions are keyed on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Match on a location field, using the dealership name.
    LocationBased,
    /// Match on a dealer identifier field, using the feed id.
    IdentifierBased,
}

impl RoutingStrategy {
    /// Matchers that recognise the field this strategy routes on.
    #[must_use]
    pub fn matchers(self) -> &'static [FieldMatcher] {
        match self {
            Self::LocationBased => LOCATION_FIELDS,
            Self::IdentifierBased => IDENTIFIER_FIELDS,
        }
    }

    /// Find the offered field this strategy would route on.
    #[must_use]
    pub fn resolve_field<'a, S: AsRef<str>>(self, offered: &'a [S]) -> Option<&'a str> {
        resolve(self.matchers(), offered)
    }
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocationBased => f.write_str("location-based"),
            Self::IdentifierBased => f.write_str("dealer-id-based"),
        }
    }
}

/// One way of recognising a routing field by its offered name.
///
/// Comparisons ignore case and surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatcher {
    /// The offered name equals this label.
    Named(&'static str),
    /// The offered name contains this fragment.
    Containing(&'static str),
}

impl FieldMatcher {
    #[must_use]
    pub fn matches(self, offered: &str) -> bool {
        let offered = offered.trim().to_lowercase();
        match self {
            Self::Named(label) => offered == label.to_lowercase(),
            Self::Containing(fragment) => offered.contains(&fragment.to_lowercase()),
        }
    }
}

/// Location field names, most specific first, then any name mentioning a location.
pub const LOCATION_FIELDS: &[FieldMatcher] = &[
    FieldMatcher::Named("Choose A Location"),
    FieldMatcher::Named("Location"),
    FieldMatcher::Named("Dealership Location"),
    FieldMatcher::Named("Store Location"),
    FieldMatcher::Named("Dealer Location"),
    FieldMatcher::Containing("location"),
];

/// Dealer identifier field names, most specific first.
pub const IDENTIFIER_FIELDS: &[FieldMatcher] = &[
    FieldMatcher::Named("Dealer ID"),
    FieldMatcher::Named("Dealership ID"),
    FieldMatcher::Named("Dealer"),
    FieldMatcher::Named("ID"),
];

/// Evaluate `matchers` in order against the offered names; the first
/// matcher with a hit returns the first offered name it accepts.
#[must_use]
pub fn resolve<'a, S: AsRef<str>>(matchers: &[FieldMatcher], offered: &'a [S]) -> Option<&'a str> {
    matchers.iter().find_map(|matcher| {
        offered
            .iter()
            .map(AsRef::as_ref)
            .find(|name| !name.trim().is_empty() && matcher.matches(name))
    })
}

/// Why a strategy was chosen for a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionBasis {
    /// A location field is offered (takes priority over identifiers).
    LocationField(String),
    /// No location field, but an identifier field is offered.
    IdentifierField(String),
    /// Neither kind of field is offered.
    NoRoutingField,
    /// The routing UI could not be inspected.
    InspectionFailed(String),
}

/// The strategy chosen for a form and the evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySelection {
    pub strategy: RoutingStrategy,
    pub basis: SelectionBasis,
}

impl StrategySelection {
    /// Decide the strategy from the offered field names.
    ///
    /// Location fields win over identifier fields; with neither present the
    /// conservative default is identifier-based routing.
    #[must_use]
    pub fn from_offered<S: AsRef<str>>(offered: &[S]) -> Self {
        if let Some(field) = RoutingStrategy::LocationBased.resolve_field(offered) {
            return Self {
                strategy: RoutingStrategy::LocationBased,
                basis: SelectionBasis::LocationField(field.to_string()),
            };
        }
        if let Some(field) = RoutingStrategy::IdentifierBased.resolve_field(offered) {
            return Self {
                strategy: RoutingStrategy::IdentifierBased,
                basis: SelectionBasis::IdentifierField(field.to_string()),
            };
        }
        Self {
            strategy: RoutingStrategy::IdentifierBased,
            basis: SelectionBasis::NoRoutingField,
        }
    }

    /// Fallback used when the routing UI cannot be inspected.
    #[must_use]
    pub fn inspection_failed(reason: impl Into<String>) -> Self {
        Self {
            strategy: RoutingStrategy::IdentifierBased,
            basis: SelectionBasis::InspectionFailed(reason.into()),
        }
    }

    /// Whether the choice is a fallback that deserves a warning.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(
            self.basis,
            SelectionBasis::NoRoutingField | SelectionBasis::InspectionFailed(_)
        )
    }
}
