//! Rule records: the desired routing rules read from the data source.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SourceValidationError, ValidationIssue};
use crate::notification::NotificationKind;
use crate::routing::RoutingStrategy;

/// One desired routing rule: which emails receive leads for a dealership.
///
/// Immutable once read. Uniqueness is not enforced; when several records
/// share a dealership name they are processed in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub dealership_name: String,
    pub feed_id: String,
    pub adf_email: String,
    pub text_email: String,
}

impl RuleRecord {
    /// Create a builder for constructing a [`RuleRecord`].
    #[must_use]
    pub fn builder() -> RuleRecordBuilder {
        RuleRecordBuilder::default()
    }

    /// Email address that the given notification should route to.
    #[must_use]
    pub fn email_for(&self, kind: NotificationKind) -> &str {
        match kind {
            NotificationKind::AdfXml => &self.adf_email,
            NotificationKind::Text => &self.text_email,
        }
    }

    /// Value the routing condition must match under `strategy`.
    #[must_use]
    pub fn match_value_for(&self, strategy: RoutingStrategy) -> &str {
        match strategy {
            RoutingStrategy::LocationBased => &self.dealership_name,
            RoutingStrategy::IdentifierBased => &self.feed_id,
        }
    }

    /// Value of a single required column.
    #[must_use]
    pub fn column(&self, column: RuleColumn) -> &str {
        match column {
            RuleColumn::DealershipName => &self.dealership_name,
            RuleColumn::FeedId => &self.feed_id,
            RuleColumn::AdfEmail => &self.adf_email,
            RuleColumn::TextEmail => &self.text_email,
        }
    }
}

impl fmt::Display for RuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (feed {})", self.dealership_name, self.feed_id)
    }
}

/// The four columns every rule record requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleColumn {
    DealershipName,
    FeedId,
    AdfEmail,
    TextEmail,
}

impl RuleColumn {
    /// All required columns, in header order.
    pub const ALL: [Self; 4] = [
        Self::DealershipName,
        Self::FeedId,
        Self::AdfEmail,
        Self::TextEmail,
    ];

    /// Header label used by the lead-routing sheet.
    #[must_use]
    pub fn header(self) -> &'static str {
        match self {
            Self::DealershipName => "DEALERSHIP NAME",
            Self::FeedId => "FEED ID",
            Self::AdfEmail => "ADF Email",
            Self::TextEmail => "Text Email",
        }
    }
}

impl fmt::Display for RuleColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Step-by-step builder for [`RuleRecord`].
///
/// Values are trimmed; blank values are reported against `row`.
#[derive(Debug, Default)]
pub struct RuleRecordBuilder {
    row: usize,
    dealership_name: Option<String>,
    feed_id: Option<String>,
    adf_email: Option<String>,
    text_email: Option<String>,
}

impl RuleRecordBuilder {
    /// Source row number used when reporting issues.
    #[must_use]
    pub fn row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }

    #[must_use]
    pub fn dealership_name(mut self, value: impl Into<String>) -> Self {
        self.dealership_name = Some(value.into());
        self
    }

    #[must_use]
    pub fn feed_id(mut self, value: impl Into<String>) -> Self {
        self.feed_id = Some(value.into());
        self
    }

    #[must_use]
    pub fn adf_email(mut self, value: impl Into<String>) -> Self {
        self.adf_email = Some(value.into());
        self
    }

    #[must_use]
    pub fn text_email(mut self, value: impl Into<String>) -> Self {
        self.text_email = Some(value.into());
        self
    }

    /// Set a value by column.
    #[must_use]
    pub fn column(self, column: RuleColumn, value: impl Into<String>) -> Self {
        match column {
            RuleColumn::DealershipName => self.dealership_name(value),
            RuleColumn::FeedId => self.feed_id(value),
            RuleColumn::AdfEmail => self.adf_email(value),
            RuleColumn::TextEmail => self.text_email(value),
        }
    }

    /// Consume the builder, validate, and return a [`RuleRecord`].
    ///
    /// # Errors
    ///
    /// Returns a [`SourceValidationError`] listing every missing or blank
    /// column.
    pub fn build(self) -> Result<RuleRecord, SourceValidationError> {
        let record = RuleRecord {
            dealership_name: trimmed(self.dealership_name),
            feed_id: trimmed(self.feed_id),
            adf_email: trimmed(self.adf_email),
            text_email: trimmed(self.text_email),
        };

        let issues: Vec<ValidationIssue> = RuleColumn::ALL
            .into_iter()
            .filter(|column| record.column(*column).is_empty())
            .map(|column| ValidationIssue::EmptyCell {
                row: self.row,
                column: column.header().to_string(),
            })
            .collect();

        if issues.is_empty() {
            Ok(record)
        } else {
            Err(SourceValidationError::new(issues))
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
