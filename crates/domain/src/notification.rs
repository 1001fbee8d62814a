//! Notification types and the per-notification result of a reconciliation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The notifications configured on every form, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Machine-readable lead notification, routed to the ADF email.
    AdfXml,
    /// Plain text notification, routed to the text email.
    Text,
}

impl NotificationKind {
    /// Processing order within a form.
    pub const ORDER: [Self; 2] = [Self::AdfXml, Self::Text];

    /// Title shown for the notification in the console.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::AdfXml => "ADF/XML Formatted Notification",
            Self::Text => "Text Formatted Notification",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Result of reconciling one notification of one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationResult {
    /// Every rule was written (or already present) and the editor saved.
    Success,
    /// The field required by the routing strategy is not offered.
    Skipped,
    /// A structural UI error prevented completion.
    Failed,
}

impl fmt::Display for NotificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// What happened while reconciling a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationReport {
    pub kind: NotificationKind,
    pub result: NotificationResult,
    /// Likely cause for a skip or failure.
    pub cause: Option<String>,
    /// Rules written (or found already present) and counted configured.
    pub rules_configured: usize,
    /// Rules abandoned after a structural error.
    pub rules_skipped: usize,
    /// New slots requested from the surface.
    pub slots_created: usize,
    /// Non-fatal problems (verification mismatches, unmatched options).
    pub warnings: Vec<String>,
}

impl NotificationReport {
    /// A report with no rule activity yet.
    #[must_use]
    pub fn new(kind: NotificationKind) -> Self {
        Self {
            kind,
            result: NotificationResult::Success,
            cause: None,
            rules_configured: 0,
            rules_skipped: 0,
            slots_created: 0,
            warnings: Vec::new(),
        }
    }

    /// Mark the notification skipped with the given cause.
    #[must_use]
    pub fn skipped(mut self, cause: impl Into<String>) -> Self {
        self.result = NotificationResult::Skipped;
        self.cause = Some(cause.into());
        self
    }

    /// Mark the notification failed with the given cause.
    #[must_use]
    pub fn failed(mut self, cause: impl Into<String>) -> Self {
        self.result = NotificationResult::Failed;
        self.cause = Some(cause.into());
        self
    }
}
