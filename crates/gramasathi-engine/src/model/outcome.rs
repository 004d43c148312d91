//! Per-field, submission and task results.

use serde::Serialize;

use crate::injector::WidgetKind;

use super::selectors::SelectorTier;
use super::task::TaskStatus;

/// Result of injecting one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionOutcome {
    pub field: String,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<WidgetKind>,
    /// Checkbox values for which no control existed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmatched: Vec<String>,
}

impl InjectionOutcome {
    pub fn applied(field: impl Into<String>, locator: impl Into<String>, widget: WidgetKind) -> Self {
        Self {
            field: field.into(),
            applied: true,
            reason: None,
            locator: Some(locator.into()),
            widget: Some(widget),
            unmatched: Vec::new(),
        }
    }

    pub fn not_applied(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            applied: false,
            reason: Some(reason.into()),
            locator: None,
            widget: None,
            unmatched: Vec::new(),
        }
    }

    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    pub fn with_widget(mut self, widget: WidgetKind) -> Self {
        self.widget = Some(widget);
        self
    }

    pub fn with_unmatched(mut self, unmatched: Vec<String>) -> Self {
        self.unmatched = unmatched;
        self
    }
}

/// How a submission attempt ended. Always terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SubmissionOutcome {
    /// The page loaded a new document.
    Navigated,
    /// A native dialog opened and was dismissed.
    DialogDismissed {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Nothing observable happened before the settle delay.
    TimedOutNoSignal,
    /// Submission was not attempted or the click failed.
    Skipped { reason: String },
}

impl SubmissionOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        SubmissionOutcome::Skipped {
            reason: reason.into(),
        }
    }
}

/// Addressable snapshot identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshots {
    pub before: String,
    pub after: String,
}

/// Result payload of a completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub task_id: String,
    pub status: TaskStatus,
    pub snapshots: Snapshots,
    pub field_outcomes: Vec<InjectionOutcome>,
    pub submission_outcome: SubmissionOutcome,
    pub selector_tier: SelectorTier,
}

impl TaskReport {
    /// Number of fields actually applied.
    pub fn applied_count(&self) -> usize {
        self.field_outcomes.iter().filter(|o| o.applied).count()
    }
}
