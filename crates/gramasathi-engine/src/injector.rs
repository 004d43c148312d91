//! Widget-aware value injection.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::model::{FieldValue, InjectionOutcome};
use crate::page::{ElementHandle, ElementInfo, FormPage};
use crate::resolver::escape_attr;

/// Reason recorded for fields without a locator or a value.
pub const UNMAPPED_OR_EMPTY: &str = "unmapped or empty";

/// Input types typed into like plain text.
const TEXT_INPUT_TYPES: &[&str] = &["text", "email", "tel", "search", "url", "number", "password"];

/// How a field is driven, decided from the element and the value shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Text,
    TextArea,
    Select,
    CheckboxGroup,
    CheckboxBool,
    Radio,
    Unsupported,
}

impl WidgetKind {
    pub fn classify(info: &ElementInfo, value: &FieldValue) -> Self {
        match info.tag.as_str() {
            "textarea" => WidgetKind::TextArea,
            "select" => WidgetKind::Select,
            "input" => {
                let input_type = info.effective_type();
                match (input_type.as_str(), value) {
                    (t, _) if TEXT_INPUT_TYPES.contains(&t) => WidgetKind::Text,
                    ("checkbox", FieldValue::List(_)) => WidgetKind::CheckboxGroup,
                    ("checkbox", FieldValue::Bool(_)) => WidgetKind::CheckboxBool,
                    ("radio", FieldValue::Text(_)) => WidgetKind::Radio,
                    _ => WidgetKind::Unsupported,
                }
            }
            _ => WidgetKind::Unsupported,
        }
    }
}

/// Locator for every `input[type=<input_type>]` sharing a `name`.
pub fn group_locator(input_type: &str, name: &str) -> String {
    format!("input[type=\"{}\"][name=\"{}\"]", input_type, escape_attr(name))
}

/// Sets one field at a time on a loaded page.
#[derive(Debug, Clone)]
pub struct FieldInjector {
    locator_timeout: Duration,
    keystroke_delay: Duration,
}

impl FieldInjector {
    pub fn new(locator_timeout: Duration, keystroke_delay: Duration) -> Self {
        Self {
            locator_timeout,
            keystroke_delay,
        }
    }

    /// Inject `value` through `locator`. Never fails: every problem becomes a
    /// not-applied outcome.
    pub async fn inject(
        &self,
        page: &dyn FormPage,
        field: &str,
        locator: Option<&str>,
        value: Option<&FieldValue>,
    ) -> InjectionOutcome {
        let (Some(locator), Some(value)) = (locator, value.filter(|v| !v.is_empty())) else {
            debug!(field, "Skipping field: {}", UNMAPPED_OR_EMPTY);
            return InjectionOutcome::not_applied(field, UNMAPPED_OR_EMPTY);
        };

        match self.apply(page, field, locator, value).await {
            Ok(outcome) => {
                if outcome.applied {
                    debug!(field, locator, "Field injected");
                } else {
                    warn!(field, locator, "Field not applied: {}", outcome.reason.as_deref().unwrap_or(""));
                }
                outcome
            }
            Err(e) => {
                warn!(field, locator, "Field injection failed: {}", e);
                InjectionOutcome::not_applied(field, e.to_string()).with_locator(locator)
            }
        }
    }

    async fn apply(
        &self,
        page: &dyn FormPage,
        field: &str,
        locator: &str,
        value: &FieldValue,
    ) -> Result<InjectionOutcome, EngineError> {
        let Some(element) = page.wait_for(locator, self.locator_timeout).await? else {
            return Ok(InjectionOutcome::not_applied(
                field,
                format!(
                    "locator {} not found within {} ms",
                    locator,
                    self.locator_timeout.as_millis()
                ),
            )
            .with_locator(locator));
        };

        let info = page.inspect(&element).await?;
        let kind = WidgetKind::classify(&info, value);
        let not_applied = |reason: String| {
            InjectionOutcome::not_applied(field, reason)
                .with_locator(locator)
                .with_widget(kind)
        };

        match kind {
            WidgetKind::Text | WidgetKind::TextArea => {
                page.clear(&element).await?;
                page.type_text(&element, &value.as_text(), self.keystroke_delay)
                    .await?;
            }
            WidgetKind::Select => {
                let wanted = value.as_text();
                if !page.select_option(&element, &wanted).await? {
                    return Ok(not_applied(format!("no option with value \"{}\"", wanted)));
                }
            }
            WidgetKind::CheckboxGroup => {
                let group = group_of(&info, "checkbox", locator);
                let wanted = wanted_values(value);
                let unmatched = click_matching(page, &group, &wanted).await?;
                if unmatched.len() == wanted.len() {
                    return Ok(not_applied(format!("no checkbox matched {}", unmatched.join(", ")))
                        .with_unmatched(unmatched));
                }
                return Ok(InjectionOutcome::applied(field, locator, kind).with_unmatched(unmatched));
            }
            WidgetKind::CheckboxBool => {
                let desired = matches!(value, FieldValue::Bool(true));
                if page.is_checked(&element).await? != desired {
                    page.click(&element).await?;
                }
            }
            WidgetKind::Radio => {
                let wanted = value.as_text();
                let group = group_of(&info, "radio", locator);
                let unmatched = click_matching(page, &group, std::slice::from_ref(&wanted)).await?;
                if !unmatched.is_empty() {
                    return Ok(not_applied(format!("no radio option with value \"{}\"", wanted)));
                }
            }
            WidgetKind::Unsupported => {
                return Ok(not_applied("unsupported widget kind".to_string()));
            }
        }

        Ok(InjectionOutcome::applied(field, locator, kind))
    }
}

/// The named group the element belongs to, or the locator itself when unnamed.
fn group_of(info: &ElementInfo, input_type: &str, locator: &str) -> String {
    match info.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => group_locator(input_type, name),
        None => locator.to_string(),
    }
}

/// Distinct wanted values in order.
fn wanted_values(value: &FieldValue) -> Vec<String> {
    let raw = match value {
        FieldValue::List(items) => items.clone(),
        other => vec![other.as_text()],
    };
    let mut seen = Vec::with_capacity(raw.len());
    for item in raw {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

/// Click the first control in `group` whose value equals each wanted value.
/// Returns the values with no matching control.
async fn click_matching(
    page: &dyn FormPage,
    group: &str,
    wanted: &[String],
) -> Result<Vec<String>, EngineError> {
    let mut controls: Vec<(ElementHandle, Option<String>)> = Vec::new();
    for handle in page.query_all(group).await? {
        let info = page.inspect(&handle).await?;
        controls.push((handle, info.value));
    }

    let mut unmatched = Vec::new();
    for value in wanted {
        match controls.iter().find(|(_, v)| v.as_deref() == Some(value.as_str())) {
            Some((handle, _)) => page.click(handle).await?,
            None => unmatched.push(value.clone()),
        }
    }
    Ok(unmatched)
}

#[cfg(test)]
#[path = "injector_tests.rs"]
mod tests;
