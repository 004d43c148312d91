//! Selector resolution: registry, then caller, then heuristic scan.

use std::collections::{BTreeMap, HashMap};

use gramasathi_config::{default_registry, KeywordRule};
use tracing::{debug, warn};

use crate::model::{FormSource, SelectorMap, SelectorTier};
use crate::page::{ElementInfo, FormPage};

/// Generic submit locator used when no id-bearing submit control exists.
pub const SUBMIT_FALLBACK: &str = "button[type='submit'], input[type='submit']";

/// Input types never classified as data fields.
const SKIPPED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image"];

/// Statically configured selector maps keyed by exact form URL.
#[derive(Debug, Clone)]
pub struct FormRegistry {
    forms: HashMap<String, HashMap<String, String>>,
}

impl FormRegistry {
    pub fn new(forms: HashMap<String, HashMap<String, String>>) -> Self {
        Self { forms }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.forms.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<SelectorMap> {
        self.forms.get(key).map(|entries| {
            SelectorMap::from_entries(
                SelectorTier::Registry,
                entries.iter().map(|(k, v)| (k.clone(), v.clone())),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

/// Produces the field map for one task.
#[derive(Debug, Clone)]
pub struct SelectorResolver {
    registry: FormRegistry,
    keywords: Vec<KeywordRule>,
}

impl SelectorResolver {
    pub fn new(registry: FormRegistry, keywords: Vec<KeywordRule>) -> Self {
        Self { registry, keywords }
    }

    pub fn registry(&self) -> &FormRegistry {
        &self.registry
    }

    /// First non-empty tier wins; tiers are never merged.
    pub async fn resolve(
        &self,
        source: &FormSource,
        explicit: Option<&BTreeMap<String, Option<String>>>,
        page: &dyn FormPage,
    ) -> SelectorMap {
        if let Some(map) = source.registry_key().and_then(|key| self.registry.get(key)) {
            debug!("Using registry selectors for {:?}", source.registry_key());
            return map;
        }

        if let Some(explicit) = explicit.filter(|e| !e.is_empty()) {
            debug!("Using {} caller-supplied selectors", explicit.len());
            return SelectorMap::from_entries(
                SelectorTier::Caller,
                explicit.iter().map(|(k, v)| (k.clone(), v.clone())),
            );
        }

        let controls = match page.scan_controls().await {
            Ok(controls) => controls,
            Err(e) => {
                warn!("Form scan failed, continuing with submit fallback only: {}", e);
                Vec::new()
            }
        };
        let map = classify_controls(&controls, &self.keywords);
        debug!(
            "Heuristic selectors: {} fields from {} controls",
            map.fields().len(),
            controls.len()
        );
        map
    }
}

/// Keyword-classify scanned controls into a heuristic selector map.
pub fn classify_controls(controls: &[ElementInfo], keywords: &[KeywordRule]) -> SelectorMap {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    let mut submit: Option<String> = None;

    for control in controls {
        let input_type = control.effective_type();

        if input_type == "submit" && matches!(control.tag.as_str(), "input" | "button") {
            if submit.is_none() {
                submit = non_empty(&control.id).map(id_locator);
            }
            continue;
        }
        if control.tag == "button" || SKIPPED_INPUT_TYPES.contains(&input_type.as_str()) {
            continue;
        }

        let haystack = [&control.name, &control.id, &control.placeholder]
            .iter()
            .filter_map(|attr| attr.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let Some(rule) = keywords
            .iter()
            .find(|rule| haystack.contains(&rule.keyword.to_lowercase()))
        else {
            continue;
        };
        if fields.contains_key(&rule.field) {
            continue;
        }
        if let Some(locator) = element_locator(control) {
            fields.insert(rule.field.clone(), locator);
        }
    }

    let submit = submit.unwrap_or_else(|| SUBMIT_FALLBACK.to_string());
    SelectorMap::from_entries(
        SelectorTier::Heuristic,
        fields
            .into_iter()
            .chain(std::iter::once((crate::model::SUBMIT_KEY.to_string(), submit))),
    )
}

/// `#id` when the id is a plain CSS identifier, `tag[name="…"]` otherwise.
fn element_locator(control: &ElementInfo) -> Option<String> {
    if let Some(id) = non_empty(&control.id) {
        return Some(id_locator(id));
    }
    non_empty(&control.name)
        .map(|name| format!("{}[name=\"{}\"]", control.tag, escape_attr(name)))
}

fn id_locator(id: &str) -> String {
    let plain = id
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain {
        format!("#{}", id)
    } else {
        format!("[id=\"{}\"]", escape_attr(id))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Escape a value for a double-quoted CSS attribute selector.
pub(crate) fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
