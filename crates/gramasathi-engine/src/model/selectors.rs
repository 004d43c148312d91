//! Semantic field to DOM locator mapping.

use std::collections::BTreeMap;

use serde::Serialize;

/// Reserved key holding the submission control locator.
pub const SUBMIT_KEY: &str = "submit";

/// Which resolution tier produced a [`SelectorMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorTier {
    Registry,
    Caller,
    Heuristic,
}

impl SelectorTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorTier::Registry => "registry",
            SelectorTier::Caller => "caller",
            SelectorTier::Heuristic => "heuristic",
        }
    }
}

/// Field locators for one task. Built once, immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorMap {
    tier: SelectorTier,
    fields: BTreeMap<String, String>,
    submit: Option<String>,
}

impl SelectorMap {
    /// Build from raw entries. The `submit` key becomes the submit locator;
    /// `None` and empty locators are left unresolved.
    pub fn from_entries<K, V, I>(tier: SelectorTier, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Option<String>>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut fields = BTreeMap::new();
        let mut submit = None;

        for (key, locator) in entries {
            let key = key.into();
            let Some(locator) = locator.into().filter(|l| !l.trim().is_empty()) else {
                continue;
            };
            if key == SUBMIT_KEY {
                submit = Some(locator);
            } else {
                fields.insert(key, locator);
            }
        }

        Self { tier, fields, submit }
    }

    /// Locator for a record field: exact name, then lowercase, then `<name>Input`.
    pub fn locator_for(&self, field: &str) -> Option<&str> {
        if field == SUBMIT_KEY {
            return None;
        }
        self.fields
            .get(field)
            .or_else(|| self.fields.get(&field.to_lowercase()))
            .or_else(|| self.fields.get(&format!("{}Input", field)))
            .map(String::as_str)
    }

    pub fn submit(&self) -> Option<&str> {
        self.submit.as_deref()
    }

    pub fn tier(&self) -> SelectorTier {
        self.tier
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// True when neither a field nor a submit locator is present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.submit.is_none()
    }
}
