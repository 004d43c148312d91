//! Form resolution configuration: heuristic keywords and the known-form registry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single heuristic rule: controls whose `name`/`id`/`placeholder`
/// contain `keyword` are bound to `field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub field: String,
}

impl KeywordRule {
    pub fn new(keyword: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            field: field.into(),
        }
    }
}

/// Heuristic selector detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicsConfig {
    /// Ordered keyword table; the first matching rule wins.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<KeywordRule>,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
        }
    }
}

pub fn default_keywords() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new("name", "name"),
        KeywordRule::new("mail", "email"),
        KeywordRule::new("phone", "phone"),
        KeywordRule::new("mobile", "phone"),
        KeywordRule::new("address", "address"),
        KeywordRule::new("complaint", "complaint"),
        KeywordRule::new("desc", "complaint"),
    ]
}

pub fn default_registry() -> HashMap<String, HashMap<String, String>> {
    let scheme_x = [
        ("name", "#fullName"),
        ("email", "#emailField"),
        ("phone", "#phoneInput"),
        ("address", "#addr"),
        ("complaint", "#details"),
        ("submit", "#submitBtn"),
    ];
    let ngo_report = [
        ("name", "input[name='user_name']"),
        ("email", "input[name='user_email']"),
        ("complaint", "textarea[name='description']"),
        ("submit", "button[type='submit']"),
    ];

    let to_map = |pairs: &[(&str, &str)]| {
        pairs
            .iter()
            .map(|(field, locator)| (field.to_string(), locator.to_string()))
            .collect::<HashMap<_, _>>()
    };

    HashMap::from([
        ("https://gov-portal.com/schemeX".to_string(), to_map(&scheme_x)),
        ("https://ngo-form.org/report".to_string(), to_map(&ngo_report)),
    ])
}
