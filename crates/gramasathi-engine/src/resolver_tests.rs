use std::collections::BTreeMap;
use std::path::Path;

use gramasathi_config::default_keywords;

use super::*;
use crate::testing::{FakeElement, FakePage};

const SCHEME_X: &str = "https://gov-portal.com/schemeX";

fn resolver() -> SelectorResolver {
    SelectorResolver::new(FormRegistry::default(), default_keywords())
}

fn source(raw: &str) -> FormSource {
    FormSource::parse(raw, &FormRegistry::default(), Path::new("/srv/forms")).unwrap()
}

fn control(tag: &str, input_type: Option<&str>, id: Option<&str>, name: Option<&str>) -> ElementInfo {
    ElementInfo {
        tag: tag.into(),
        input_type: input_type.map(str::to_string),
        id: id.map(str::to_string),
        name: name.map(str::to_string),
        ..Default::default()
    }
}

fn explicit(pairs: &[(&str, Option<&str>)]) -> BTreeMap<String, Option<String>> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
        .collect()
}

/// A page with unrelated controls that heuristics would pick up.
fn scannable_page() -> FakePage {
    let page = FakePage::new();
    page.add(&[], FakeElement::input("text").id("applicant_name"));
    page.add(&[], FakeElement::input("email").id("contact_mail"));
    page.add(&[], FakeElement::input("submit").id("go"));
    page
}

// ============================================================================
// Tier precedence
// ============================================================================

#[tokio::test]
async fn test_registry_wins_over_caller_selectors() {
    let page = scannable_page();
    let caller = explicit(&[("name", Some("#other"))]);

    let map = resolver().resolve(&source(SCHEME_X), Some(&caller), &page).await;

    assert_eq!(map.tier(), SelectorTier::Registry);
    assert_eq!(map.locator_for("name"), Some("#fullName"));
    assert_eq!(map.locator_for("phone"), Some("#phoneInput"));
    assert_eq!(map.submit(), Some("#submitBtn"));
}

#[tokio::test]
async fn test_caller_selectors_used_verbatim() {
    let page = scannable_page();
    let caller = explicit(&[
        ("name", Some("#n")),
        ("email", None),
        ("submit", Some("#s")),
    ]);

    let map = resolver()
        .resolve(&source("https://example.org/form"), Some(&caller), &page)
        .await;

    assert_eq!(map.tier(), SelectorTier::Caller);
    assert_eq!(map.locator_for("name"), Some("#n"));
    assert_eq!(map.locator_for("email"), None);
    assert_eq!(map.submit(), Some("#s"));
    assert_eq!(map.fields().len(), 1);
}

#[tokio::test]
async fn test_empty_caller_map_falls_through_to_heuristics() {
    let page = scannable_page();
    let caller = BTreeMap::new();

    let map = resolver()
        .resolve(&source("https://example.org/form"), Some(&caller), &page)
        .await;

    assert_eq!(map.tier(), SelectorTier::Heuristic);
    assert_eq!(map.locator_for("name"), Some("#applicant_name"));
    assert_eq!(map.locator_for("email"), Some("#contact_mail"));
    assert_eq!(map.submit(), Some("#go"));
}

#[tokio::test]
async fn test_placeholder_alone_classifies_controls() {
    let page = FakePage::new();
    page.add(&[], FakeElement::tag("textarea").id("t1").placeholder("Describe your complaint"));
    page.add(&[], FakeElement::input("tel").id("f2").placeholder("Mobile number"));

    let map = resolver()
        .resolve(&source("https://example.org/form"), None, &page)
        .await;

    assert_eq!(map.tier(), SelectorTier::Heuristic);
    assert_eq!(map.locator_for("complaint"), Some("#t1"));
    assert_eq!(map.locator_for("phone"), Some("#f2"));
    assert_eq!(map.submit(), Some(SUBMIT_FALLBACK));
}

#[tokio::test]
async fn test_scan_failure_leaves_only_submit_fallback() {
    let page = scannable_page();
    page.fail_scan();

    let map = resolver().resolve(&source("local.html"), None, &page).await;

    assert_eq!(map.tier(), SelectorTier::Heuristic);
    assert!(map.fields().is_empty());
    assert_eq!(map.submit(), Some(SUBMIT_FALLBACK));
}

// ============================================================================
// Heuristic classification
// ============================================================================

#[test]
fn test_keywords_match_name_id_and_placeholder() {
    let mut by_placeholder = control("textarea", None, None, Some("body"));
    by_placeholder.placeholder = Some("Describe the COMPLAINT".into());

    let controls = vec![
        control("input", Some("text"), Some("fullName"), None),
        control("input", Some("tel"), None, Some("mobile_no")),
        by_placeholder,
        control("input", Some("text"), Some("pin"), None),
    ];

    let map = classify_controls(&controls, &default_keywords());

    assert_eq!(map.locator_for("name"), Some("#fullName"));
    assert_eq!(map.locator_for("phone"), Some("input[name=\"mobile_no\"]"));
    assert_eq!(map.locator_for("complaint"), Some("textarea[name=\"body\"]"));
    assert_eq!(map.fields().len(), 3);
}

#[test]
fn test_first_match_per_field_wins() {
    let controls = vec![
        control("input", Some("text"), Some("first_name"), None),
        control("input", Some("text"), Some("last_name"), None),
    ];

    let map = classify_controls(&controls, &default_keywords());
    assert_eq!(map.locator_for("name"), Some("#first_name"));
}

#[test]
fn test_rule_order_decides_ambiguous_controls() {
    // "username_mail" contains both "name" and "mail"; "name" is listed first.
    let controls = vec![control("input", Some("text"), Some("username_mail"), None)];

    let map = classify_controls(&controls, &default_keywords());
    assert_eq!(map.locator_for("name"), Some("#username_mail"));
    assert_eq!(map.locator_for("email"), None);
}

#[test]
fn test_non_data_controls_are_skipped() {
    let controls = vec![
        control("input", Some("hidden"), Some("name_token"), None),
        control("input", Some("button"), Some("name_btn"), None),
        control("input", Some("RESET"), Some("name_reset"), None),
        control("button", Some("button"), Some("mail_me"), None),
    ];

    let map = classify_controls(&controls, &default_keywords());
    assert!(map.fields().is_empty());
}

#[test]
fn test_submit_prefers_first_identified_control() {
    let controls = vec![
        control("button", Some("submit"), None, Some("anon")),
        control("input", Some("submit"), Some("send"), None),
        control("button", Some("submit"), Some("later"), None),
    ];

    let map = classify_controls(&controls, &default_keywords());
    assert_eq!(map.submit(), Some("#send"));
}

#[test]
fn test_submit_falls_back_without_ids() {
    let controls = vec![control("button", Some("submit"), None, None)];

    let map = classify_controls(&controls, &default_keywords());
    assert_eq!(map.submit(), Some(SUBMIT_FALLBACK));
}

#[test]
fn test_unusual_ids_are_attribute_quoted() {
    let controls = vec![
        control("input", Some("text"), Some("1name"), None),
        control("input", Some("email"), Some("e.mail"), None),
    ];

    let map = classify_controls(&controls, &default_keywords());
    assert_eq!(map.locator_for("name"), Some("[id=\"1name\"]"));
    assert_eq!(map.locator_for("email"), Some("[id=\"e.mail\"]"));
}

#[test]
fn test_controls_without_id_or_name_are_unresolvable() {
    let mut anonymous = control("input", Some("text"), None, None);
    anonymous.placeholder = Some("Your name".into());

    let map = classify_controls(&[anonymous], &default_keywords());
    assert!(map.fields().is_empty());
}

#[test]
fn test_escape_attr() {
    assert_eq!(escape_attr(r#"a"b\c"#), r#"a\"b\\c"#);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_lookup_is_exact() {
    let registry = FormRegistry::default();
    assert_eq!(registry.len(), 2);
    assert!(registry.contains(SCHEME_X));
    assert!(!registry.contains("https://gov-portal.com/schemex"));
    assert!(registry.get("https://unknown.example").is_none());

    let ngo = registry.get("https://ngo-form.org/report").unwrap();
    assert_eq!(ngo.tier(), SelectorTier::Registry);
    assert_eq!(ngo.locator_for("complaint"), Some("textarea[name='description']"));
    assert_eq!(ngo.locator_for("phone"), None);
}
