//! One-shot task command handler.

use std::collections::BTreeMap;
use std::sync::Arc;

use gramasathi_browser::BrowserManager;
use gramasathi_config::Config;
use gramasathi_engine::TaskRequest;
use tracing::info;

use crate::server::{browser_manager_config, build_orchestrator};

/// Parse a `--selectors` argument: a JSON object of field -> locator or null.
pub(crate) fn parse_selectors(
    raw: &str,
) -> Result<BTreeMap<String, Option<String>>, Box<dyn std::error::Error>> {
    let selectors: BTreeMap<String, Option<String>> = serde_json::from_str(raw)
        .map_err(|e| format!("--selectors must be a JSON object of strings: {}", e))?;
    Ok(selectors)
}

/// Handle the `task` command.
pub(crate) async fn handle_task_command(
    config: Config,
    user_id: String,
    title: String,
    form: String,
    selectors: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = TaskRequest::new(user_id, title, form);
    if let Some(raw) = selectors {
        request = request.with_selectors(parse_selectors(&raw)?);
    }

    let browser = Arc::new(BrowserManager::new(browser_manager_config(&config.browser)));
    let orchestrator = build_orchestrator(&config, browser.clone());

    let result = orchestrator.run(request).await;

    browser.shutdown().await;

    let report = result?;
    info!(
        "Task {} finished: {} of {} fields applied",
        report.task_id,
        report.applied_count(),
        report.field_outcomes.len()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
