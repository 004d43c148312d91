//! Submission: click the submit control and race the page's reaction.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::SubmissionOutcome;
use crate::page::{FormPage, PageSignal, SignalWatch};

/// Clicks submit and waits for the first of: a native dialog, a navigation,
/// or the settle delay.
///
/// An expired dialog wait stops listening and leaves the race to the others;
/// an expired navigation wait ends it.
#[derive(Debug, Clone)]
pub struct SubmissionCoordinator {
    navigation_timeout: Duration,
    dialog_timeout: Duration,
    settle: Duration,
}

impl SubmissionCoordinator {
    pub fn new(navigation_timeout: Duration, dialog_timeout: Duration, settle: Duration) -> Self {
        Self {
            navigation_timeout,
            dialog_timeout,
            settle,
        }
    }

    /// Upper bound on how long [`submit`](Self::submit) can take once the
    /// submit control has been found.
    pub fn max_duration(&self) -> Duration {
        self.settle
            .max(self.navigation_timeout)
            .max(self.dialog_timeout)
    }

    /// Submit the form. Never fails: problems become [`SubmissionOutcome::Skipped`].
    pub async fn submit(&self, page: &dyn FormPage, locator: Option<&str>) -> SubmissionOutcome {
        let Some(locator) = locator else {
            debug!("No submit locator resolved");
            return SubmissionOutcome::skipped("no submit locator");
        };

        let element = match page.query_all(locator).await {
            Ok(mut matches) if !matches.is_empty() => matches.swap_remove(0),
            Ok(_) => {
                warn!(locator, "Submit control not found");
                return SubmissionOutcome::skipped(format!(
                    "click failed: no element matches {}",
                    locator
                ));
            }
            Err(e) => {
                warn!(locator, "Submit lookup failed: {}", e);
                return SubmissionOutcome::skipped(format!("click failed: {}", e));
            }
        };

        // Listeners are armed before the click so an immediate reaction is seen.
        let dialog = page.watch(PageSignal::Dialog);
        let navigation = page.watch(PageSignal::Navigation);

        let dialog = async {
            match first_signal(dialog, self.dialog_timeout).await {
                Some(params) => {
                    let message = params
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    if let Err(e) = page.dismiss_dialog().await {
                        warn!("Failed to dismiss dialog: {}", e);
                    }
                    info!("Submission opened a dialog: {:?}", message);
                    SubmissionOutcome::DialogDismissed { message }
                }
                None => {
                    debug!("No dialog within {:?}", self.dialog_timeout);
                    std::future::pending().await
                }
            }
        };
        let navigation = async {
            match first_signal(navigation, self.navigation_timeout).await {
                Some(_) => {
                    info!("Submission navigated");
                    SubmissionOutcome::Navigated
                }
                None => SubmissionOutcome::TimedOutNoSignal,
            }
        };
        let click = page.click(&element);
        let settle = tokio::time::sleep(self.settle);

        tokio::pin!(dialog, navigation, click, settle);
        let mut clicked = false;

        loop {
            tokio::select! {
                biased;
                outcome = &mut dialog => return outcome,
                outcome = &mut navigation => return outcome,
                result = &mut click, if !clicked => {
                    clicked = true;
                    if let Err(e) = result {
                        warn!(locator, "Submit click failed: {}", e);
                        return SubmissionOutcome::skipped(format!("click failed: {}", e));
                    }
                    debug!(locator, "Submit clicked");
                }
                _ = &mut settle => {
                    debug!("No dialog or navigation within {:?}", self.settle);
                    return SubmissionOutcome::TimedOutNoSignal;
                }
            }
        }
    }
}

/// Payload of `watch` if it fires within `limit`. Never resolves when the page
/// drops the watch, so the other branches decide.
async fn first_signal(watch: SignalWatch, limit: Duration) -> Option<Value> {
    match tokio::time::timeout(limit, watch).await {
        Ok(Some(params)) => Some(params),
        Ok(None) => std::future::pending().await,
        Err(_) => None,
    }
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
