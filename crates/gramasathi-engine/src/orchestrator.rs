//! Task orchestration: one task, one isolated context, a strict step sequence.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gramasathi_config::EngineConfig;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, TaskError};
use crate::injector::FieldInjector;
use crate::model::{
    FormSource, InjectionOutcome, Snapshots, Task, TaskReport, TaskStatus, UserRecord,
};
use crate::page::{ContextProvider, FormPage};
use crate::resolver::SelectorResolver;
use crate::snapshot::{SnapshotCapturer, SnapshotSink};
use crate::store::{collections, new_id, now_timestamp, DocumentStore, StatusLog, StoreError};
use crate::submission::SubmissionCoordinator;

/// Fixed, non-retrying waits used while driving a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineTimings {
    pub locator_timeout: Duration,
    pub keystroke_delay: Duration,
    pub navigation_timeout: Duration,
    pub dialog_timeout: Duration,
    pub settle: Duration,
    pub post_submit_settle: Duration,
}

impl Default for EngineTimings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for EngineTimings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            locator_timeout: Duration::from_millis(config.locator_timeout_ms),
            keystroke_delay: Duration::from_millis(config.keystroke_delay_ms),
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            dialog_timeout: Duration::from_millis(config.dialog_timeout_ms),
            settle: Duration::from_millis(config.settle_ms),
            post_submit_settle: Duration::from_millis(config.post_submit_settle_ms),
        }
    }
}

/// Arguments of one task invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskRequest {
    pub user_id: String,
    pub title: String,
    pub form_link: String,
    /// Caller-supplied field locators; `None` values are left unresolved.
    pub selectors: Option<BTreeMap<String, Option<String>>>,
}

impl TaskRequest {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        form_link: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            form_link: form_link.into(),
            selectors: None,
        }
    }

    pub fn with_selectors(mut self, selectors: BTreeMap<String, Option<String>>) -> Self {
        self.selectors = Some(selectors);
        self
    }

    fn validate(&self) -> Result<(), TaskError> {
        let missing = [&self.user_id, &self.title, &self.form_link]
            .iter()
            .any(|v| v.trim().is_empty());
        if missing {
            return Err(TaskError::Validation(
                "userId, title, formLink required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Runs form automation tasks end to end.
pub struct TaskOrchestrator {
    store: Arc<dyn DocumentStore>,
    contexts: Arc<dyn ContextProvider>,
    resolver: SelectorResolver,
    injector: FieldInjector,
    submitter: SubmissionCoordinator,
    capturer: SnapshotCapturer,
    post_submit_settle: Duration,
    forms_dir: PathBuf,
}

impl TaskOrchestrator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        contexts: Arc<dyn ContextProvider>,
        sink: Arc<dyn SnapshotSink>,
        resolver: SelectorResolver,
        timings: EngineTimings,
        forms_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            contexts,
            resolver,
            injector: FieldInjector::new(timings.locator_timeout, timings.keystroke_delay),
            submitter: SubmissionCoordinator::new(
                timings.navigation_timeout,
                timings.dialog_timeout,
                timings.settle,
            ),
            capturer: SnapshotCapturer::new(sink),
            post_submit_settle: timings.post_submit_settle,
            forms_dir,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Run one task. Validation and unknown users fail before any task is
    /// created; every later failure is persisted on the task first.
    pub async fn run(&self, request: TaskRequest) -> Result<TaskReport, TaskError> {
        request.validate()?;

        let user = match self.store.get(collections::USERS, &request.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) | Err(StoreError::InvalidKey(_)) => {
                return Err(TaskError::UserNotFound(request.user_id));
            }
            Err(e) => return Err(e.into()),
        };
        let record = UserRecord::from_document(&user);

        let task = Task::pending(
            new_id(),
            &request.user_id,
            &request.title,
            &request.form_link,
        );
        self.store
            .put(collections::TASKS, &task.id, task.to_document())
            .await?;
        StatusLog::record(
            self.store.as_ref(),
            collections::TASKS,
            &task.id,
            TaskStatus::Pending.as_str(),
        )
        .await;
        info!(task_id = %task.id, "Task created: {} -> {}", task.title, task.form_link);

        match self.execute(&task, &record, request.selectors.as_ref()).await {
            Ok(report) => {
                self.mark(&task.id, TaskStatus::Completed, json!({
                    "status": TaskStatus::Completed.as_str(),
                    "completedAt": now_timestamp(),
                }))
                .await;
                info!(
                    task_id = %task.id,
                    "Task completed: {}/{} fields applied, submission {:?}",
                    report.applied_count(),
                    report.field_outcomes.len(),
                    report.submission_outcome
                );
                Ok(report)
            }
            Err(e) => {
                error!(task_id = %task.id, "Task failed: {}", e);
                self.mark(&task.id, TaskStatus::Failed, json!({
                    "status": TaskStatus::Failed.as_str(),
                    "error": e.to_string(),
                    "failedAt": now_timestamp(),
                }))
                .await;
                Err(TaskError::Failed {
                    task_id: task.id,
                    source: e,
                })
            }
        }
    }

    /// Acquire a context, drive it, and release it on every path.
    async fn execute(
        &self,
        task: &Task,
        record: &UserRecord,
        selectors: Option<&BTreeMap<String, Option<String>>>,
    ) -> Result<TaskReport, EngineError> {
        let context = self.contexts.acquire().await?;
        let result = self.drive(task, record, selectors, context.page()).await;
        context.release().await;
        debug!(task_id = %task.id, "Browsing context released");
        result
    }

    async fn drive(
        &self,
        task: &Task,
        record: &UserRecord,
        selectors: Option<&BTreeMap<String, Option<String>>>,
        page: &dyn FormPage,
    ) -> Result<TaskReport, EngineError> {
        let source = FormSource::parse(&task.form_link, self.resolver.registry(), &self.forms_dir)?;
        let url = source.document_url()?;
        debug!(task_id = %task.id, "Navigating to {}", url);
        page.navigate(&url).await.map_err(|e| match e {
            EngineError::Navigation(_) => e,
            other => EngineError::Navigation(other.to_string()),
        })?;

        let selectors = self.resolver.resolve(&source, selectors, page).await;
        info!(
            task_id = %task.id,
            "Resolved {} field selectors ({} tier)",
            selectors.fields().len(),
            selectors.tier().as_str()
        );

        let mut field_outcomes: Vec<InjectionOutcome> = Vec::with_capacity(record.len());
        for (field, value) in record.iter() {
            let outcome = self
                .injector
                .inject(page, field, selectors.locator_for(field), value)
                .await;
            field_outcomes.push(outcome);
        }

        let before = self
            .capturer
            .capture_to(page, &format!("{}-before.pdf", task.id))
            .await?;

        let submission_outcome = self.submitter.submit(page, selectors.submit()).await;
        debug!(task_id = %task.id, "Submission outcome: {:?}", submission_outcome);

        tokio::time::sleep(self.post_submit_settle).await;

        let after = self
            .capturer
            .capture_to(page, &format!("{}-after.pdf", task.id))
            .await?;

        Ok(TaskReport {
            task_id: task.id.clone(),
            status: TaskStatus::Completed,
            snapshots: Snapshots { before, after },
            field_outcomes,
            submission_outcome,
            selector_tier: selectors.tier(),
        })
    }

    async fn mark(&self, task_id: &str, status: TaskStatus, patch: serde_json::Value) {
        if let Err(e) = self.store.update(collections::TASKS, task_id, patch).await {
            warn!(task_id, "Failed to persist {} status: {}", status.as_str(), e);
            return;
        }
        StatusLog::record(self.store.as_ref(), collections::TASKS, task_id, status.as_str()).await;
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
