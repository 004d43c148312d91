//! Seed command handler.

use std::sync::Arc;

use gramasathi_config::Config;
use gramasathi_engine::{collections, new_id, now_timestamp, DocumentStore, StatusLog};
use serde_json::json;
use tracing::info;

use crate::server::build_store;

/// Ids of the seeded documents.
#[derive(Debug)]
pub(crate) struct SeededIds {
    pub user: String,
    pub task: String,
    pub message: String,
}

/// Insert one sample user, one pending task owned by it, and one message.
pub(crate) async fn seed(
    store: Arc<dyn DocumentStore>,
) -> Result<SeededIds, Box<dyn std::error::Error>> {
    let user = store
        .create(
            collections::USERS,
            json!({
                "name": "Fazal Rahman",
                "email": "fazal@example.com",
                "role": "user",
                "createdAt": now_timestamp(),
            }),
        )
        .await?;

    let task = new_id();
    store
        .put(
            collections::TASKS,
            &task,
            json!({
                "userId": user,
                "title": "Drainage issue complaint",
                "caseId": "CASE001",
                "status": "pending",
                "createdAt": now_timestamp(),
            }),
        )
        .await?;
    StatusLog::record(store.as_ref(), collections::TASKS, &task, "pending").await;

    let message = store
        .create(
            collections::MESSAGES,
            json!({
                "senderId": user,
                "receiverId": "system",
                "content": "I want to apply for old-age pension",
                "type": "text",
                "caseId": "CASE001",
                "timestamp": now_timestamp(),
                "status": "new",
            }),
        )
        .await?;

    info!("Seeded user={} task={} message={}", user, task, message);
    Ok(SeededIds {
        user,
        task,
        message,
    })
}

/// Handle the `seed` command.
pub(crate) async fn handle_seed_command(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let ids = seed(build_store(&config)).await?;
    println!("User:    {}", ids.user);
    println!("Task:    {}", ids.task);
    println!("Message: {}", ids.message);
    Ok(())
}
