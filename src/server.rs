//! Server initialization and startup logic for GramaSathi.

use std::sync::Arc;

use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gramasathi_api::{ApiConfig, ApiServer, AppState};
use gramasathi_browser::{BrowserManager, BrowserManagerConfig};
use gramasathi_config::{gramasathi_dir, BrowserConfig, Config};
use gramasathi_engine::{
    BrowserContextProvider, DocumentStore, EngineTimings, FileDocumentStore, FileSnapshotSink,
    FormRegistry, MemoryDocumentStore, SelectorResolver, TaskOrchestrator,
};

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.gramasathi/logs/ with daily rotation.
pub(crate) fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = gramasathi_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("gramasathi")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The worker flushes only while its guard is alive.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

pub(crate) fn browser_manager_config(config: &BrowserConfig) -> BrowserManagerConfig {
    BrowserManagerConfig {
        debug_port: config.debug_port,
        viewport_width: config.viewport_width,
        viewport_height: config.viewport_height,
        profile_dir: config.profile_dir.clone(),
        chrome_path: config.chrome_path.clone(),
        headless: config.headless,
        max_contexts: config.max_contexts,
        acquire_timeout: std::time::Duration::from_secs(config.acquire_timeout_secs),
    }
}

pub(crate) fn build_store(config: &Config) -> Arc<dyn DocumentStore> {
    match config.storage.backend.as_str() {
        "memory" => Arc::new(MemoryDocumentStore::new()),
        _ => Arc::new(FileDocumentStore::new(config.storage.data_dir())),
    }
}

/// Wire the store, browser pool, snapshot sink and resolver into an orchestrator.
pub(crate) fn build_orchestrator(
    config: &Config,
    browser: Arc<BrowserManager>,
) -> TaskOrchestrator {
    let resolver = SelectorResolver::new(
        FormRegistry::new(config.registry.clone()),
        config.heuristics.keywords.clone(),
    );

    TaskOrchestrator::new(
        build_store(config),
        Arc::new(BrowserContextProvider::new(browser)),
        Arc::new(FileSnapshotSink::new(config.storage.snapshot_dir())),
        resolver,
        EngineTimings::from(&config.engine),
        config.engine.forms_dir(),
    )
}

/// Run the API server in foreground until Ctrl+C.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting GramaSathi server...");
    info!("Storage backend: {}", config.storage.backend);

    let snapshot_dir = config.storage.snapshot_dir();
    tokio::fs::create_dir_all(&snapshot_dir).await?;
    info!("Serving snapshots from {}", snapshot_dir.display());

    let browser = Arc::new(BrowserManager::new(browser_manager_config(&config.browser)));
    let orchestrator = Arc::new(build_orchestrator(&config, browser.clone()));
    let state = Arc::new(AppState::new(orchestrator, snapshot_dir));

    let server = ApiServer::new(ApiConfig::from(&config.server), state);
    info!("API listening on http://{}", server.addr());

    let result = server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            info!("Shutdown signal received");
        })
        .await;

    browser.shutdown().await;
    info!("GramaSathi server stopped");

    result
}
