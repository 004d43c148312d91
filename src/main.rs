//! GramaSathi - civic-complaint form automation service.

mod cli;
mod cmd_seed;
mod cmd_task;
mod server;

use clap::Parser;
use tracing::{info, warn};

use gramasathi_config::{ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    server::init_tracing()?;

    let mut config = ConfigLoader::load_or_default(&cli.config)?;
    for warning in ConfigValidator::validate(&config).into_result()? {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Some(Commands::Run { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::run_server(config).await
        }
        Some(Commands::Task {
            user_id,
            title,
            form,
            selectors,
        }) => cmd_task::handle_task_command(config, user_id, title, form, selectors).await,
        Some(Commands::Seed) => cmd_seed::handle_seed_command(config).await,
        None => server::run_server(config).await,
    }
}
