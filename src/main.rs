//! Main entry point for the application.
//!
//! This module initializes logging, loads environment variables and configuration,
//! and starts the task runner that drives the filesystem backed task queue.
//!
//! The application serves two roles from one process:
//! - An optional REST API accepting task submissions, status queries and
//!   delete requests
//! - The task runner that claims submitted tasks and executes them through
//!   the configured pipeline command

mod api;
mod cli;
mod config;
mod constants;
mod core;
mod errors;
mod utils;

use clap::Parser;
use crate::core::{CommandExecutor, TaskRunner, TaskStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main entry point that initializes and runs the application.
///
/// # Initialization steps:
/// 1. Parse CLI arguments
/// 2. Initialize logging system
/// 3. Load environment variables
/// 4. Load configuration and apply CLI overrides
/// 5. Start API server if enabled
/// 6. Run the task runner until the process is stopped
#[tokio::main]
async fn main() {
    let cli = cli::Cli::try_parse().expect("Failed to parse CLI arguments");
    utils::init_logging(&cli.logging_level, cli.api_enabled);

    if let Err(e) = dotenvy::dotenv() {
        warn!("Failed to load .env file: {}", e);
    }

    let mut config = match &cli.config {
        Some(path) => config::load_config(path).expect("Failed to parse configuration"),
        None => {
            let task_dir = cli
                .task_dir
                .clone()
                .expect("--task-dir is required when no configuration file is given");
            config::Config::new(task_dir)
        }
    };
    if let Some(task_dir) = cli.task_dir {
        config.task_dir = task_dir;
    }
    if let Some(wait_time) = cli.wait_time {
        config.wait_time_secs = wait_time;
    }
    if cli.disable_delete {
        config.disable_delete = true;
    }
    if let Some(api_port) = cli.api_port {
        config.api_port = api_port;
    }

    if cli.api_enabled {
        info!("Starting API server on port {}", config.api_port);
        let store = Arc::new(TaskStore::new(config.clone()));
        let port = config.api_port;
        tokio::spawn(async move {
            if let Err(e) = api::server::launch_server(port, store).await {
                error!("Failed to start server: {}", e);
            }
        });
    }

    let executor = Arc::new(CommandExecutor::new(config.pipeline_command.clone()));
    let mut runner = TaskRunner::new(&config, executor);
    runner.run_tasks(|| true).await;
}
