use clap::Parser;
use std::path::PathBuf;

/// Command line interface for the application
#[derive(Parser)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Base directory where tasks are located, overrides the configuration file
    #[arg(long)]
    pub task_dir: Option<PathBuf>,

    /// Time in seconds to wait before looking for new tasks
    #[arg(long)]
    pub wait_time: Option<u64>,

    /// If set, the task runner will NOT monitor delete requests
    #[arg(long, default_value_t = false)]
    pub disable_delete: bool,

    /// Serve the REST API alongside the task runner
    #[arg(long, default_value_t = false)]
    pub api_enabled: bool,

    /// Port the REST API listens on, overrides the configuration file
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Sets the logging verbosity level for the application
    /// Possible values: "error", "warn", "info", "debug", "trace"
    /// Default: "info"
    #[arg(long, default_value_t = String::from("info"))]
    pub logging_level: String,
}
