mod parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use parser::load_config;

/// Main configuration structure for the service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Base directory holding the task state directories
    pub task_dir: PathBuf,
    /// Seconds the task runner waits before looking for new tasks again
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u64,
    /// Number of attempts made while polling for a finished task
    #[serde(default = "default_wait_count")]
    pub wait_count: u32,
    /// Seconds slept between attempts while polling for a finished task
    #[serde(default = "default_sleep_time_secs")]
    pub sleep_time_secs: u64,
    /// When true the task runner does not monitor delete requests
    #[serde(default)]
    pub disable_delete: bool,
    /// Port the REST API listens on
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Command line invoked to execute a task; it runs with the task's
    /// directory as working directory and receives the task document on
    /// standard input
    #[serde(default)]
    pub pipeline_command: Vec<String>,
}

impl Config {
    /// Creates a configuration rooted at the given task directory with
    /// defaults for everything else
    pub fn new(task_dir: impl Into<PathBuf>) -> Self {
        Self {
            task_dir: task_dir.into(),
            wait_time_secs: default_wait_time_secs(),
            wait_count: default_wait_count(),
            sleep_time_secs: default_sleep_time_secs(),
            disable_delete: false,
            api_port: default_api_port(),
            pipeline_command: Vec::new(),
        }
    }
}

fn default_wait_time_secs() -> u64 {
    30
}

fn default_wait_count() -> u32 {
    60
}

fn default_sleep_time_secs() -> u64 {
    10
}

fn default_api_port() -> u16 {
    3000
}
