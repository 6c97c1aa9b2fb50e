use super::Config;
use std::error::Error;
use std::fs;

use tracing::info;

/// Loads and parses the service configuration from a YAML file
///
/// # Arguments
///
/// * `file_path` - Path to the YAML configuration file
///
/// # Returns
///
/// * `Result<Config, Box<dyn Error>>` - The parsed Config on success, or an error if loading/parsing fails
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read
/// * The YAML content cannot be parsed into a Config
pub fn load_config(file_path: &str) -> Result<Config, Box<dyn Error>> {
    let yaml_str = fs::read_to_string(file_path)?;
    let config: Config = serde_yaml::from_str(&yaml_str)?;
    info!("Task directory set to: {}", config.task_dir.display());
    Ok(config)
}
