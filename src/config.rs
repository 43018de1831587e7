// Configuration module for codegraph
// Reads from environment variables with sensible defaults

use std::env;
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum source file size in megabytes (CODEGRAPH_MAX_FILE_SIZE_MB)
    pub max_file_size_mb: u64,

    /// Directory under the scanned root for the graph artifact (CODEGRAPH_ARTIFACT_DIR)
    pub artifact_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
            artifact_dir: ".codegraph".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(val) = env::var("CODEGRAPH_MAX_FILE_SIZE_MB") {
            if let Ok(parsed) = val.parse() {
                config.max_file_size_mb = parsed;
            } else {
                eprintln!(
                    "codegraph: Warning: Invalid CODEGRAPH_MAX_FILE_SIZE_MB value: {}, using default: {}",
                    val, config.max_file_size_mb
                );
            }
        }

        if let Ok(val) = env::var("CODEGRAPH_ARTIFACT_DIR") {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                config.artifact_dir = trimmed.to_string();
            } else {
                eprintln!(
                    "codegraph: Warning: Empty CODEGRAPH_ARTIFACT_DIR value, using default: {}",
                    config.artifact_dir
                );
            }
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}
