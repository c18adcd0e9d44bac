// ABOUTME: Configuration management for envplate application
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub partials_dir: Option<PathBuf>,

    #[serde(default)]
    pub strict_mode: bool,

    #[serde(default)]
    pub template_vars: HashMap<String, JsonValue>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file()?,
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.merge_env()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Result<PathBuf> {
        let possible_paths = vec![
            PathBuf::from("envplate.yaml"),
            PathBuf::from("envplate.yml"),
            PathBuf::from(".envplate.yaml"),
            PathBuf::from(".envplate.yml"),
        ];

        // Check current directory
        for path in possible_paths {
            if path.exists() {
                return Ok(path);
            }
        }

        // Check home directory
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".envplate").join("config.yaml");
            if home_config.exists() {
                return Ok(home_config);
            }
        }

        // Return default path (may not exist)
        Ok(PathBuf::from("envplate.yaml"))
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("ENVPLATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ENVPLATE_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(dir) = std::env::var("ENVPLATE_PARTIALS_DIR") {
            self.partials_dir = Some(PathBuf::from(dir));
        }
        if let Ok(strict) = std::env::var("ENVPLATE_STRICT") {
            self.strict_mode = strict.parse()?;
        }

        Ok(())
    }

    /// Merge command line variables into template variables
    ///
    /// Command line values stay strings; typed values come from the config file.
    pub fn merge_variables(&mut self, vars: HashMap<String, String>) {
        self.template_vars.extend(
            vars.into_iter()
                .map(|(key, value)| (key, JsonValue::String(value))),
        );
    }
}
