use crate::domain::model::LayoutConfig;
use crate::utils::error::{FamilyTreeError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub layout: LayoutConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub records_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl TomlConfig {
    /// Loads a config file, substituting `${VAR}` from the environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FamilyTreeError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FamilyTreeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FamilyTreeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn records_path(&self) -> Option<&str> {
        self.store.as_ref().map(|s| s.records_path.as_str())
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for LayoutConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_positive("layout.box_size", self.box_size)?;
        validation::validate_non_negative("layout.gap", self.gap)?;
        validation::validate_non_negative("layout.row_gap", self.row_gap)?;
        validation::validate_non_negative("layout.label_height", self.label_height)?;
        validation::validate_non_negative("layout.origin_x", self.origin_x)?;
        validation::validate_non_negative("layout.origin_y", self.origin_y)?;
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = self.records_path() {
            validation::validate_path("store.records_path", path)?;
        }
        validation::validate_one_of("logging.level", self.log_level(), &LOG_LEVELS)?;
        self.layout.validate()
    }
}
