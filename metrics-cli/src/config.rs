//! Application configuration
//!
//! Values come from `config.toml` (in the user config dir, or `--config`),
//! then environment variables (a `.env` file is loaded at startup) override
//! them. Every key has a default, so no file is required.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ApiConfig;
use crate::api::config::DEFAULT_BASE_URL;
use crate::source::excel::{DEFAULT_SHEET_NAME, TableRef};
use crate::source::validator::EnumMatch;

/// Environment variables that override file values
pub mod env {
    pub const ACCESS_TOKEN: &str = "GA_ACCESS_TOKEN";
    pub const API_BASE_URL: &str = "GA_API_BASE_URL";
    pub const TABLE_PATH: &str = "METRICS_TABLE_PATH";
    pub const SHEET_NAME: &str = "METRICS_SHEET_NAME";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSection,
    pub table: TableSection,
    pub validation: ValidationSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub request_logging: bool,
    pub access_token: Option<String>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            request_logging: true,
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSection {
    pub path: PathBuf,
    pub sheet_name: String,
}

impl Default for TableSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("custom_metrics.xlsx"),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSection {
    pub enum_match: EnumMatch,
}

impl Config {
    /// `<config_dir>/metrics-cli/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("metrics-cli").join("config.toml"))
    }

    /// Load from an explicit path (must exist) or the default path (optional),
    /// then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    log::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override file values with whatever `lookup` returns for the known variables
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = lookup(env::ACCESS_TOKEN) {
            self.api.access_token = Some(token);
        }
        if let Some(url) = lookup(env::API_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(path) = lookup(env::TABLE_PATH) {
            self.table.path = PathBuf::from(path);
        }
        if let Some(sheet) = lookup(env::SHEET_NAME) {
            self.table.sheet_name = sheet;
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::builder()
            .base_url(self.api.base_url.clone())
            .timeout(Duration::from_secs(self.api.timeout_secs))
            .request_logging(self.api.request_logging)
            .build()
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef::new(self.table.path.clone(), self.table.sheet_name.clone())
    }

    pub fn access_token(&self) -> Result<String> {
        self.api.access_token.clone().with_context(|| {
            format!(
                "No access token configured. Set {} or [api] access_token in the config file.",
                env::ACCESS_TOKEN
            )
        })
    }
}
