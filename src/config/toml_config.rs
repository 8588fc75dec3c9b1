use crate::core::ConfigProvider;
use crate::utils::error::{AnalyticsError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "dine-analytics.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            json_logs: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:dine.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub top_items_limit: usize,
    pub recent_reviews_limit: usize,
    pub max_period_days: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_items_limit: crate::core::reporter::DEFAULT_TOP_ITEMS,
            recent_reviews_limit: crate::core::reporter::DEFAULT_RECENT_REVIEWS,
            max_period_days: crate::core::period::DEFAULT_MAX_PERIOD_DAYS,
        }
    }
}

impl AppConfig {
    /// Loads from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalyticsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after replacing `${VAR}` references with environment values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AnalyticsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Explicit path if given, else `dine-analytics.toml` when present, else defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    // unset variables are left as written
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AnalyticsError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_positive_number("server.port", usize::from(self.server.port), 1)?;

        validation::validate_resolved("database.url", &self.database.url)?;
        validation::validate_database_url("database.url", &self.database.url)?;
        validation::validate_range("database.max_connections", self.database.max_connections, 1, 64)?;

        validation::validate_range(
            "analytics.top_items_limit",
            self.analytics.top_items_limit,
            1,
            50,
        )?;
        validation::validate_range(
            "analytics.recent_reviews_limit",
            self.analytics.recent_reviews_limit,
            1,
            50,
        )?;
        // the fixed 30-day window must always fit
        validation::validate_range(
            "analytics.max_period_days",
            self.analytics.max_period_days,
            30,
            36_600,
        )?;

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn database_url(&self) -> &str {
        &self.database.url
    }

    fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn top_items_limit(&self) -> usize {
        self.analytics.top_items_limit
    }

    fn recent_reviews_limit(&self) -> usize {
        self.analytics.recent_reviews_limit
    }

    fn max_period_days(&self) -> u64 {
        self.analytics.max_period_days
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
