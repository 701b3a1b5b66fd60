use crate::adapters::osm::DEFAULT_OSM_API_URL;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PosError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORE_PATH: &str = "./data/pos.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub osm: OsmConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsmConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for OsmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_OSM_API_URL.to_string(),
            timeout_seconds: 10,
            user_agent: concat!("campus-coffee/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_STORE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    /// `compact` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            format: "compact".to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PosError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PosError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OSM_API_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PosError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn json_logging(&self) -> bool {
        self.logging.format == "json"
    }
}

impl ConfigProvider for TomlConfig {
    fn osm_api_url(&self) -> &str {
        &self.osm.api_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.osm.timeout_seconds)
    }

    fn user_agent(&self) -> &str {
        &self.osm.user_agent
    }

    fn store_path(&self) -> &str {
        &self.store.path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_url("osm.api_url", &self.osm.api_url)?;
        validate_positive_number("osm.timeout_seconds", self.osm.timeout_seconds, 1)?;
        if self.osm.user_agent.trim().is_empty() {
            return Err(PosError::MissingConfigError {
                field: "osm.user_agent".to_string(),
            });
        }
        validate_path("store.path", &self.store.path)?;
        validate_one_of("logging.format", &self.logging.format, &["compact", "json"])?;

        Ok(())
    }
}
