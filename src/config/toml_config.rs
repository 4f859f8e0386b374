use crate::adapters::graphql::DEFAULT_API_ENDPOINT;
use crate::core::variables::DEFAULT_BATCH_SIZE;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ProvisionError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const TOKEN_ENV_VAR: &str = "RAILWAY_API_TOKEN";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 600;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Compact => f.write_str("compact"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(ProvisionError::InvalidConfigValue {
                field: "log_format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: compact, json".to_string(),
            }),
        }
    }
}

/// 佈建工具的執行設定
///
/// 來源優先順序（低到高）：內建預設值、TOML 檔、`RAILWAY_API_TOKEN`、命令列參數。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    pub api_endpoint: String,
    pub api_token: Option<String>,
    pub variable_batch_size: usize,
    pub request_timeout_seconds: u64,
    pub log_format: LogFormat,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_token: None,
            variable_batch_size: DEFAULT_BATCH_SIZE,
            request_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            log_format: LogFormat::Compact,
        }
    }
}

impl ProvisionerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProvisionError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RAILWAY_API_TOKEN})，未設定的保留原文
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProvisionError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 預設值或設定檔，再疊上環境變數中的 token
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV_VAR).filter(|t| !t.trim().is_empty()) {
            self.api_token = Some(token);
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_positive_number("variable_batch_size", self.variable_batch_size, 1)?;
        validation::validate_range(
            "request_timeout_seconds",
            self.request_timeout_seconds,
            1,
            MAX_TIMEOUT_SECONDS,
        )?;
        if let Some(token) = &self.api_token {
            validation::validate_non_empty_string("api_token", token)?;
        }
        Ok(())
    }
}

impl ConfigProvider for ProvisionerConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|t| !t.trim().is_empty())
    }

    fn variable_batch_size(&self) -> usize {
        self.variable_batch_size
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Validate for ProvisionerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
