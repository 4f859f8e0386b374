use crate::domain::model::ProvisionStep;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("API token not set: add RAILWAY_API_TOKEN to the environment or pass --api-token")]
    MissingCredential,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Template not found: {template_id}")]
    TemplateNotFound { template_id: String },

    #[error("Invalid template '{template_id}': {reason}")]
    InvalidTemplate { template_id: String, reason: String },

    #[error("Unsupported database type: {value}")]
    UnsupportedDatabaseType { value: String },

    #[error("Unsupported region: {value}")]
    UnsupportedRegion { value: String },

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("API reported an error: {message}")]
    Application { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No service instance for service {service_id} in environment {environment_id}")]
    InstanceNotFound {
        service_id: String,
        environment_id: String,
    },

    #[error("Failed to update placement of service {service_id} in environment {environment_id}: {reason}")]
    PlacementUpdateFailed {
        service_id: String,
        environment_id: String,
        reason: String,
    },

    #[error("Failed to create TCP proxy for service {service_id} in environment {environment_id}")]
    ProxyCreationFailed {
        service_id: String,
        environment_id: String,
    },

    #[error("Failed to create volume for service {service_id} in environment {environment_id}")]
    VolumeCreationFailed {
        service_id: String,
        environment_id: String,
    },

    #[error("Step {step} failed for service {service_id} in environment {environment_id}: {source}")]
    StepFailed {
        step: ProvisionStep,
        service_id: String,
        environment_id: String,
        #[source]
        source: Box<ProvisionError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Transport,
    Application,
    Orchestration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ProvisionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProvisionError::MissingCredential
            | ProvisionError::ConfigError { .. }
            | ProvisionError::InvalidConfigValue { .. }
            | ProvisionError::Io(_) => ErrorCategory::Configuration,
            ProvisionError::TemplateNotFound { .. }
            | ProvisionError::InvalidTemplate { .. }
            | ProvisionError::UnsupportedDatabaseType { .. }
            | ProvisionError::UnsupportedRegion { .. } => ErrorCategory::Validation,
            ProvisionError::Transport(_) | ProvisionError::HttpStatus { .. } => {
                ErrorCategory::Transport
            }
            ProvisionError::Application { .. } | ProvisionError::Serialization(_) => {
                ErrorCategory::Application
            }
            ProvisionError::InstanceNotFound { .. }
            | ProvisionError::PlacementUpdateFailed { .. }
            | ProvisionError::ProxyCreationFailed { .. }
            | ProvisionError::VolumeCreationFailed { .. }
            | ProvisionError::StepFailed { .. } => ErrorCategory::Orchestration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Application => ErrorSeverity::High,
            // 服務已建立，需要人工處理
            ErrorCategory::Orchestration => ErrorSeverity::Critical,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 失敗時已建立的服務 ID（若有）
    pub fn created_service_id(&self) -> Option<&str> {
        match self {
            ProvisionError::InstanceNotFound { service_id, .. }
            | ProvisionError::PlacementUpdateFailed { service_id, .. }
            | ProvisionError::ProxyCreationFailed { service_id, .. }
            | ProvisionError::VolumeCreationFailed { service_id, .. }
            | ProvisionError::StepFailed { service_id, .. } => Some(service_id),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ProvisionError::MissingCredential => {
                "Set RAILWAY_API_TOKEN or provide api_token in the config file".to_string()
            }
            ProvisionError::ConfigError { .. } | ProvisionError::InvalidConfigValue { .. } => {
                "Check the configuration file and command line flags".to_string()
            }
            ProvisionError::TemplateNotFound { .. } => {
                "List the database templates and pass an existing template id".to_string()
            }
            ProvisionError::InvalidTemplate { .. } => {
                "Pick a template that declares a service with an image source".to_string()
            }
            ProvisionError::UnsupportedDatabaseType { .. } => format!(
                "Use one of: {}",
                crate::core::database_catalog::DatabaseType::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ProvisionError::UnsupportedRegion { .. } => format!(
                "Use one of: {}",
                crate::core::region::Region::ALL
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ProvisionError::Transport(_) | ProvisionError::HttpStatus { .. } => {
                "Check network connectivity and retry".to_string()
            }
            ProvisionError::Application { .. } | ProvisionError::Serialization(_) => {
                "Check the request parameters against the platform dashboard".to_string()
            }
            ProvisionError::Io(_) => "Check file paths and permissions".to_string(),
            _ => match self.created_service_id() {
                Some(id) => format!(
                    "Service {} was created but is incomplete: finish the remaining steps manually or delete it",
                    id
                ),
                None => "Inspect the project in the platform dashboard".to_string(),
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Validation => format!("Invalid request: {}", self),
            ErrorCategory::Transport => format!("Could not reach the platform API: {}", self),
            ErrorCategory::Application => format!("The platform rejected the request: {}", self),
            ErrorCategory::Orchestration => format!("Provisioning stopped part-way: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
