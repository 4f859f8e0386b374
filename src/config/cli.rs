use super::toml_config::{LogFormat, ProvisionerConfig};
use crate::core::database_catalog::DatabaseType;
use crate::domain::model::{ProvisionRequest, ProvisionSource};
use crate::utils::error::{ProvisionError, Result};
use crate::utils::validation::validate_required_field;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "railway-provisioner")]
#[command(about = "Provision database and storage services on Railway")]
pub struct CliArgs {
    #[arg(long, help = "Project to create the service in")]
    pub project: Option<String>,

    #[arg(long, help = "Environment to create the service in")]
    pub environment: Option<String>,

    #[arg(long, help = "Deployment region, e.g. us-west1")]
    pub region: Option<String>,

    #[arg(long, conflicts_with = "database", help = "Template id from the platform catalog")]
    pub template: Option<String>,

    #[arg(long, help = "Built-in database type, e.g. postgres")]
    pub database: Option<String>,

    #[arg(long, help = "Override the service name")]
    pub name: Option<String>,

    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "API token (overrides RAILWAY_API_TOKEN)")]
    pub api_token: Option<String>,

    #[arg(long)]
    pub api_endpoint: Option<String>,

    #[arg(long)]
    pub variable_batch_size: Option<usize>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "List built-in database types and exit")]
    pub list_database_types: bool,

    #[arg(long, help = "List supported regions and exit")]
    pub list_regions: bool,

    #[arg(long, help = "List provisionable templates and exit")]
    pub list_templates: bool,

    #[arg(long, requires = "list_templates", help = "Filter listed templates by name or description")]
    pub search: Option<String>,
}

impl CliArgs {
    pub fn is_listing(&self) -> bool {
        self.list_database_types || self.list_regions || self.list_templates
    }

    /// 載入設定檔並套用命令列覆寫
    pub fn load_config(&self) -> Result<ProvisionerConfig> {
        let mut config = ProvisionerConfig::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ProvisionerConfig) {
        if let Some(token) = &self.api_token {
            config.api_token = Some(token.clone());
        }
        if let Some(endpoint) = &self.api_endpoint {
            config.api_endpoint = endpoint.clone();
        }
        if let Some(batch_size) = self.variable_batch_size {
            config.variable_batch_size = batch_size;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
    }

    pub fn to_request(&self) -> Result<ProvisionRequest> {
        let source = match (&self.template, &self.database) {
            (Some(template_id), None) => ProvisionSource::Template(template_id.clone()),
            (None, Some(database)) => ProvisionSource::Database(database.parse::<DatabaseType>()?),
            (Some(_), Some(_)) => {
                return Err(ProvisionError::ConfigError {
                    message: "--template and --database are mutually exclusive".to_string(),
                })
            }
            (None, None) => {
                return Err(ProvisionError::ConfigError {
                    message: "Either --template or --database is required".to_string(),
                })
            }
        };

        Ok(ProvisionRequest {
            project_id: validate_required_field("project", &self.project)?.clone(),
            environment_id: validate_required_field("environment", &self.environment)?.clone(),
            region: validate_required_field("region", &self.region)?.clone(),
            source,
            name: self.name.clone(),
        })
    }
}
