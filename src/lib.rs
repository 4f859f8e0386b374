pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::graphql::{GraphQlClient, RailwayApi};
pub use config::{LogFormat, ProvisionerConfig};
#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use core::orchestrator::ProvisioningOrchestrator;
pub use domain::model::{ProvisionRequest, ProvisionSource, ProvisionedResourceSet};
pub use utils::error::{ProvisionError, Result};
