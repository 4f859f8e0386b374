pub mod database_catalog;
pub mod orchestrator;
pub mod region;
pub mod template_resolver;
pub mod variables;

pub use crate::domain::model::{ProvisionRequest, ProvisionSource, ProvisionedResourceSet};
pub use crate::domain::ports::{ConfigProvider, Repositories};
pub use crate::utils::error::Result;
