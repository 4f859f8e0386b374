pub mod client;
pub mod services;
pub mod tcp_proxies;
pub mod templates;
pub mod variables;
pub mod volumes;

use crate::domain::ports::Repositories;
use std::sync::Arc;

pub use client::{GraphQlClient, DEFAULT_API_ENDPOINT};
pub use services::GraphQlServiceRepository;
pub use tcp_proxies::GraphQlTcpProxyRepository;
pub use templates::GraphQlTemplateRepository;
pub use variables::GraphQlVariableRepository;
pub use volumes::GraphQlVolumeRepository;

/// 所有 repository 共用同一個 GraphQL client
#[derive(Clone)]
pub struct RailwayApi {
    client: Arc<GraphQlClient>,
}

impl RailwayApi {
    pub fn new(client: GraphQlClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &GraphQlClient {
        &self.client
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            templates: Arc::new(GraphQlTemplateRepository::new(self.client.clone())),
            services: Arc::new(GraphQlServiceRepository::new(self.client.clone())),
            variables: Arc::new(GraphQlVariableRepository::new(self.client.clone())),
            tcp_proxies: Arc::new(GraphQlTcpProxyRepository::new(self.client.clone())),
            volumes: Arc::new(GraphQlVolumeRepository::new(self.client.clone())),
        }
    }
}
