use super::client::GraphQlClient;
use crate::domain::model::{TcpProxy, TcpProxyCreateInput};
use crate::domain::ports::TcpProxyRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const CREATE_TCP_PROXY_MUTATION: &str = r#"
  mutation tcpProxyCreate($input: TCPProxyCreateInput!) {
    tcpProxyCreate(input: $input) {
      id
      applicationPort
      proxyPort
      domain
      environmentId
      serviceId
    }
  }
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTcpProxyResponse {
    tcp_proxy_create: Option<TcpProxy>,
}

pub struct GraphQlTcpProxyRepository {
    client: Arc<GraphQlClient>,
}

impl GraphQlTcpProxyRepository {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TcpProxyRepository for GraphQlTcpProxyRepository {
    async fn create_tcp_proxy(&self, input: &TcpProxyCreateInput) -> Result<Option<TcpProxy>> {
        let response: CreateTcpProxyResponse = self
            .client
            .request(CREATE_TCP_PROXY_MUTATION, serde_json::json!({ "input": input }))
            .await?;

        Ok(response.tcp_proxy_create)
    }
}
