use super::client::GraphQlClient;
use crate::domain::model::VariableUpsert;
use crate::domain::ports::VariableRepository;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const UPSERT_VARIABLE_MUTATION: &str = r#"
  mutation variableUpsert(
    $projectId: String!,
    $environmentId: String!,
    $serviceId: String,
    $name: String!,
    $value: String!
  ) {
    variableUpsert(
      input: {
        projectId: $projectId,
        environmentId: $environmentId,
        serviceId: $serviceId,
        name: $name,
        value: $value
      }
    )
  }
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertVariableResponse {
    variable_upsert: bool,
}

pub struct GraphQlVariableRepository {
    client: Arc<GraphQlClient>,
}

impl GraphQlVariableRepository {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VariableRepository for GraphQlVariableRepository {
    async fn upsert_variable(&self, input: &VariableUpsert) -> Result<()> {
        let response: UpsertVariableResponse = self
            .client
            .request(UPSERT_VARIABLE_MUTATION, serde_json::to_value(input)?)
            .await?;

        if !response.variable_upsert {
            return Err(ProvisionError::Application {
                message: format!("variableUpsert returned false for {}", input.name),
            });
        }
        Ok(())
    }
}
