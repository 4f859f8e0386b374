use super::client::GraphQlClient;
use crate::domain::model::{Volume, VolumeCreateInput};
use crate::domain::ports::VolumeRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const CREATE_VOLUME_MUTATION: &str = r#"
  mutation volumeCreate($input: VolumeCreateInput!) {
    volumeCreate(input: $input) {
      id
      name
      projectId
      createdAt
    }
  }
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateVolumeResponse {
    volume_create: Option<Volume>,
}

pub struct GraphQlVolumeRepository {
    client: Arc<GraphQlClient>,
}

impl GraphQlVolumeRepository {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VolumeRepository for GraphQlVolumeRepository {
    async fn create_volume(&self, input: &VolumeCreateInput) -> Result<Option<Volume>> {
        let response: CreateVolumeResponse = self
            .client
            .request(CREATE_VOLUME_MUTATION, serde_json::json!({ "input": input }))
            .await?;

        Ok(response.volume_create)
    }
}
