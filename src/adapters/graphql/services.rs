use super::client::GraphQlClient;
use crate::domain::model::{
    MutationOutcome, Service, ServiceCreateInput, ServiceInstance, ServiceInstanceUpdate,
};
use crate::domain::ports::ServiceRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const CREATE_SERVICE_MUTATION: &str = r#"
  mutation serviceCreate($projectId: String!, $name: String, $source: ServiceSourceInput) {
    serviceCreate(
      input: {
        projectId: $projectId,
        name: $name,
        source: $source
      }
    ) {
      id
      name
      projectId
      createdAt
    }
  }
"#;

const SERVICE_INSTANCE_QUERY: &str = r#"
  query serviceInstance($serviceId: String!, $environmentId: String!) {
    serviceInstance(serviceId: $serviceId, environmentId: $environmentId) {
      id
      serviceId
      environmentId
      region
      numReplicas
      startCommand
      healthcheckPath
    }
  }
"#;

const UPDATE_SERVICE_INSTANCE_MUTATION: &str = r#"
  mutation serviceInstanceUpdate(
    $serviceId: String!,
    $environmentId: String!,
    $startCommand: String,
    $healthcheckPath: String,
    $numReplicas: Int,
    $region: String
  ) {
    serviceInstanceUpdate(
      serviceId: $serviceId,
      environmentId: $environmentId,
      input: {
        startCommand: $startCommand,
        healthcheckPath: $healthcheckPath,
        numReplicas: $numReplicas,
        region: $region
      }
    )
  }
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateServiceResponse {
    service_create: Service,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceInstanceResponse {
    service_instance: Option<ServiceInstance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateServiceInstanceResponse {
    service_instance_update: bool,
}

pub struct GraphQlServiceRepository {
    client: Arc<GraphQlClient>,
}

impl GraphQlServiceRepository {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServiceRepository for GraphQlServiceRepository {
    async fn create_service(&self, input: &ServiceCreateInput) -> Result<Service> {
        let response: CreateServiceResponse = self
            .client
            .request(
                CREATE_SERVICE_MUTATION,
                serde_json::json!({
                    "projectId": input.project_id,
                    "name": input.name,
                    "source": { "image": input.image },
                }),
            )
            .await?;

        Ok(response.service_create)
    }

    async fn get_service_instance(
        &self,
        service_id: &str,
        environment_id: &str,
    ) -> Result<Option<ServiceInstance>> {
        let response: ServiceInstanceResponse = self
            .client
            .request(
                SERVICE_INSTANCE_QUERY,
                serde_json::json!({
                    "serviceId": service_id,
                    "environmentId": environment_id,
                }),
            )
            .await?;

        Ok(response.service_instance)
    }

    async fn update_service_instance(
        &self,
        service_id: &str,
        environment_id: &str,
        update: &ServiceInstanceUpdate,
    ) -> Result<MutationOutcome> {
        let mut variables = serde_json::to_value(update)?;
        if let Some(fields) = variables.as_object_mut() {
            fields.insert("serviceId".to_string(), service_id.into());
            fields.insert("environmentId".to_string(), environment_id.into());
        }

        let response: UpdateServiceInstanceResponse = self
            .client
            .request(UPDATE_SERVICE_INSTANCE_MUTATION, variables)
            .await?;

        if response.service_instance_update {
            Ok(MutationOutcome::Applied)
        } else {
            Ok(MutationOutcome::Rejected {
                reason: "serviceInstanceUpdate returned false".to_string(),
            })
        }
    }
}
