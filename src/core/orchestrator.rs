use crate::core::region::select_region;
use crate::core::template_resolver::TemplateResolver;
use crate::core::variables::{bulk_upsert, DEFAULT_BATCH_SIZE};
use crate::domain::model::{
    MutationOutcome, ProvisionRequest, ProvisionSource, ProvisionStep, ProvisionedResourceSet,
    ProvisioningPlan, Service, ServiceCreateInput, ServiceInstanceUpdate, StepRecord,
    TcpProxyCreateInput, VariableUpsert, VolumeCreateInput,
};
use crate::domain::ports::{ConfigProvider, Repositories};
use crate::utils::error::{ProvisionError, Result};
use std::time::Instant;

/// 依序建立服務、變數、區域設定、TCP proxy 與 volume
///
/// 每一步都等待完成才進行下一步。任何一步失敗即中止，
/// 已建立的資源不會被回滾，錯誤中會帶上服務與環境 ID。
pub struct ProvisioningOrchestrator {
    repositories: Repositories,
    variable_batch_size: usize,
}

impl ProvisioningOrchestrator {
    pub fn new(repositories: Repositories) -> Self {
        Self {
            repositories,
            variable_batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// 批次大小取自設定
    pub fn from_config(repositories: Repositories, config: &dyn ConfigProvider) -> Self {
        Self::new(repositories).with_batch_size(config.variable_batch_size())
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.variable_batch_size = batch_size.max(1);
        self
    }

    /// 解析請求為計畫，不會對平台做任何修改
    pub async fn plan(&self, request: &ProvisionRequest) -> Result<ProvisioningPlan> {
        let region = select_region(&request.region)?;
        let override_name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let plan = match &request.source {
            ProvisionSource::Template(template_id) => {
                let resolved = TemplateResolver::new(self.repositories.templates.clone())
                    .resolve(template_id)
                    .await?;

                ProvisioningPlan {
                    project_id: request.project_id.clone(),
                    environment_id: request.environment_id.clone(),
                    region,
                    service_name: override_name.unwrap_or(resolved.name),
                    image: resolved.image,
                    variables: resolved.variables,
                    application_port: Some(resolved.application_port),
                    mount_path: resolved.mount_path,
                }
            }
            ProvisionSource::Database(db) => {
                let config = db.config();

                ProvisioningPlan {
                    project_id: request.project_id.clone(),
                    environment_id: request.environment_id.clone(),
                    region,
                    service_name: override_name.unwrap_or_else(|| config.default_name.to_string()),
                    image: config.source.to_string(),
                    variables: config
                        .variables
                        .iter()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect(),
                    application_port: config.port,
                    mount_path: config.mount_path.to_string(),
                }
            }
        };

        Ok(plan)
    }

    pub async fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionedResourceSet> {
        tracing::info!(
            "🚀 Provisioning {} in project {} (environment {})",
            request.source,
            request.project_id,
            request.environment_id
        );

        let started = Instant::now();
        let plan = self.plan(request).await?;
        let steps = vec![StepRecord {
            step: ProvisionStep::Resolve,
            duration: started.elapsed(),
        }];
        tracing::info!(
            "📋 Plan resolved: service '{}' from image {} in {}",
            plan.service_name,
            plan.image,
            plan.region
        );

        self.execute(&plan, request, steps).await
    }

    async fn execute(
        &self,
        plan: &ProvisioningPlan,
        request: &ProvisionRequest,
        mut steps: Vec<StepRecord>,
    ) -> Result<ProvisionedResourceSet> {
        // CreateService
        let started = Instant::now();
        let service = self
            .repositories
            .services
            .create_service(&ServiceCreateInput {
                project_id: plan.project_id.clone(),
                name: plan.service_name.clone(),
                image: plan.image.clone(),
            })
            .await?;
        steps.push(StepRecord {
            step: ProvisionStep::CreateService,
            duration: started.elapsed(),
        });
        tracing::info!("✅ Created service '{}' (ID: {})", service.name, service.id);

        let step_failed = |step: ProvisionStep| {
            let service_id = service.id.clone();
            let environment_id = plan.environment_id.clone();
            move |source: ProvisionError| {
                tracing::error!("❌ Step {} failed for service {}: {}", step, service_id, source);
                ProvisionError::StepFailed {
                    step,
                    service_id,
                    environment_id,
                    source: Box::new(source),
                }
            }
        };

        // SetVariables
        let mut variables_set = 0;
        if !plan.variables.is_empty() {
            let started = Instant::now();
            let inputs: Vec<VariableUpsert> = plan
                .variables
                .iter()
                .map(|(name, value)| VariableUpsert {
                    project_id: plan.project_id.clone(),
                    environment_id: plan.environment_id.clone(),
                    service_id: Some(service.id.clone()),
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect();

            let report = bulk_upsert(
                self.repositories.variables.as_ref(),
                &inputs,
                self.variable_batch_size,
            )
            .await
            .map_err(step_failed(ProvisionStep::SetVariables))?;

            variables_set = report.total();
            steps.push(StepRecord {
                step: ProvisionStep::SetVariables,
                duration: started.elapsed(),
            });
            tracing::info!(
                "✅ Set {} variables in {} chunk(s)",
                variables_set,
                report.chunk_sizes.len()
            );
        }

        // UpdatePlacement
        let started = Instant::now();
        self.update_placement(&service, plan)
            .await
            .map_err(|e| match e {
                ProvisionError::InstanceNotFound { .. }
                | ProvisionError::PlacementUpdateFailed { .. } => e,
                other => step_failed(ProvisionStep::UpdatePlacement)(other),
            })?;
        steps.push(StepRecord {
            step: ProvisionStep::UpdatePlacement,
            duration: started.elapsed(),
        });
        tracing::info!("✅ Placed service {} in {}", service.id, plan.region);

        // CreateNetworkProxy
        let tcp_proxy = match plan.application_port {
            Some(application_port) => {
                let started = Instant::now();
                let proxy = self
                    .repositories
                    .tcp_proxies
                    .create_tcp_proxy(&TcpProxyCreateInput {
                        environment_id: plan.environment_id.clone(),
                        service_id: service.id.clone(),
                        application_port,
                    })
                    .await
                    .map_err(step_failed(ProvisionStep::CreateNetworkProxy))?
                    .ok_or_else(|| ProvisionError::ProxyCreationFailed {
                        service_id: service.id.clone(),
                        environment_id: plan.environment_id.clone(),
                    })?;

                steps.push(StepRecord {
                    step: ProvisionStep::CreateNetworkProxy,
                    duration: started.elapsed(),
                });
                tracing::info!(
                    "✅ Created TCP proxy {} for port {}",
                    proxy.id,
                    proxy.application_port
                );
                Some(proxy)
            }
            None => {
                tracing::info!("⏭️ Skipping TCP proxy: no port declared for {}", request.source);
                None
            }
        };

        // CreateVolume
        let started = Instant::now();
        let volume = self
            .repositories
            .volumes
            .create_volume(&VolumeCreateInput {
                project_id: plan.project_id.clone(),
                environment_id: plan.environment_id.clone(),
                service_id: service.id.clone(),
                mount_path: plan.mount_path.clone(),
            })
            .await
            .map_err(step_failed(ProvisionStep::CreateVolume))?
            .ok_or_else(|| ProvisionError::VolumeCreationFailed {
                service_id: service.id.clone(),
                environment_id: plan.environment_id.clone(),
            })?;
        steps.push(StepRecord {
            step: ProvisionStep::CreateVolume,
            duration: started.elapsed(),
        });
        tracing::info!("✅ Created volume {} at {}", volume.id, plan.mount_path);

        let summary = summarize(plan, &service, tcp_proxy.is_some());

        Ok(ProvisionedResourceSet {
            service,
            environment_id: plan.environment_id.clone(),
            region: plan.region,
            variables_set,
            tcp_proxy,
            volume: Some(volume),
            steps,
            summary,
        })
    }

    async fn update_placement(&self, service: &Service, plan: &ProvisioningPlan) -> Result<()> {
        let instance = self
            .repositories
            .services
            .get_service_instance(&service.id, &plan.environment_id)
            .await?
            .ok_or_else(|| ProvisionError::InstanceNotFound {
                service_id: service.id.clone(),
                environment_id: plan.environment_id.clone(),
            })?;

        tracing::debug!(
            "Service instance {} currently in region {:?}",
            instance.id,
            instance.region
        );

        let outcome = self
            .repositories
            .services
            .update_service_instance(
                &service.id,
                &plan.environment_id,
                &ServiceInstanceUpdate::region(plan.region),
            )
            .await?;

        match outcome {
            MutationOutcome::Applied => Ok(()),
            MutationOutcome::Rejected { reason } => {
                tracing::error!("❌ Placement update rejected for service {}: {}", service.id, reason);
                Err(ProvisionError::PlacementUpdateFailed {
                    service_id: service.id.clone(),
                    environment_id: plan.environment_id.clone(),
                    reason,
                })
            }
        }
    }
}

fn summarize(plan: &ProvisioningPlan, service: &Service, has_proxy: bool) -> String {
    let mut summary = format!(
        "Created service \"{}\" (ID: {}) using image {} in region {} ({}).",
        service.name,
        service.id,
        plan.image,
        plan.region,
        plan.region.location()
    );

    if !plan.variables.is_empty() {
        summary.push_str(&format!(" Set {} variables.", plan.variables.len()));
    }
    if let (true, Some(port)) = (has_proxy, plan.application_port) {
        summary.push_str(&format!(" Exposed port {} through a TCP proxy.", port));
    }
    summary.push_str(&format!(" Mounted a volume at {}.", plan.mount_path));

    summary
}
