use crate::domain::model::{
    MutationOutcome, Service, ServiceCreateInput, ServiceInstance, ServiceInstanceUpdate,
    TcpProxy, TcpProxyCreateInput, Template, VariableUpsert, Volume, VolumeCreateInput,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn variable_batch_size(&self) -> usize;
    fn request_timeout(&self) -> Duration;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// 每次都重新抓取完整目錄，不做快取
    async fn list_templates(&self) -> Result<Vec<Template>>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create_service(&self, input: &ServiceCreateInput) -> Result<Service>;

    /// Ok(None) 表示實例尚未建立，與傳輸錯誤不同
    async fn get_service_instance(
        &self,
        service_id: &str,
        environment_id: &str,
    ) -> Result<Option<ServiceInstance>>;

    async fn update_service_instance(
        &self,
        service_id: &str,
        environment_id: &str,
        update: &ServiceInstanceUpdate,
    ) -> Result<MutationOutcome>;
}

#[async_trait]
pub trait VariableRepository: Send + Sync {
    /// 以 (project, environment, service, name) 為鍵，後寫入者勝
    async fn upsert_variable(&self, input: &VariableUpsert) -> Result<()>;
}

#[async_trait]
pub trait TcpProxyRepository: Send + Sync {
    async fn create_tcp_proxy(&self, input: &TcpProxyCreateInput) -> Result<Option<TcpProxy>>;
}

#[async_trait]
pub trait VolumeRepository: Send + Sync {
    async fn create_volume(&self, input: &VolumeCreateInput) -> Result<Option<Volume>>;
}

/// 編排器使用的全部 repository，由呼叫端建構後注入
#[derive(Clone)]
pub struct Repositories {
    pub templates: Arc<dyn TemplateRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub variables: Arc<dyn VariableRepository>,
    pub tcp_proxies: Arc<dyn TcpProxyRepository>,
    pub volumes: Arc<dyn VolumeRepository>,
}

impl Repositories {
    /// 用同一個實作同時提供所有 repository（測試用的假平台也走這裡）
    pub fn from_shared<T>(platform: Arc<T>) -> Self
    where
        T: TemplateRepository
            + ServiceRepository
            + VariableRepository
            + TcpProxyRepository
            + VolumeRepository
            + 'static,
    {
        Self {
            templates: platform.clone(),
            services: platform.clone(),
            variables: platform.clone(),
            tcp_proxies: platform.clone(),
            volumes: platform,
        }
    }
}
