use crate::core::database_catalog::DatabaseType;
use crate::core::region::Region;
use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// 以宣告順序讀取 JSON 物件（需要 serde_json 的 preserve_order）
fn ordered_entries<'de, D, T>(deserializer: D) -> std::result::Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let map = Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;

    map.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            serde_json::from_value(value)
                .map(|parsed| (key.clone(), parsed))
                .map_err(|e| D::Error::custom(format!("entry '{}': {}", key, e)))
        })
        .collect()
}

/// 平台模板目錄中的一筆模板
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "serializedConfig")]
    pub config: SerializedConfig,
    #[serde(default)]
    pub projects: u64,
}

/// 服務 slot 保留原始 JSON，只有實際使用的 slot 才會被解析
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerializedConfig {
    #[serde(default, deserialize_with = "ordered_entries")]
    pub services: Vec<(String, serde_json::Value)>,
}

impl SerializedConfig {
    /// 第一個宣告的 slot 與其解析結果
    pub fn first_service(
        &self,
    ) -> Option<(&str, std::result::Result<ServiceConfig, serde_json::Error>)> {
        self.services
            .first()
            .map(|(slot, raw)| (slot.as_str(), ServiceConfig::deserialize(raw)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub source: Option<ServiceSource>,
    #[serde(default, deserialize_with = "ordered_entries")]
    pub variables: Vec<(String, VariableDecl)>,
    #[serde(default)]
    pub networking: Option<NetworkingDecl>,
    #[serde(default, deserialize_with = "ordered_entries")]
    pub volume_mounts: Vec<(String, VolumeMountDecl)>,
}

impl ServiceConfig {
    pub fn image(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|s| s.image.as_deref())
            .filter(|image| !image.trim().is_empty())
    }

    pub fn tcp_proxies(&self) -> &[(String, TcpProxyDecl)] {
        self.networking
            .as_ref()
            .map(|n| n.tcp_proxies.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSource {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDecl {
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_optional: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingDecl {
    #[serde(default, deserialize_with = "ordered_entries")]
    pub tcp_proxies: Vec<(String, TcpProxyDecl)>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TcpProxyDecl {
    #[serde(default, alias = "applicationPort")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMountDecl {
    pub mount_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    pub id: String,
    pub service_id: String,
    pub environment_id: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub num_replicas: Option<u32>,
    #[serde(default)]
    pub start_command: Option<String>,
    #[serde(default)]
    pub healthcheck_path: Option<String>,
}

/// 服務實例的部分更新，只送出有值的欄位
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_replicas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck_path: Option<String>,
}

impl ServiceInstanceUpdate {
    pub fn region(region: Region) -> Self {
        Self {
            region: Some(region.as_str().to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCreateInput {
    pub project_id: String,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableUpsert {
    pub project_id: String,
    pub environment_id: String,
    pub service_id: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TcpProxyCreateInput {
    pub environment_id: String,
    pub service_id: String,
    pub application_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpProxy {
    pub id: String,
    pub application_port: u16,
    #[serde(default)]
    pub proxy_port: Option<u16>,
    #[serde(default)]
    pub domain: Option<String>,
    pub service_id: String,
    pub environment_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeCreateInput {
    pub project_id: String,
    pub environment_id: String,
    pub service_id: String,
    pub mount_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// 沒有例外通道的 mutation 結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Rejected { reason: String },
}

/// 要建立的資源來源：平台模板或內建資料庫設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionSource {
    Template(String),
    Database(DatabaseType),
}

impl fmt::Display for ProvisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionSource::Template(id) => write!(f, "template {}", id),
            ProvisionSource::Database(db) => write!(f, "database {}", db.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub project_id: String,
    pub environment_id: String,
    pub region: String,
    pub source: ProvisionSource,
    pub name: Option<String>,
}

/// 一次編排呼叫所需的完整計畫，不會被保存
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningPlan {
    pub project_id: String,
    pub environment_id: String,
    pub region: Region,
    pub service_name: String,
    pub image: String,
    pub variables: Vec<(String, String)>,
    /// None 表示不建立 TCP proxy
    pub application_port: Option<u16>,
    pub mount_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionStep {
    Resolve,
    CreateService,
    SetVariables,
    UpdatePlacement,
    CreateNetworkProxy,
    CreateVolume,
}

impl ProvisionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionStep::Resolve => "resolve",
            ProvisionStep::CreateService => "create_service",
            ProvisionStep::SetVariables => "set_variables",
            ProvisionStep::UpdatePlacement => "update_placement",
            ProvisionStep::CreateNetworkProxy => "create_network_proxy",
            ProvisionStep::CreateVolume => "create_volume",
        }
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: ProvisionStep,
    pub duration: Duration,
}

/// 編排成功後回傳的資源集合
#[derive(Debug, Clone)]
pub struct ProvisionedResourceSet {
    pub service: Service,
    pub environment_id: String,
    pub region: Region,
    pub variables_set: usize,
    pub tcp_proxy: Option<TcpProxy>,
    pub volume: Option<Volume>,
    pub steps: Vec<StepRecord>,
    pub summary: String,
}

impl ProvisionedResourceSet {
    pub fn executed_steps(&self) -> Vec<ProvisionStep> {
        self.steps.iter().map(|s| s.step).collect()
    }

    pub fn execution_summary(&self) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_duration: Duration = self.steps.iter().map(|s| s.duration).sum();
        let steps: Vec<serde_json::Value> = self
            .steps
            .iter()
            .map(|s| serde_json::Value::String(s.step.as_str().to_string()))
            .collect();

        summary.insert(
            "service_id".to_string(),
            serde_json::Value::String(self.service.id.clone()),
        );
        summary.insert(
            "region".to_string(),
            serde_json::Value::String(self.region.as_str().to_string()),
        );
        summary.insert(
            "variables_set".to_string(),
            serde_json::Value::Number(self.variables_set.into()),
        );
        summary.insert("executed_steps".to_string(), serde_json::Value::Array(steps));
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );
        summary.insert(
            "tcp_proxy".to_string(),
            self.tcp_proxy
                .as_ref()
                .and_then(|p| serde_json::to_value(p).ok())
                .unwrap_or(serde_json::Value::Null),
        );
        summary.insert(
            "volume".to_string(),
            self.volume
                .as_ref()
                .and_then(|v| serde_json::to_value(v).ok())
                .unwrap_or(serde_json::Value::Null),
        );

        summary
    }
}
