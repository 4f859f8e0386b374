use crate::domain::model::{ServiceConfig, Template};
use crate::domain::ports::TemplateRepository;
use crate::utils::error::{ProvisionError, Result};
use std::sync::Arc;

/// 模板未宣告 TCP proxy 或未指定 port 時使用的應用程式埠
pub const DEFAULT_APPLICATION_PORT: u16 = 5432;

/// 模板未宣告 volume mount 時使用的掛載路徑
pub const DEFAULT_MOUNT_PATH: &str = "/data";

const PROVISIONABLE_CATEGORIES: [&str; 2] = ["storage", "database"];

/// 名稱相似度門檻 (Jaro-Winkler)
const SEARCH_SIMILARITY_THRESHOLD: f64 = 0.85;

/// 從模板解析出的單一服務設定
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedService {
    pub template_id: String,
    pub slot: String,
    pub name: String,
    pub image: String,
    pub variables: Vec<(String, String)>,
    pub application_port: u16,
    pub mount_path: String,
}

pub fn is_provisionable_category(category: &str) -> bool {
    let category = category.to_lowercase();
    PROVISIONABLE_CATEGORIES
        .iter()
        .any(|wanted| category.contains(wanted))
}

pub fn list_provisionable_templates(catalog: &[Template]) -> Vec<&Template> {
    catalog
        .iter()
        .filter(|t| t.category.as_deref().is_some_and(is_provisionable_category))
        .collect()
}

fn matches_query(template: &Template, query: &str) -> bool {
    let name = template.name.to_lowercase();
    let description = template.description.as_deref().unwrap_or("").to_lowercase();

    name.contains(query)
        || description.contains(query)
        || strsim::jaro_winkler(query, &name) >= SEARCH_SIMILARITY_THRESHOLD
}

/// 可佈建的模板，依名稱或描述篩選，使用專案數多的排前面
pub fn search_templates<'a>(catalog: &'a [Template], query: Option<&str>) -> Vec<&'a Template> {
    let query = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let mut templates: Vec<&Template> = list_provisionable_templates(catalog)
        .into_iter()
        .filter(|t| query.as_deref().map_or(true, |q| matches_query(t, q)))
        .collect();

    templates.sort_by_key(|t| std::cmp::Reverse(t.projects));
    templates
}

pub fn derive_application_port(config: &ServiceConfig) -> u16 {
    config
        .tcp_proxies()
        .first()
        .and_then(|(_, proxy)| proxy.port)
        .unwrap_or(DEFAULT_APPLICATION_PORT)
}

pub fn derive_mount_path(config: &ServiceConfig) -> String {
    config
        .volume_mounts
        .first()
        .map(|(_, mount)| mount.mount_path.clone())
        .unwrap_or_else(|| DEFAULT_MOUNT_PATH.to_string())
}

/// 在目錄中找出模板並取出第一個服務 slot
///
/// 只處理第一個 slot，其餘 slot 會被忽略。
pub fn resolve(catalog: &[Template], template_id: &str) -> Result<ResolvedService> {
    let template = list_provisionable_templates(catalog)
        .into_iter()
        .find(|t| t.id == template_id)
        .ok_or_else(|| ProvisionError::TemplateNotFound {
            template_id: template_id.to_string(),
        })?;

    let (slot, parsed) =
        template
            .config
            .first_service()
            .ok_or_else(|| ProvisionError::InvalidTemplate {
                template_id: template_id.to_string(),
                reason: "no services".to_string(),
            })?;

    let config = parsed.map_err(|e| ProvisionError::InvalidTemplate {
        template_id: template_id.to_string(),
        reason: format!("malformed service '{}': {}", slot, e),
    })?;

    if template.config.services.len() > 1 {
        tracing::warn!(
            "⚠️ Template {} declares {} services, only '{}' will be provisioned",
            template_id,
            template.config.services.len(),
            slot
        );
    }

    let image = config
        .image()
        .ok_or_else(|| ProvisionError::InvalidTemplate {
            template_id: template_id.to_string(),
            reason: "no image source".to_string(),
        })?
        .to_string();

    let variables = config
        .variables
        .iter()
        .filter_map(|(name, decl)| match &decl.default_value {
            Some(value) => Some((name.clone(), value.clone())),
            None => {
                tracing::debug!("Variable {} has no default value, skipping", name);
                None
            }
        })
        .collect();

    Ok(ResolvedService {
        template_id: template.id.clone(),
        slot: slot.to_string(),
        name: config.name.clone().unwrap_or_else(|| template.name.clone()),
        image,
        variables,
        application_port: derive_application_port(&config),
        mount_path: derive_mount_path(&config),
    })
}

/// 每次解析都重新抓取模板目錄
pub struct TemplateResolver {
    templates: Arc<dyn TemplateRepository>,
}

impl TemplateResolver {
    pub fn new(templates: Arc<dyn TemplateRepository>) -> Self {
        Self { templates }
    }

    pub async fn resolve(&self, template_id: &str) -> Result<ResolvedService> {
        let catalog = self.templates.list_templates().await?;
        tracing::debug!("Fetched {} templates from catalog", catalog.len());
        resolve(&catalog, template_id)
    }

    pub async fn list_provisionable(&self, query: Option<&str>) -> Result<Vec<Template>> {
        let catalog = self.templates.list_templates().await?;
        Ok(search_templates(&catalog, query).into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(id: &str, category: &str, services: serde_json::Value) -> Template {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("{} template", id),
            "category": category,
            "serializedConfig": { "services": services }
        }))
        .unwrap()
    }

    fn pg_template() -> Template {
        template(
            "pg-1",
            "SQL Databases",
            json!({
                "db": {
                    "source": { "image": "postgres:15" },
                    "variables": { "PGUSER": { "defaultValue": "u" } },
                    "networking": { "tcpProxies": { "p": { "port": 5432 } } },
                    "volumeMounts": { "v": { "mountPath": "/data" } }
                }
            }),
        )
    }

    #[test]
    fn test_resolve_full_template() {
        let resolved = resolve(&[pg_template()], "pg-1").unwrap();

        assert_eq!(resolved.slot, "db");
        assert_eq!(resolved.image, "postgres:15");
        assert_eq!(resolved.name, "pg-1 template");
        assert_eq!(resolved.variables, vec![("PGUSER".to_string(), "u".to_string())]);
        assert_eq!(resolved.application_port, 5432);
        assert_eq!(resolved.mount_path, "/data");
    }

    #[test]
    fn test_category_filter_is_case_insensitive_substring() {
        assert!(is_provisionable_category("SQL Databases"));
        assert!(is_provisionable_category("Object STORAGE"));
        assert!(!is_provisionable_category("Starters"));

        let catalog = vec![
            pg_template(),
            template("web", "Starters", json!({ "app": { "source": { "image": "nginx" } } })),
        ];
        assert_eq!(list_provisionable_templates(&catalog).len(), 1);
        assert!(matches!(
            resolve(&catalog, "web"),
            Err(ProvisionError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn test_search_filters_by_name_or_description_and_sorts_by_projects() {
        let mut redis = template("redis", "Databases", json!({ "r": { "source": { "image": "redis:7" } } }));
        redis.name = "Redis".to_string();
        redis.projects = 40;
        let mut pg = pg_template();
        pg.name = "PostgreSQL".to_string();
        pg.description = Some("Relational database with SSL".to_string());
        pg.projects = 900;
        let mut minio = template("minio", "Object Storage", json!({ "m": { "source": { "image": "minio" } } }));
        minio.name = "MinIO".to_string();
        minio.projects = 120;
        let catalog = vec![redis, pg, minio];

        let all: Vec<&str> = search_templates(&catalog, None).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(all, vec!["pg-1", "minio", "redis"]);

        let by_description: Vec<&str> = search_templates(&catalog, Some("relational"))
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(by_description, vec!["pg-1"]);

        // 輕微拼錯仍可找到
        let fuzzy: Vec<&str> = search_templates(&catalog, Some("Rediss"))
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(fuzzy, vec!["redis"]);

        assert_eq!(search_templates(&catalog, Some("   ")).len(), 3);
        assert!(search_templates(&catalog, Some("kafka")).is_empty());
    }

    #[test]
    fn test_unknown_template_id() {
        let err = resolve(&[pg_template()], "nonexistent").unwrap_err();
        match err {
            ProvisionError::TemplateNotFound { template_id } => assert_eq!(template_id, "nonexistent"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_template_without_services_is_invalid() {
        let catalog = vec![template("empty", "Databases", json!({}))];
        match resolve(&catalog, "empty").unwrap_err() {
            ProvisionError::InvalidTemplate { reason, .. } => assert_eq!(reason, "no services"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_first_slot_without_image_is_invalid() {
        let catalog = vec![template(
            "repo-db",
            "Databases",
            json!({
                "db": { "source": { "repo": "github.com/acme/db" } },
                "other": { "source": { "image": "redis:7" } }
            }),
        )];
        match resolve(&catalog, "repo-db").unwrap_err() {
            ProvisionError::InvalidTemplate { reason, .. } => assert_eq!(reason, "no image source"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_second_slot_is_ignored() {
        let catalog = vec![template(
            "pg-1",
            "Databases",
            json!({
                "db": { "source": { "image": "postgres:15" } },
                "backup": {
                    "volumeMounts": { "v": {} },
                    "variables": { "N": { "defaultValue": 3 } },
                    "networking": { "tcpProxies": { "p": { "port": 70000 } } }
                }
            }),
        )];

        let resolved = resolve(&catalog, "pg-1").unwrap();
        assert_eq!(resolved.slot, "db");
        assert_eq!(resolved.image, "postgres:15");
    }

    #[test]
    fn test_malformed_first_slot_is_invalid_template() {
        let catalog = vec![template(
            "pg-1",
            "Databases",
            json!({
                "db": {
                    "source": { "image": "postgres:15" },
                    "networking": { "tcpProxies": { "p": { "port": 70000 } } }
                }
            }),
        )];

        match resolve(&catalog, "pg-1").unwrap_err() {
            ProvisionError::InvalidTemplate { template_id, reason } => {
                assert_eq!(template_id, "pg-1");
                assert!(reason.contains("'db'"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_only_first_slot_is_honoured() {
        let catalog = vec![template(
            "multi",
            "Databases",
            json!({
                "primary": { "name": "Primary", "source": { "image": "mysql:8" } },
                "replica": { "name": "Replica", "source": { "image": "mysql:8-replica" } }
            }),
        )];
        let resolved = resolve(&catalog, "multi").unwrap();
        assert_eq!(resolved.slot, "primary");
        assert_eq!(resolved.name, "Primary");
    }

    #[test]
    fn test_port_derivation() {
        let no_proxy: ServiceConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(derive_application_port(&no_proxy), 5432);

        let proxy_without_port: ServiceConfig =
            serde_json::from_value(json!({ "networking": { "tcpProxies": { "p": {} } } })).unwrap();
        assert_eq!(derive_application_port(&proxy_without_port), 5432);

        let explicit: ServiceConfig = serde_json::from_value(json!({
            "networking": { "tcpProxies": { "a": { "port": 6379 }, "b": { "port": 1 } } }
        }))
        .unwrap();
        assert_eq!(derive_application_port(&explicit), 6379);
    }

    #[test]
    fn test_mount_path_derivation() {
        let none: ServiceConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(derive_mount_path(&none), "/data");

        let declared: ServiceConfig = serde_json::from_value(json!({
            "volumeMounts": { "first": { "mountPath": "/var/lib/redis" }, "second": { "mountPath": "/x" } }
        }))
        .unwrap();
        assert_eq!(derive_mount_path(&declared), "/var/lib/redis");
    }

    #[test]
    fn test_variables_without_default_are_skipped() {
        let catalog = vec![template(
            "vars",
            "Databases",
            json!({
                "db": {
                    "source": { "image": "postgres:16" },
                    "variables": {
                        "A": { "defaultValue": "1" },
                        "SECRET": { "isOptional": true },
                        "B": { "defaultValue": "" }
                    }
                }
            }),
        )];
        let resolved = resolve(&catalog, "vars").unwrap();
        assert_eq!(
            resolved.variables,
            vec![("A".to_string(), "1".to_string()), ("B".to_string(), String::new())]
        );
    }

    struct StaticCatalog(Vec<Template>);

    #[async_trait::async_trait]
    impl TemplateRepository for StaticCatalog {
        async fn list_templates(&self) -> Result<Vec<Template>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_resolver_lists_only_provisionable_templates() {
        let resolver = TemplateResolver::new(Arc::new(StaticCatalog(vec![
            pg_template(),
            template("web", "Starters", json!({ "app": { "source": { "image": "nginx" } } })),
        ])));

        let listed = tokio_test::block_on(resolver.list_provisionable(None)).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "pg-1");

        let resolved = tokio_test::block_on(resolver.resolve("pg-1")).unwrap();
        assert_eq!(resolved.image, "postgres:15");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let catalog = vec![pg_template()];
        assert_eq!(resolve(&catalog, "pg-1").unwrap(), resolve(&catalog, "pg-1").unwrap());
    }
}
