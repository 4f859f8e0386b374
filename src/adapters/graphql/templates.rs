use super::client::{Connection, GraphQlClient};
use crate::domain::model::Template;
use crate::domain::ports::TemplateRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const LIST_TEMPLATES_QUERY: &str = r#"
  query {
    templates {
      edges {
        node {
          id
          name
          description
          category
          serializedConfig
          projects
        }
      }
    }
  }
"#;

#[derive(Debug, Deserialize)]
struct TemplatesResponse {
    templates: Connection<serde_json::Value>,
}

pub struct GraphQlTemplateRepository {
    client: Arc<GraphQlClient>,
}

impl GraphQlTemplateRepository {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }
}

/// 逐筆解析目錄節點，結構不符的模板在此邊界被剔除
pub(crate) fn parse_catalog(nodes: Vec<serde_json::Value>) -> Vec<Template> {
    nodes
        .into_iter()
        .filter_map(|node| {
            let id = node
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("<unknown>")
                .to_string();
            match serde_json::from_value::<Template>(node) {
                Ok(template) => Some(template),
                Err(e) => {
                    tracing::warn!("⚠️ Skipping malformed template {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl TemplateRepository for GraphQlTemplateRepository {
    async fn list_templates(&self) -> Result<Vec<Template>> {
        let response: TemplatesResponse = self
            .client
            .request(LIST_TEMPLATES_QUERY, serde_json::json!({}))
            .await?;

        let nodes = response.templates.edges.into_iter().map(|e| e.node).collect();
        Ok(parse_catalog(nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_catalog_skips_malformed_entries() {
        let nodes = vec![
            json!({
                "id": "good",
                "name": "Redis",
                "category": "Databases",
                "serializedConfig": { "services": { "redis": { "source": { "image": "redis:7" } } } }
            }),
            json!({
                "id": "bad",
                "name": "Broken",
                "serializedConfig": { "services": ["redis"] }
            }),
            json!({ "name": "no id" }),
        ];

        let catalog = parse_catalog(nodes);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, "good");
    }

    /// slot 內容的錯誤留到解析時處理，模板本身仍在目錄中
    #[test]
    fn test_parse_catalog_keeps_templates_with_malformed_slots() {
        let nodes = vec![json!({
            "id": "pg-1",
            "name": "Postgres",
            "category": "Databases",
            "serializedConfig": {
                "services": {
                    "db": { "source": { "image": "postgres:15" } },
                    "backup": { "volumeMounts": { "v": {} } }
                }
            }
        })];

        let catalog = parse_catalog(nodes);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].config.services.len(), 2);
    }
}
