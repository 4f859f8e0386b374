use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ProvisionError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://backboard.railway.app/graphql/v2";

const VALIDATE_TOKEN_QUERY: &str = r#"
  query {
    projects {
      edges {
        node {
          id
        }
      }
    }
  }
"#;

#[derive(Debug, Deserialize)]
pub(crate) struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

fn join_errors(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// 平台 GraphQL API 的傳輸層：加上 Bearer token 並解開回應信封
pub struct GraphQlClient {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl GraphQlClient {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_config(config: &dyn ConfigProvider) -> Result<Self> {
        Self::new(
            config.api_endpoint(),
            config.api_token().map(str::to_string),
            config.request_timeout(),
        )
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t| !t.trim().is_empty());
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let token = self
            .token
            .as_deref()
            .ok_or(ProvisionError::MissingCredential)?;

        tracing::debug!("GraphQL request to {}: {}", self.endpoint, query.trim());
        tracing::debug!("GraphQL variables: {}", variables);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("GraphQL response status: {}", status);

        if !status.is_success() {
            // 部分錯誤會以非 2xx 狀態碼回傳完整的 GraphQL 信封
            if let Ok(envelope) = serde_json::from_str::<GraphQlResponse<serde_json::Value>>(&body) {
                if !envelope.errors.is_empty() {
                    return Err(ProvisionError::Application {
                        message: join_errors(&envelope.errors),
                    });
                }
            }
            return Err(ProvisionError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphQlResponse<T> = serde_json::from_str(&body)?;

        if !envelope.errors.is_empty() {
            return Err(ProvisionError::Application {
                message: join_errors(&envelope.errors),
            });
        }

        envelope.data.ok_or_else(|| ProvisionError::Application {
            message: "response contained no data".to_string(),
        })
    }

    /// 以輕量查詢確認 token 可用
    pub async fn validate_token(&self) -> Result<()> {
        match self
            .request::<serde_json::Value>(VALIDATE_TOKEN_QUERY, serde_json::json!({}))
            .await
        {
            Ok(_) => Ok(()),
            Err(ProvisionError::MissingCredential) => Err(ProvisionError::MissingCredential),
            Err(e) => Err(ProvisionError::ConfigError {
                message: format!("Invalid API token: {}", e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_counts_as_missing() {
        let client =
            GraphQlClient::new(DEFAULT_API_ENDPOINT, Some("   ".to_string()), Duration::from_secs(5))
                .unwrap();
        assert!(!client.has_token());
        assert!(client.with_token("abc").has_token());
    }

    #[tokio::test]
    async fn test_request_without_token_fails_before_sending() {
        // 無效位址也不會被連線，因為 token 檢查在前
        let client = GraphQlClient::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        let err = client
            .request::<serde_json::Value>("query { me { id } }", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::MissingCredential));
    }

    #[test]
    fn test_join_errors() {
        let errors = vec![
            GraphQlError {
                message: "Not Authorized".to_string(),
            },
            GraphQlError {
                message: "Problem processing request".to_string(),
            },
        ];
        assert_eq!(join_errors(&errors), "Not Authorized; Problem processing request");
    }
}
