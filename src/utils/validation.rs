use crate::domain::model::ProvisionRequest;
use crate::utils::error::{ProvisionError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ProvisionError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ProvisionError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ProvisionError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ProvisionError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ProvisionError::ConfigError {
        message: format!("Missing required field: {}", field_name),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProvisionError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ProvisionError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

impl Validate for ProvisionRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("project", &self.project_id)?;
        validate_non_empty_string("environment", &self.environment_id)?;
        validate_non_empty_string("region", &self.region)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProvisionSource;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_endpoint", "https://backboard.railway.app/graphql/v2").is_ok());
        assert!(validate_url("api_endpoint", "http://localhost:4000").is_ok());
        assert!(validate_url("api_endpoint", "").is_err());
        assert!(validate_url("api_endpoint", "not a url").is_err());

        match validate_url("api_endpoint", "ftp://example.com").unwrap_err() {
            ProvisionError::InvalidConfigValue { field, reason, .. } => {
                assert_eq!(field, "api_endpoint");
                assert!(reason.contains("ftp"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_positive_number("variable_batch_size", 10, 1).is_ok());
        assert!(validate_positive_number("variable_batch_size", 0, 1).is_err());
        assert!(validate_range("request_timeout_seconds", 30u64, 1, 600).is_ok());
        assert!(validate_range("request_timeout_seconds", 0u64, 1, 600).is_err());
        assert!(validate_range("request_timeout_seconds", 601u64, 1, 600).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("p1".to_string());
        assert_eq!(validate_required_field("project", &present).unwrap(), "p1");

        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("project", &missing),
            Err(ProvisionError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_request_requires_identifiers() {
        let mut request = ProvisionRequest {
            project_id: "p1".to_string(),
            environment_id: "e1".to_string(),
            region: "us-west1".to_string(),
            source: ProvisionSource::Template("pg-1".to_string()),
            name: None,
        };
        assert!(request.validate().is_ok());

        request.environment_id = "  ".to_string();
        assert!(request.validate().is_err());
    }
}
