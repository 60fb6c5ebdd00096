//! Boundary to the external routine that creates and destroys environments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::{Profile, ProfileConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedEnvironment {
    pub name: String,
    #[serde(alias = "cname")]
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecommissionedEnvironment {
    pub name: String,
}

/// Opaque provisioning failure: only a message crosses this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProvisioningError {
    message: String,
}

impl ProvisioningError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningAction {
    Create,
    Delete,
}

/// Payload handed to a remote provisioning function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningRequest {
    pub action: ProvisioningAction,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    pub config: ProfileConfig,
}

impl ProvisioningRequest {
    pub fn create(name: &str, image_uri: &str, profile: &Profile) -> Self {
        Self {
            action: ProvisioningAction::Create,
            name: name.to_string(),
            image_uri: Some(image_uri.to_string()),
            config: profile.config.clone(),
        }
    }

    pub fn delete(name: &str, profile: &Profile) -> Self {
        Self {
            action: ProvisioningAction::Delete,
            name: name.to_string(),
            image_uri: None,
            config: profile.config.clone(),
        }
    }
}

/// Each call is a single best-effort attempt. Implementations give no
/// idempotency, retry or timeout guarantee.
pub trait ProvisioningGateway {
    fn create(
        &self,
        name: &str,
        image_uri: &str,
        profile: &Profile,
    ) -> Result<ProvisionedEnvironment, ProvisioningError>;

    fn delete(
        &self,
        name: &str,
        profile: &Profile,
    ) -> Result<DecommissionedEnvironment, ProvisioningError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_response_accepts_cname_field() {
        let provisioned: ProvisionedEnvironment =
            serde_json::from_value(json!({"name": "web1", "cname": "web1.dev.example.com"}))
                .expect("response should parse");
        assert_eq!(provisioned.endpoint, "web1.dev.example.com");
    }

    #[test]
    fn delete_request_omits_image_uri() {
        let profile = Profile {
            name: "default".to_string(),
            config: serde_json::Map::new(),
        };
        let payload = serde_json::to_value(ProvisioningRequest::delete("web1", &profile))
            .expect("request should serialize");
        assert_eq!(
            payload,
            json!({"action": "delete", "name": "web1", "config": {}})
        );
    }
}
