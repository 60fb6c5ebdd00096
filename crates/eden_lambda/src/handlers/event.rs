use eden_core::contract::QueryParameters;
use eden_core::envelope::Envelope;
use eden_core::error::LifecycleError;
use eden_core::lifecycle::LifecycleManager;
use eden_core::provisioning::ProvisioningGateway;
use eden_core::registry::RegistryStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// API Gateway proxy integration response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Map<String, Value>,
    pub body: String,
}

impl From<Envelope> for ApiGatewayResponse {
    fn from(envelope: Envelope) -> Self {
        Self {
            is_base64_encoded: false,
            status_code: envelope.status_code,
            headers: Map::new(),
            body: envelope.body_json(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    #[serde(default)]
    resource: Option<String>,
    #[serde(rename = "queryStringParameters", default)]
    query_string_parameters: Option<QueryParameters>,
}

pub fn handle_api_event<S, G>(event: Value, manager: &LifecycleManager<S, G>) -> ApiGatewayResponse
where
    S: RegistryStore,
    G: ProvisioningGateway,
{
    let envelope = match serde_json::from_value::<ApiEvent>(event) {
        Ok(event) => manager.handle(
            event.resource.as_deref().unwrap_or_default(),
            event.query_string_parameters.as_ref(),
        ),
        Err(error) => Envelope::from_error(&LifecycleError::MalformedEvent(error.to_string())),
    };
    envelope.into()
}

#[cfg(test)]
mod tests {
    use eden_core::registry::{EnvironmentKey, InMemoryRegistryStore};
    use eden_core::test_helpers::RecordingGateway;
    use serde_json::json;

    use super::*;

    fn manager() -> LifecycleManager<InMemoryRegistryStore, RecordingGateway> {
        LifecycleManager::new(
            InMemoryRegistryStore::new("eden").with_profile("default", &json!({"cluster": "dev"})),
            RecordingGateway::new("dev.example.com"),
        )
    }

    #[test]
    fn create_event_returns_proxy_response() {
        let manager = manager();
        let response = handle_api_event(
            json!({
                "resource": "/api/v1/create",
                "queryStringParameters": {"name": "web1", "image_uri": "registry/img:tag"}
            }),
            &manager,
        );

        assert_eq!(response.status_code, 200);
        assert!(!response.is_base64_encoded);
        assert!(response.headers.is_empty());
        let body: Value = serde_json::from_str(&response.body).expect("body should parse");
        assert_eq!(body["endpoint"], json!("web1.dev.example.com"));
        assert!(manager
            .store()
            .environment(&EnvironmentKey::new("default", "web1"))
            .is_some());
    }

    #[test]
    fn null_query_parameters_are_a_validation_error() {
        let manager = manager();
        let response = handle_api_event(
            json!({"resource": "/api/v1/delete", "queryStringParameters": null}),
            &manager,
        );

        assert_eq!(response.status_code, 400);
        let body: Value = serde_json::from_str(&response.body).expect("body should parse");
        assert_eq!(
            body,
            json!({
                "status": "error",
                "message": "Necessary query string parameters not specified: name",
            })
        );
        assert!(manager.gateway().calls().is_empty());
    }

    #[test]
    fn serialized_response_uses_proxy_field_names() {
        let manager = manager();
        let response = handle_api_event(json!({"resource": "/api/v1/unknown"}), &manager);

        let value = serde_json::to_value(&response).expect("response should serialize");
        assert_eq!(value["isBase64Encoded"], json!(false));
        assert_eq!(value["statusCode"], json!(400));
        assert_eq!(value["headers"], json!({}));
    }

    #[test]
    fn non_object_event_is_rejected() {
        let manager = manager();
        let response = handle_api_event(json!("create please"), &manager);

        assert_eq!(response.status_code, 400);
    }
}
