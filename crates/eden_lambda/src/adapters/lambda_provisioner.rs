use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use eden_core::profile::Profile;
use eden_core::provisioning::{
    DecommissionedEnvironment, ProvisionedEnvironment, ProvisioningError, ProvisioningGateway,
    ProvisioningRequest,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::block_on_sdk;

/// Provisioning gateway backed by a synchronous invocation of the function
/// that owns ECR, ECS, ELB and Route 53 changes.
#[derive(Debug, Clone)]
pub struct LambdaProvisioningGateway {
    client: aws_sdk_lambda::Client,
    function_name: String,
}

impl LambdaProvisioningGateway {
    pub fn new(client: aws_sdk_lambda::Client, function_name: impl Into<String>) -> Self {
        Self {
            client,
            function_name: function_name.into(),
        }
    }

    fn invoke<T: DeserializeOwned>(&self, request: &ProvisioningRequest) -> Result<T, ProvisioningError> {
        let payload = serde_json::to_vec(request).map_err(|error| {
            ProvisioningError::new(format!("failed to encode provisioning request: {error}"))
        })?;

        let output = block_on_sdk(
            self.client
                .invoke()
                .function_name(self.function_name.clone())
                .invocation_type(InvocationType::RequestResponse)
                .payload(Blob::new(payload))
                .send(),
        )
        .map_err(|error| {
            ProvisioningError::new(format!(
                "failed to invoke provisioning function: {}",
                DisplayErrorContext(&error)
            ))
        })?;

        decode_invocation_result(
            output.function_error(),
            output.payload().map(|blob| blob.as_ref()),
        )
    }
}

impl ProvisioningGateway for LambdaProvisioningGateway {
    fn create(
        &self,
        name: &str,
        image_uri: &str,
        profile: &Profile,
    ) -> Result<ProvisionedEnvironment, ProvisioningError> {
        self.invoke(&ProvisioningRequest::create(name, image_uri, profile))
    }

    fn delete(
        &self,
        name: &str,
        profile: &Profile,
    ) -> Result<DecommissionedEnvironment, ProvisioningError> {
        self.invoke(&ProvisioningRequest::delete(name, profile))
    }
}

/// Interprets a RequestResponse invocation result. A reported function error
/// wins over the payload; its `errorMessage` is used when present.
pub fn decode_invocation_result<T: DeserializeOwned>(
    function_error: Option<&str>,
    payload: Option<&[u8]>,
) -> Result<T, ProvisioningError> {
    let payload = payload.unwrap_or_default();

    if let Some(kind) = function_error {
        let message = serde_json::from_slice::<Value>(payload)
            .ok()
            .and_then(|value| {
                value
                    .get("errorMessage")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| String::from_utf8_lossy(payload).into_owned());
        return Err(ProvisioningError::new(format!("{kind}: {message}")));
    }

    serde_json::from_slice(payload).map_err(|error| {
        ProvisioningError::new(format!("invalid provisioning response: {error}"))
    })
}
