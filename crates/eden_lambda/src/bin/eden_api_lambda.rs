use std::sync::Arc;

use eden_lambda::adapters::{aws_lifecycle_manager, AwsLifecycleManager};
use eden_lambda::config::RuntimeConfig;
use eden_lambda::handlers::event::{handle_api_event, ApiGatewayResponse};
use eden_lambda::telemetry::init_lambda_tracing;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

async fn handle_request(
    event: LambdaEvent<Value>,
    manager: &AwsLifecycleManager,
) -> Result<ApiGatewayResponse, Error> {
    let response = handle_api_event(event.payload, manager);
    info!(
        request_id = %event.context.request_id,
        status_code = response.status_code,
        "request handled"
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_lambda_tracing();

    let config = RuntimeConfig::from_env()?;
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let manager = Arc::new(aws_lifecycle_manager(&sdk_config, &config));
    info!(table = %config.table_name, "eden api lambda ready");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let manager = Arc::clone(&manager);
        async move { handle_request(event, &manager).await }
    }))
    .await
}
