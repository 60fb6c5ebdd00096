pub mod dynamo_registry;
pub mod lambda_provisioner;

use std::future::Future;

use eden_core::lifecycle::LifecycleManager;

use crate::config::RuntimeConfig;
use dynamo_registry::DynamoRegistryStore;
use lambda_provisioner::LambdaProvisioningGateway;

pub type AwsLifecycleManager = LifecycleManager<DynamoRegistryStore, LambdaProvisioningGateway>;

/// Builds the DynamoDB store and Lambda gateway once per process.
pub fn aws_lifecycle_manager(
    sdk_config: &aws_config::SdkConfig,
    config: &RuntimeConfig,
) -> AwsLifecycleManager {
    LifecycleManager::new(
        DynamoRegistryStore::new(
            aws_sdk_dynamodb::Client::new(sdk_config),
            config.table_name.clone(),
        ),
        LambdaProvisioningGateway::new(
            aws_sdk_lambda::Client::new(sdk_config),
            config.provisioner_function.clone(),
        ),
    )
}

/// Drives an SDK future to completion from the synchronous store and gateway
/// traits. Requires the multi-threaded tokio runtime.
pub(crate) fn block_on_sdk<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
