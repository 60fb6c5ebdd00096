use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use eden_lambda::adapters::aws_lifecycle_manager;
use eden_lambda::config::{
    RuntimeConfig, BIND_ADDR_ENV, DEFAULT_BIND_ADDR, PROVISIONER_FUNCTION_ENV, TABLE_ENV,
};
use eden_lambda::handlers::http::router;
use eden_lambda::telemetry::init_server_tracing;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "eden_api_server",
    about = "Serve the environment registry API over HTTP"
)]
struct Cli {
    /// Registry table name
    #[arg(long, env = TABLE_ENV)]
    table: String,
    /// Name or ARN of the provisioning function
    #[arg(long, env = PROVISIONER_FUNCTION_ENV)]
    provisioner_function: String,
    /// Listen address
    #[arg(long, env = BIND_ADDR_ENV, default_value = DEFAULT_BIND_ADDR)]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_server_tracing();
    let cli = Cli::parse();

    let config = RuntimeConfig {
        table_name: cli.table,
        provisioner_function: cli.provisioner_function,
    };
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let manager = Arc::new(aws_lifecycle_manager(&sdk_config, &config));

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    info!(addr = %cli.bind, table = %config.table_name, "eden api server listening");
    axum::serve(listener, router(manager)).await?;
    Ok(())
}
