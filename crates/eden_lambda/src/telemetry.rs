use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// JSON lines on stdout for CloudWatch; no ANSI escapes.
pub fn init_lambda_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_target(false)
        .init();
}

pub fn init_server_tracing() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}
