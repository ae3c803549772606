use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use xthread_lib::Config;
use xthread_web::{run_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // A local .env is optional
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(config.json_logs);

    info!("Thread poster starting");

    let missing = config.credentials.missing();
    if !missing.is_empty() {
        warn!(
            missing = ?missing,
            "Credentials not set; thread requests will fail authentication"
        );
    }

    info!(
        api_base_url = %config.api_base_url,
        post_delay_ms = u64::try_from(config.post_delay.as_millis()).unwrap_or(u64::MAX),
        "Service configured"
    );

    let state = Arc::new(AppState::from_config(&config));
    run_server(state, &config.bind_addr()).await
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        // Same shape the log collector expects from the service in production
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
