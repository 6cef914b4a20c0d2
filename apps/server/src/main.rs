//! Telekit gateway server binary
//!
//! Reads credentials and endpoints from the environment (a `.env` file is
//! honored for development), initializes tracing, and runs the gateway.

use anyhow::Context;
use tracing::info;

use telekit_client::oauth::OAuthConfig;
use telekit_gateway::{GatewayConfig, GatewayServer};

/// Initialize tracing with console and file logging
///
/// - Console: colored, compact format
/// - File: daily rotation under TELEKIT_LOG_DIR (default `./logs`)
fn init_tracing() -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let logs_dir = std::env::var("TELEKIT_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("could not create logs directory {logs_dir}"))?;

    // Daily rotation: telekit.2026-08-06.log
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("telekit")
        .filename_suffix("log")
        .build(&logs_dir)
        .context("could not create log file appender")?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG takes precedence, with sensible defaults for our crates
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info")
            .add_directive("telekit_client=debug".parse().expect("static directive"))
            .add_directive("telekit_gateway=debug".parse().expect("static directive"))
    });

    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_file(false)
        .with_line_number(false)
        .with_target(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    // Guard must be kept alive for the duration of the program
    Ok(guard)
}

fn oauth_config_from_env() -> anyhow::Result<OAuthConfig> {
    let api_host = std::env::var("TELEKIT_API_HOST").context("TELEKIT_API_HOST is not set")?;
    let client_id = std::env::var("TELEKIT_CLIENT_ID").context("TELEKIT_CLIENT_ID is not set")?;
    let client_secret =
        std::env::var("TELEKIT_CLIENT_SECRET").context("TELEKIT_CLIENT_SECRET is not set")?;

    let scopes = std::env::var("TELEKIT_SCOPES")
        .unwrap_or_else(|_| telekit_client::device::DEVICE_CAPABILITIES_SCOPE.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(OAuthConfig::new(api_host, client_id, client_secret).with_scopes(scopes))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let _guard = init_tracing()?;

    let config = GatewayConfig::from_env();
    let oauth = oauth_config_from_env()?;

    info!("[Server] Telekit gateway {}", env!("CARGO_PKG_VERSION"));

    GatewayServer::new(config, oauth).run().await
}
