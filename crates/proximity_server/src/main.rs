//! Proximity server CLI
//!
//! Run with: `cargo run -p proximity_server -- --help`

use clap::Parser;
use proximity_server::{init_logging, ProximityServer, ServerConfig, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    let telemetry_config = TelemetryConfig::with_server_config(&config);
    init_logging(&telemetry_config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = config.storage_type_str(),
        addr = %config.listen_addr,
        radius_m = config.radius_m,
        lookback_secs = config.lookback_secs,
        trail_secs = config.trail_secs,
        seed_demo = config.seed_demo,
        log_format = ?telemetry_config.log_format,
        "Starting proximity server"
    );

    let server = ProximityServer::new(config)?;
    server.run().await?;
    Ok(())
}
