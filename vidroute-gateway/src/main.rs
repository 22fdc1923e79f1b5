//! # Vidroute Gateway Binary
//!
//! Entry point for the orchestration service. Loads configuration, sets up
//! tracing, and serves the HTTP API.
//!
//! ```bash
//! # Defaults: 127.0.0.1:8000, execution API at http://localhost:3000
//! vidroute-gateway
//!
//! # Custom configuration file and bind address
//! vidroute-gateway --config vidroute.toml --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use std::net::SocketAddr;
use vidroute_gateway::{config::Config, server::create_server};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Missing file means defaults.
    #[arg(short, long, default_value = "vidroute.toml")]
    config: String,

    /// Override the configured bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the configured log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(&config.logging.level)
        .init();

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let app = create_server(config)?;

    tracing::info!("Starting vidroute gateway on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
