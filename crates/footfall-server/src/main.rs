//! footfall-server: live visitor presence over WebSocket.
//!
//! Browsers connect, report the page they are on, and receive an aggregate
//! of every open connection (total, per page, per country) whenever that
//! aggregate changes.

mod connection;
mod handshake;
mod protocol;
mod server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use footfall_config::{config_to_json, load_config, validation, FootfallConfig, LoggingConfig};
use footfall_presence::{GeoResolver, HttpGeoResolver, HubConfig, PresenceHub};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::connection::ConnectionSettings;
use crate::server::{serve, ServerContext};

#[derive(Parser)]
#[command(name = "footfall-server", about = "Live visitor presence over WebSocket")]
struct Args {
    /// Config file. Defaults to the platform config directory.
    #[arg(short, long, env = "FOOTFALL_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long, env = "FOOTFALL_PORT", value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long, env = "FOOTFALL_BIND")]
    bind: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, env = "FOOTFALL_JSON_LOGS")]
    json_logs: bool,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> footfall_common::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    validation::validate(&config)?;

    if args.print_config {
        println!("{}", config_to_json(&config));
        return Ok(());
    }

    init_tracing(&config.logging);

    let resolver: Option<Arc<dyn GeoResolver>> = if config.geo.enabled {
        let timeout = Duration::from_millis(config.geo.timeout_ms.into());
        Some(Arc::new(HttpGeoResolver::new(config.geo.endpoint.clone(), timeout)?))
    } else {
        None
    };

    let hub = PresenceHub::new(HubConfig {
        outbound_queue: config.presence.outbound_queue as usize,
        max_page_length: config.presence.max_page_length as usize,
        unknown_page: config.presence.unknown_page.clone(),
    });
    let ctx = Arc::new(ServerContext {
        hub,
        resolver,
        settings: ConnectionSettings::from_config(&config),
    });

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(geo = config.geo.enabled, "footfall-server listening on {}", addr);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl-C"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
        signal.cancel();
    });

    serve(listener, ctx, shutdown).await;
    tracing::info!("footfall-server stopped");
    Ok(())
}

fn apply_overrides(config: &mut FootfallConfig, args: &Args) {
    if let Some(port) = args.port {
        config.server.port = port.into();
    }
    if let Some(bind) = &args.bind {
        config.server.bind_address = bind.clone();
    }
    if args.json_logs {
        config.logging.json = true;
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
