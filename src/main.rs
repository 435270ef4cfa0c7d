mod api;
mod config;
mod provider;
mod reconcile;
mod suffix;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::info;
use time::{macros::format_description, OffsetDateTime};

use provider::digitalocean::DigitalOceanClient;
use reconcile::Reconciler;
use suffix::PublicSuffixSplitter;

#[derive(Parser, Debug)]
#[command(name = "do-ddns")]
#[command(about = "A DynDNS-compatible update endpoint backed by the DigitalOcean DNS API")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

fn init_logger(default_level: &str) {
    let timestamp_format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

    // RUST_LOG takes precedence over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(move |buf, record| {
            let timestamp = OffsetDateTime::now_utc()
                .format(&timestamp_format)
                .unwrap_or_else(|_| "-".to_string());
            writeln!(
                buf,
                "{} {:<5} {} {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (before logger init)
    let config = config::Config::load(&args.config)?;

    init_logger(&config.server.log_level);

    info!("Loaded configuration from: {}", args.config);
    info!(
        "Using DigitalOcean API at {} (record TTL {}s)",
        config.digitalocean.api_base, config.digitalocean.record_ttl
    );

    let client = DigitalOceanClient::new(
        &config.digitalocean.api_base,
        &config.digitalocean.api_token,
        config.digitalocean.timeout(),
    )?;
    let reconciler = Reconciler::new(
        Arc::new(client),
        Arc::new(PublicSuffixSplitter),
        config.digitalocean.record_ttl,
    );

    let app = api::create_router(reconciler);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);
    info!("DynDNS endpoint: GET {}?hostname=<fqdn>&myip=<ipv4>", api::UPDATE_PATH);

    axum::serve(listener, app).await?;

    Ok(())
}
