use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use artist_analysis_bot::analysis::AnalysisService;
use artist_analysis_bot::catalog::{MusicCatalog, SpotifyCatalog};
use artist_analysis_bot::config::{AppConfig, CliConfig, FileConfig};
use artist_analysis_bot::push::{LinePushClient, PushSender};
use artist_analysis_bot::server::state::ServerState;
use artist_analysis_bot::server::{run_server, RequestsLoggingLevel, ServerConfig};
use artist_analysis_bot::storage::{FileStore, HttpFileStore};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to an optional TOML config file.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3009)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;

    let cli_config = CliConfig {
        port: cli_args.port,
        logging_level: cli_args.logging_level,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let catalog: Arc<dyn MusicCatalog> = Arc::new(
        SpotifyCatalog::new(
            config.spotify.client_id.clone(),
            config.spotify.client_secret.clone(),
            config.spotify.request_timeout_sec,
        )
        .context("Failed to create catalog client")?,
    );

    let analysis = Arc::new(AnalysisService::new(
        catalog.clone(),
        config.analysis.clone(),
    ));

    let push: Arc<dyn PushSender> = Arc::new(LinePushClient::new(
        config.line.access_token.clone(),
        config.line.request_timeout_sec,
    )?);

    let file_store: Arc<dyn FileStore> = Arc::new(HttpFileStore::new(
        config.storage.upload_url.clone(),
        config.storage.public_url.clone(),
        config.storage.request_timeout_sec,
    )?);

    let state = ServerState {
        config: ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
        },
        start_time: Instant::now(),
        catalog,
        analysis,
        push,
        file_store,
        delivery_mode: config.delivery_mode,
    };

    info!("Ready to serve at port {}!", config.port);
    run_server(state).await
}
