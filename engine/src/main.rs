// Nexus task assistant
// Main entry point for the nexus binary

use clap::Parser;
use nexus_engine::cli::{Cli, Command};
use nexus_engine::conductor::Session;
use nexus_engine::config::Config;
use nexus_engine::handlers::{
    handle_ask, handle_clear, handle_export, handle_history, handle_import, handle_kb,
    handle_learn, handle_search, handle_serve, handle_stats, OutputFormat,
};
use nexus_engine::telemetry::init_telemetry_with_level;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log overrides the configured level
    init_telemetry_with_level(cli.log.as_deref().unwrap_or(&config.core.log_level));

    tracing::info!("Nexus Engine v{}", env!("CARGO_PKG_VERSION"));

    let session = Arc::new(Session::from_config(&config)?);

    match cli.command {
        Command::Ask { query, mode, file } => {
            handle_ask(&session, &query, mode, file.as_deref(), format).await
        }
        Command::History { limit } => handle_history(&session, limit, format),
        Command::Clear => handle_clear(&session, format),
        Command::Stats => handle_stats(&session, format),
        Command::Search { text, limit } => handle_search(&session, &text, limit, format),
        Command::Export { path } => handle_export(&session, &path, format),
        Command::Import { path } => handle_import(&session, &path, format),
        Command::Learn { source, content } => handle_learn(&session, &source, &content, format),
        Command::Kb { query } => handle_kb(&session, query.as_deref(), format),
        Command::Serve { host, port } => handle_serve(session, &config, host, port).await,
    }
}
