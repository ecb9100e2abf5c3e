use std::io;

use clap::Parser;
use tracing::debug;

use lonn_cli::cli::Cli;
use lonn_cli::{build_registry, commands, logging, resolve_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli.global)?;
    logging::init(&config.logging.level, config.logging.file.as_deref())?;

    let db_config = config.db_config();
    debug!(backend = %db_config.backend, "connecting");
    let registry = build_registry();
    let repo = registry.create(&db_config).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(cli.command, repo.as_ref(), &config, &mut out).await
}
