use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use services::{AppServices, CatalogSource, Clock};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod render;

use cli::Cli;

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
    }
    Ok(())
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_filter);

    if cli.storage_key.trim().is_empty() {
        bail!("--storage-key must not be empty");
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    let catalog = cli
        .catalog
        .clone()
        .map_or(CatalogSource::Builtin, CatalogSource::File);
    tracing::debug!(db = %db_url, key = %cli.storage_key, ?catalog, "opening progress store");

    let services = AppServices::new_sqlite(&db_url, &cli.storage_key, &catalog, Clock::system())
        .await
        .context("failed to open progress store")?;
    if services.progress_was_reset() {
        eprintln!("Stored progress could not be read and was reset.");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(cli.command, &services, &mut out).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
