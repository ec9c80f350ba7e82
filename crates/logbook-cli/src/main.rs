//! `logbook`: command-line front end for the document logbook.
//!
//! Reads `logbook.toml` (or the path given with `--config`), overlays
//! `LOGBOOK_*` environment variables, opens the SQLite store and runs one
//! subcommand.
//!
//! # Usage
//!
//! ```text
//! logbook outgoing DTS-0042 --type "Purchase Request" --route ORD \
//!   --sent "2025-06-02 09:00:00" --released "June 6, 2025 at 10:00 AM"
//! logbook deduct DTS0042 1 --remarks "courier delay"
//! logbook processing --month 6 --year 2025 --json
//! ```

mod commands;
mod output;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use logbook_core::{lifecycle::Actor, temporal::OfficeZone};
use logbook_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  commands::{Command, Context},
  settings::Settings,
};

#[derive(Parser, Debug)]
#[command(name = "logbook", version, about = "Document tracking logbook")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "logbook.toml", env = "LOGBOOK_CONFIG")]
  config: PathBuf,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout carries only results.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let zone = OfficeZone::from_name(&settings.office_timezone)
    .context("invalid office_timezone")?;

  let store_path = settings.store_path();
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_zone(zone);
  tracing::debug!(?store_path, timezone = %zone.tz(), "store opened");

  let ctx = Context {
    store,
    zone,
    operator: Actor::new(settings.operator),
    json: cli.json,
  };
  commands::run(cli.command, &ctx).await
}
