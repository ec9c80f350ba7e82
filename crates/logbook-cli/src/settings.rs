//! Layered configuration: optional TOML file, then `LOGBOOK_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite file; a leading `~/` is expanded.
  pub store_path:      PathBuf,
  /// IANA zone name of the office.
  pub office_timezone: String,
  /// Recorded as the archiving actor unless `--by` is given.
  pub operator:        String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path:      PathBuf::from("~/.local/share/logbook/logbook.db"),
      office_timezone: "Asia/Manila".to_owned(),
      operator:        "ITSM".to_owned(),
    }
  }
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LOGBOOK"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
