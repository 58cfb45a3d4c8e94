//! Layered settings: defaults, then `rollcall.toml`, then `ROLLCALL_*`
//! environment variables. Command-line flags are applied by the caller.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rollcall_core::query::DEFAULT_LIMIT;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  /// Recorded on check-ins and check-outs when no `--operator` is given.
  #[serde(default)]
  pub operator:     Option<String>,
  #[serde(default = "default_search_limit")]
  pub search_limit: usize,
  #[serde(default)]
  pub export_dir:   Option<PathBuf>,
}

fn default_store_path() -> PathBuf { PathBuf::from("rollcall.db") }

fn default_search_limit() -> usize { DEFAULT_LIMIT }

impl Settings {
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("ROLLCALL").try_parsing(true))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    settings.export_dir = settings.export_dir.as_deref().map(expand_tilde);
    Ok(settings)
  }

  /// Where snapshots go: the configured directory, else the desktop, else
  /// the working directory.
  pub fn export_dir(&self) -> PathBuf {
    self
      .export_dir
      .clone()
      .or_else(dirs::desktop_dir)
      .unwrap_or_else(|| PathBuf::from("."))
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings.search_limit, DEFAULT_LIMIT);
    assert_eq!(settings.operator, None);
  }

  #[test]
  fn file_values_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollcall.toml");
    std::fs::write(
      &path,
      "store_path = \"/tmp/party.db\"\noperator = \"door-1\"\nsearch_limit = 40\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("/tmp/party.db"));
    assert_eq!(settings.operator.as_deref(), Some("door-1"));
    assert_eq!(settings.search_limit, 40);
  }

  #[test]
  fn explicit_export_dir_wins() {
    let settings = Settings {
      store_path:   default_store_path(),
      operator:     None,
      search_limit: DEFAULT_LIMIT,
      export_dir:   Some(PathBuf::from("/srv/exports")),
    };
    assert_eq!(settings.export_dir(), PathBuf::from("/srv/exports"));
  }

  #[test]
  fn tilde_is_expanded() {
    let expanded = expand_tilde(Path::new("~/rollcall.db"));
    if let Some(home) = dirs::home_dir() {
      assert_eq!(expanded, home.join("rollcall.db"));
    }
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }
}
