//! `rollcall`: offline event check-in from the command line.
//!
//! # Usage
//!
//! ```text
//! rollcall import roster.csv
//! rollcall search jan sm
//! rollcall in 42 --operator door-1
//! rollcall undo
//! rollcall --json stats
//! ```
//!
//! Settings come from `rollcall.toml` (or `--config`), then `ROLLCALL_*`
//! environment variables, then flags.

mod commands;
mod output;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use commands::Context;
use rollcall_core::{attendance::Toggle, guest::GuestId, roster::ImportMode};
use rollcall_store_sqlite::SqliteDirectory;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{Settings, expand_tilde};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about = "Offline event check-in")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "rollcall.toml")]
  config: PathBuf,

  /// Path to the SQLite store (overrides `store_path`).
  #[arg(long, global = true, env = "ROLLCALL_STORE")]
  store: Option<PathBuf>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create the store if it does not exist.
  Init,

  /// Load guests from a roster CSV.
  Import {
    file: PathBuf,
    #[arg(long, value_enum, default_value_t = ModeArg::Replace)]
    mode: ModeArg,
  },

  /// Find guests by name or host.
  Search {
    query: Vec<String>,
    #[arg(short, long)]
    limit: Option<usize>,
  },

  /// Find hosts, with attendance counts.
  Hosts {
    query: Vec<String>,
    #[arg(short, long)]
    limit: Option<usize>,
  },

  /// List every guest of one host.
  Host { name: Vec<String> },

  /// Show one guest with its check-in history.
  Show { id: GuestId },

  /// Check a guest in.
  In {
    id: GuestId,
    #[arg(long)]
    operator: Option<String>,
  },

  /// Check a guest out.
  Out {
    id: GuestId,
    #[arg(long)]
    operator: Option<String>,
    /// Record this as a forced check-out.
    #[arg(long)]
    force: bool,
  },

  /// Revert the most recent check-in or check-out.
  Undo,

  /// Write an attendance snapshot CSV.
  Export {
    #[arg(long)]
    dir: Option<PathBuf>,
  },

  /// Print attendance totals and top hosts.
  Stats,

  /// Rebuild the search index from the guest table.
  Reindex,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
  /// Wipe the directory, then load the roster.
  Replace,
  /// Add guests whose names are not already present.
  Append,
}

impl From<ModeArg> for ImportMode {
  fn from(mode: ModeArg) -> Self {
    match mode {
      ModeArg::Replace => ImportMode::Replace,
      ModeArg::Append => ImportMode::Append,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let store_path = cli
    .store
    .as_deref()
    .map(expand_tilde)
    .unwrap_or_else(|| settings.store_path.clone());
  let dir = SqliteDirectory::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;

  let ctx = Context {
    json:         cli.json,
    operator:     settings.operator.clone(),
    search_limit: settings.search_limit,
  };

  match cli.command {
    Command::Init => commands::init(&ctx, &store_path),
    Command::Import { file, mode } => commands::import(&dir, &ctx, &file, mode.into()).await,
    Command::Search { query, limit } => commands::search(&dir, &ctx, &query.join(" "), limit).await,
    Command::Hosts { query, limit } => commands::hosts(&dir, &ctx, &query.join(" "), limit).await,
    Command::Host { name } => commands::host(&dir, &ctx, &name.join(" ")).await,
    Command::Show { id } => commands::show(&dir, &ctx, id).await,
    Command::In { id, operator } => {
      commands::toggle(&dir, &ctx, Toggle::check_in(id), operator).await
    }
    Command::Out { id, operator, force } => {
      let toggle = if force { Toggle::check_out(id).forced() } else { Toggle::check_out(id) };
      commands::toggle(&dir, &ctx, toggle, operator).await
    }
    Command::Undo => commands::undo(&dir, &ctx).await,
    Command::Export { dir: out_dir } => {
      let out_dir = out_dir.unwrap_or_else(|| settings.export_dir());
      commands::export(&dir, &ctx, &out_dir).await
    }
    Command::Stats => commands::stats(&dir, &ctx).await,
    Command::Reindex => {
      dir.rebuild_search_index().await.context("reindex failed")?;
      output::emit(ctx.json, &serde_json::json!({ "reindexed": true }), |_| {
        println!("search index rebuilt");
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_definition_is_consistent() { Cli::command().debug_assert(); }

  #[test]
  fn search_joins_free_text() {
    let cli = Cli::try_parse_from(["rollcall", "--json", "search", "jan", "sm", "-l", "5"]).unwrap();
    assert!(cli.json);
    let Command::Search { query, limit } = cli.command else {
      panic!("expected search")
    };
    assert_eq!(query.join(" "), "jan sm");
    assert_eq!(limit, Some(5));
  }

  #[test]
  fn out_accepts_force() {
    let cli = Cli::try_parse_from(["rollcall", "out", "7", "--force", "--operator", "door"]).unwrap();
    let Command::Out { id, operator, force } = cli.command else {
      panic!("expected out")
    };
    assert_eq!(id, 7);
    assert_eq!(operator.as_deref(), Some("door"));
    assert!(force);
  }

  #[test]
  fn import_mode_is_a_closed_set() {
    let cli = Cli::try_parse_from(["rollcall", "import", "roster.csv"]).unwrap();
    let Command::Import { mode, .. } = cli.command else {
      panic!("expected import")
    };
    assert_eq!(ImportMode::from(mode), ImportMode::Replace);

    let cli = Cli::try_parse_from(["rollcall", "import", "roster.csv", "--mode", "append"]).unwrap();
    let Command::Import { file, mode } = cli.command else {
      panic!("expected import")
    };
    assert_eq!(file, PathBuf::from("roster.csv"));
    assert_eq!(ImportMode::from(mode), ImportMode::Append);

    assert!(Cli::try_parse_from(["rollcall", "import", "roster.csv", "--mode", "merge"]).is_err());
  }
}
