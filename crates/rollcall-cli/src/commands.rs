//! One handler per subcommand, written against the [`Directory`] trait.

use std::path::Path;

use anyhow::Context as _;
use chrono::Utc;
use rollcall_core::{
  attendance::{Toggle, ToggleStatus, UndoStatus},
  guest::GuestId,
  roster::ImportMode,
  store::Directory,
};
use serde::Serialize;
use serde_json::json;

use crate::output::{self, GuestDetail, emit};

/// Resolved per-invocation options shared by every handler.
pub struct Context {
  pub json:         bool,
  pub operator:     Option<String>,
  pub search_limit: usize,
}

// ─── Roster ──────────────────────────────────────────────────────────────────

pub fn init(ctx: &Context, store_path: &Path) -> anyhow::Result<()> {
  emit(ctx.json, &json!({ "path": store_path }), |_| {
    println!("store ready at {}", store_path.display());
  })
}

pub async fn import<D: Directory>(
  dir: &D,
  ctx: &Context,
  file: &Path,
  mode: ImportMode,
) -> anyhow::Result<()> {
  let rows = rollcall_roster::read_roster(file)
    .with_context(|| format!("failed to read roster {}", file.display()))?;

  let summary = dir.import_rows(rows, mode).await.context("import failed")?;
  emit(ctx.json, &summary, |s| {
    println!(
      "{mode}: inserted {} guests from {} rows",
      s.inserted_guests, s.total_rows_processed
    );
  })
}

pub async fn export<D: Directory>(dir: &D, ctx: &Context, out_dir: &Path) -> anyhow::Result<()> {
  let rows = dir.snapshot().await.context("failed to read snapshot")?;
  let path = rollcall_roster::write_snapshot(&rows, out_dir, Utc::now())
    .with_context(|| format!("failed to write snapshot into {}", out_dir.display()))?;

  emit(ctx.json, &json!({ "path": path, "rows": rows.len() }), |_| {
    println!("wrote {} rows to {}", rows.len(), path.display());
  })
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

pub async fn search<D: Directory>(
  dir: &D,
  ctx: &Context,
  query: &str,
  limit: Option<usize>,
) -> anyhow::Result<()> {
  let guests = dir
    .search_guests(query, limit.unwrap_or(ctx.search_limit))
    .await
    .context("guest search failed")?;
  emit(ctx.json, guests.as_slice(), output::guest_list)
}

pub async fn hosts<D: Directory>(
  dir: &D,
  ctx: &Context,
  query: &str,
  limit: Option<usize>,
) -> anyhow::Result<()> {
  let hosts = dir
    .search_hosts(query, limit.unwrap_or(ctx.search_limit))
    .await
    .context("host search failed")?;
  emit(ctx.json, hosts.as_slice(), output::host_list)
}

pub async fn host<D: Directory>(dir: &D, ctx: &Context, name: &str) -> anyhow::Result<()> {
  let guests = dir.guests_for_host(name).await.context("host lookup failed")?;
  emit(ctx.json, guests.as_slice(), output::guest_list)
}

pub async fn show<D: Directory>(dir: &D, ctx: &Context, id: GuestId) -> anyhow::Result<()> {
  let guest = dir
    .guest(id)
    .await
    .context("guest lookup failed")?
    .with_context(|| format!("no guest with id {id}"))?;
  let checkins = dir.checkins(id).await.context("failed to read check-ins")?;
  let state = dir.attendance_state(id).await.context("failed to read state")?;

  emit(ctx.json, &GuestDetail { guest, state, checkins }, output::guest_detail)
}

pub async fn stats<D: Directory>(dir: &D, ctx: &Context) -> anyhow::Result<()> {
  let stats = dir.stats_summary().await.context("failed to compute stats")?;
  emit(ctx.json, &stats, output::stats)
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleOutcome {
  guest_id: GuestId,
  status:   ToggleStatus,
  changed:  bool,
}

pub async fn toggle<D: Directory>(
  dir: &D,
  ctx: &Context,
  mut toggle: Toggle,
  operator: Option<String>,
) -> anyhow::Result<()> {
  if let Some(operator) = operator.or_else(|| ctx.operator.clone()) {
    toggle = toggle.by(operator);
  }
  let guest_id = toggle.guest_id;

  let status = dir
    .toggle_checkin(toggle)
    .await
    .with_context(|| format!("toggle failed for guest {guest_id}"))?;

  let outcome = ToggleOutcome { guest_id, status, changed: status.changed_state() };
  emit(ctx.json, &outcome, |o| match o.status {
    ToggleStatus::CheckedIn => println!("guest {} checked in", o.guest_id),
    ToggleStatus::CheckedOut => println!("guest {} checked out", o.guest_id),
    ToggleStatus::AlreadyIn => println!("guest {} is already checked in", o.guest_id),
    ToggleStatus::NotCheckedIn => println!("guest {} is not checked in", o.guest_id),
    ToggleStatus::NeverCheckedIn => println!("guest {} never checked in", o.guest_id),
  })
}

pub async fn undo<D: Directory>(dir: &D, ctx: &Context) -> anyhow::Result<()> {
  let status = dir.undo_last().await.context("undo failed")?;
  emit(ctx.json, &json!({ "status": status }), |_| match status {
    UndoStatus::RevertedCheckIn => println!("reverted the last check-in"),
    UndoStatus::RevertedCheckOut => println!("reverted the last check-out"),
    UndoStatus::Empty => println!("nothing to undo"),
  })
}

