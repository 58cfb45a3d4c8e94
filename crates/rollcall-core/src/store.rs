//! The `Directory` trait: the engine's contract with its callers.
//!
//! The trait is implemented by storage backends (e.g.
//! `rollcall-store-sqlite`). The CLI depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  attendance::{AttendanceState, CheckinRecord, Toggle, ToggleStatus, UndoStatus},
  guest::{Guest, GuestId, GuestMatch, HostSummary},
  roster::{ImportMode, ImportSummary, RosterRow},
  stats::{SnapshotRow, StatsSummary},
};

/// Abstraction over a guest directory backend.
///
/// Every mutating method is atomic: it applies completely or not at all, and
/// concurrent mutations are serialized by the backend. Reads never observe a
/// half-applied mutation.
pub trait Directory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Import ────────────────────────────────────────────────────────────

  /// Normalize and insert `rows`. `Replace` wipes all guests, check-ins and
  /// events first; `Append` skips names already present under the same host
  /// (case-insensitively).
  fn import_rows(
    &self,
    rows: Vec<RosterRow>,
    mode: ImportMode,
  ) -> impl Future<Output = Result<ImportSummary, Self::Error>> + Send + '_;

  // ── Guests ────────────────────────────────────────────────────────────

  /// Retrieve a guest by id. Returns `None` if not found.
  fn guest(
    &self,
    id: GuestId,
  ) -> impl Future<Output = Result<Option<Guest>, Self::Error>> + Send + '_;

  /// All guests whose host equals `host` ignoring case, by display name.
  fn guests_for_host<'a>(
    &'a self,
    host: &'a str,
  ) -> impl Future<Output = Result<Vec<GuestMatch>, Self::Error>> + Send + 'a;

  // ── Search ────────────────────────────────────────────────────────────

  /// Prefix search over names and hosts with a fuzzy substring fallback.
  /// Never returns more than `limit` results.
  fn search_guests<'a>(
    &'a self,
    query: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<GuestMatch>, Self::Error>> + Send + 'a;

  /// The same strategy applied to the distinct host values.
  fn search_hosts<'a>(
    &'a self,
    query: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<HostSummary>, Self::Error>> + Send + 'a;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Apply a check-in or check-out. Routine no-ops come back as status
  /// tags; an unknown guest is an error.
  fn toggle_checkin(
    &self,
    toggle: Toggle,
  ) -> impl Future<Output = Result<ToggleStatus, Self::Error>> + Send + '_;

  /// Revert the single newest attendance event across the directory.
  fn undo_last(&self) -> impl Future<Output = Result<UndoStatus, Self::Error>> + Send + '_;

  /// A guest's check-in records, oldest first.
  fn checkins(
    &self,
    guest_id: GuestId,
  ) -> impl Future<Output = Result<Vec<CheckinRecord>, Self::Error>> + Send + '_;

  fn attendance_state(
    &self,
    guest_id: GuestId,
  ) -> impl Future<Output = Result<AttendanceState, Self::Error>> + Send + '_;

  // ── Projections ───────────────────────────────────────────────────────

  fn stats_summary(&self) -> impl Future<Output = Result<StatsSummary, Self::Error>> + Send + '_;

  /// One row per guest, ordered by display name.
  fn snapshot(&self) -> impl Future<Output = Result<Vec<SnapshotRow>, Self::Error>> + Send + '_;
}
