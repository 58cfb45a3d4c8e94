//! The SQLite implementation of [`Directory`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::{debug, info};

use rollcall_core::{
  attendance::{AttendanceState, CheckinRecord, Toggle, ToggleStatus, UndoStatus},
  guest::{Guest, GuestId, GuestMatch, HostSummary},
  normalize::host_key,
  query::{SearchQuery, clamp_limit},
  roster::{ImportMode, ImportSummary, RosterRow},
  stats::{SnapshotRow, StatsSummary},
  store::Directory,
};

use crate::{
  Error, Result, attendance,
  encode::{
    GUEST_COLUMNS, RawCheckin, RawEvent, RawGuest, RawPresentGuest, RawSnapshotRow, encode_dt,
  },
  import,
  schema::SCHEMA,
  search, stats,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A guest directory backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one worker thread, so mutations issued concurrently are queued and
/// applied one after another.
#[derive(Clone)]
pub struct SqliteDirectory {
  conn: tokio_rusqlite::Connection,
}

impl SqliteDirectory {
  /// Open (or create) a directory at `path` and ensure the schema exists.
  /// Missing parent directories are created. Safe to call repeatedly.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    debug!(path = %path.display(), "directory opened");
    Ok(store)
  }

  /// Open an in-memory directory.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Rebuild the search index from the guest table alone.
  pub async fn rebuild_search_index(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("INSERT INTO guest_fts(guest_fts) VALUES ('rebuild')", [])?;
        Ok(())
      })
      .await?;
    info!("search index rebuilt");
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn conn(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn guest_exists(&self, id: GuestId) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS(SELECT 1 FROM guests WHERE id = ?1)",
          [id],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(exists)
  }
}

// ─── Directory impl ──────────────────────────────────────────────────────────

impl Directory for SqliteDirectory {
  type Error = Error;

  // ── Import ────────────────────────────────────────────────────────────────

  async fn import_rows(&self, rows: Vec<RosterRow>, mode: ImportMode) -> Result<ImportSummary> {
    let now = Utc::now();
    let total_rows_processed = rows.len();
    let pending = import::prepare(&rows, now);
    let names = pending.len();
    let created_at = encode_dt(now);

    let inserted_guests = self
      .conn
      .call(move |conn| Ok(import::apply(conn, pending, mode, &created_at)?))
      .await?;

    info!(
      %mode,
      rows = total_rows_processed,
      names,
      inserted = inserted_guests,
      "roster imported"
    );
    Ok(ImportSummary { inserted_guests, total_rows_processed })
  }

  // ── Guests ────────────────────────────────────────────────────────────────

  async fn guest(&self, id: GuestId) -> Result<Option<Guest>> {
    let raw: Option<RawGuest> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {GUEST_COLUMNS} FROM guests g WHERE g.id = ?1"),
            [id],
            RawGuest::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGuest::into_guest).transpose()
  }

  async fn guests_for_host(&self, host: &str) -> Result<Vec<GuestMatch>> {
    let key = host_key(host);
    if key.is_empty() {
      return Ok(Vec::new());
    }

    let guests = self
      .conn
      .call(move |conn| Ok(search::guests_for_host(conn, &key)?))
      .await?;
    Ok(guests)
  }

  // ── Search ────────────────────────────────────────────────────────────────

  async fn search_guests(&self, query: &str, limit: usize) -> Result<Vec<GuestMatch>> {
    let query = SearchQuery::parse(query);
    let limit = clamp_limit(limit);

    let hits = self
      .conn
      .call(move |conn| Ok(search::search_guests(conn, &query, limit)?))
      .await?;
    Ok(hits)
  }

  async fn search_hosts(&self, query: &str, limit: usize) -> Result<Vec<HostSummary>> {
    let query = SearchQuery::parse(query);
    let limit = clamp_limit(limit);

    let hosts = self
      .conn
      .call(move |conn| Ok(search::search_hosts(conn, &query, limit)?))
      .await?;
    Ok(hosts)
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn toggle_checkin(&self, toggle: Toggle) -> Result<ToggleStatus> {
    let now = encode_dt(Utc::now());
    let guest_id = toggle.guest_id;
    let action = toggle.action;

    let status = self
      .conn
      .call(move |conn| Ok(attendance::toggle(conn, &toggle, &now)?))
      .await?
      .ok_or(Error::GuestNotFound(guest_id))?;

    info!(guest_id, %action, %status, "toggle");
    Ok(status)
  }

  async fn undo_last(&self) -> Result<UndoStatus> {
    let undone = self
      .conn
      .call(|conn| Ok(attendance::undo_last(conn)?))
      .await?;

    match undone.event.map(RawEvent::into_event).transpose()? {
      Some(event) => info!(
        event_id = event.id,
        guest_id = event.guest_id,
        action = %event.action,
        at = %event.timestamp,
        status = %undone.status,
        "undo"
      ),
      None => info!("undo: event log is empty"),
    }
    Ok(undone.status)
  }

  async fn checkins(&self, guest_id: GuestId) -> Result<Vec<CheckinRecord>> {
    if !self.guest_exists(guest_id).await? {
      return Err(Error::GuestNotFound(guest_id));
    }

    let raws: Vec<RawCheckin> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, guest_id, in_ts, out_ts, in_by, out_by
           FROM checkins WHERE guest_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map([guest_id], RawCheckin::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheckin::into_record).collect()
  }

  async fn attendance_state(&self, guest_id: GuestId) -> Result<AttendanceState> {
    let records = self.checkins(guest_id).await?;
    Ok(AttendanceState::from_records(&records))
  }

  // ── Projections ───────────────────────────────────────────────────────────

  async fn stats_summary(&self) -> Result<StatsSummary> {
    let raw = self.conn.call(|conn| Ok(stats::summary(conn)?)).await?;

    let present_guests = raw
      .present
      .into_iter()
      .map(RawPresentGuest::into_present)
      .collect::<Result<Vec<_>>>()?;

    Ok(StatsSummary {
      total_guests: raw.total_guests,
      total_check_ins: raw.total_check_ins,
      total_check_outs: raw.total_check_outs,
      currently_present: raw.currently_present,
      present_guests,
      top_hosts: raw.top_hosts,
    })
  }

  async fn snapshot(&self) -> Result<Vec<SnapshotRow>> {
    let raws = self.conn.call(|conn| Ok(stats::snapshot(conn)?)).await?;
    raws.into_iter().map(RawSnapshotRow::into_snapshot).collect()
  }
}
