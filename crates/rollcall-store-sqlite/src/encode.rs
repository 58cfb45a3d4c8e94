//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings. Actions are stored as
//! `in` / `out`.

use chrono::{DateTime, Utc};
use rollcall_core::{
  attendance::{Action, AttendanceEvent, CheckinRecord},
  guest::{Guest, GuestMatch},
  stats::{PresentGuest, SnapshotRow},
};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> { s.map(decode_dt).transpose() }

// ─── Action ──────────────────────────────────────────────────────────────────

pub fn encode_action(action: Action) -> &'static str {
  match action {
    Action::In => "in",
    Action::Out => "out",
  }
}

/// Column wrapper so an `action` can be read inside a transaction.
pub struct SqlAction(pub Action);

impl FromSql for SqlAction {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    Action::parse(value.as_str()?)
      .map(SqlAction)
      .map_err(|e| FromSqlError::Other(Box::new(e)))
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Selects the columns read by [`RawGuest`].
pub const GUEST_COLUMNS: &str = "g.id, g.display_name, g.member_host, g.source_row, g.created_at";

/// Raw values read directly from a `guests` row.
pub struct RawGuest {
  pub id:           i64,
  pub display_name: String,
  pub member_host:  String,
  pub source_row:   Option<i64>,
  pub created_at:   String,
}

impl RawGuest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      display_name: row.get(1)?,
      member_host:  row.get(2)?,
      source_row:   row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_guest(self) -> Result<Guest> {
    Ok(Guest {
      id:           self.id,
      display_name: self.display_name,
      member_host:  self.member_host,
      source_row:   self.source_row,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Selects the columns read by [`guest_match_from_row`]; expects the guests
/// table aliased as `g`.
pub const MATCH_COLUMNS: &str = "g.id, g.display_name, g.member_host,
  EXISTS(SELECT 1 FROM checkins c WHERE c.guest_id = g.id AND c.out_ts IS NULL),
  EXISTS(SELECT 1 FROM checkins c WHERE c.guest_id = g.id)";

pub fn guest_match_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GuestMatch> {
  Ok(GuestMatch {
    id:            row.get(0)?,
    display_name:  row.get(1)?,
    member_host:   row.get(2)?,
    is_checked_in: row.get(3)?,
    has_history:   row.get(4)?,
  })
}

/// Raw values read directly from a `checkins` row.
pub struct RawCheckin {
  pub id:       i64,
  pub guest_id: i64,
  pub in_ts:    String,
  pub out_ts:   Option<String>,
  pub in_by:    Option<String>,
  pub out_by:   Option<String>,
}

impl RawCheckin {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(0)?,
      guest_id: row.get(1)?,
      in_ts:    row.get(2)?,
      out_ts:   row.get(3)?,
      in_by:    row.get(4)?,
      out_by:   row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<CheckinRecord> {
    Ok(CheckinRecord {
      id:       self.id,
      guest_id: self.guest_id,
      in_ts:    decode_dt(&self.in_ts)?,
      out_ts:   decode_opt_dt(self.out_ts.as_deref())?,
      in_by:    self.in_by,
      out_by:   self.out_by,
    })
  }
}

/// Raw values read directly from an `attendance_events` row.
pub struct RawEvent {
  pub id:         i64,
  pub guest_id:   i64,
  pub checkin_id: i64,
  pub ts:         String,
  pub action:     Action,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let SqlAction(action) = row.get(4)?;
    Ok(Self {
      id:         row.get(0)?,
      guest_id:   row.get(1)?,
      checkin_id: row.get(2)?,
      ts:         row.get(3)?,
      action,
    })
  }

  pub fn into_event(self) -> Result<AttendanceEvent> {
    Ok(AttendanceEvent {
      id:         self.id,
      guest_id:   self.guest_id,
      checkin_id: self.checkin_id,
      timestamp:  decode_dt(&self.ts)?,
      action:     self.action,
    })
  }
}

/// Raw values for one entry of the present list.
pub struct RawPresentGuest {
  pub id:           i64,
  pub display_name: String,
  pub member_host:  String,
  pub in_ts:        String,
  pub operator:     Option<String>,
}

impl RawPresentGuest {
  pub fn into_present(self) -> Result<PresentGuest> {
    Ok(PresentGuest {
      id:           self.id,
      display_name: self.display_name,
      member_host:  self.member_host,
      in_ts:        decode_dt(&self.in_ts)?,
      operator:     self.operator,
    })
  }
}

/// Raw values for one snapshot line: a guest joined with its latest record.
pub struct RawSnapshotRow {
  pub display_name: String,
  pub member_host:  String,
  pub in_ts:        Option<String>,
  pub out_ts:       Option<String>,
}

impl RawSnapshotRow {
  pub fn into_snapshot(self) -> Result<SnapshotRow> {
    Ok(SnapshotRow {
      checked_in:   self.in_ts.is_some(),
      in_ts:        decode_opt_dt(self.in_ts.as_deref())?,
      out_ts:       decode_opt_dt(self.out_ts.as_deref())?,
      display_name: self.display_name,
      member_host:  self.member_host,
    })
  }
}
