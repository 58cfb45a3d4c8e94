//! Roster import: replace or append normalized guests in one transaction.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rollcall_core::{
  normalize::normalize_row,
  roster::{IMPORT_OPERATOR, ImportMode, RosterRow},
};
use rusqlite::{Connection, TransactionBehavior, params};
use tracing::warn;

use crate::encode::encode_dt;

/// A normalized guest ready for insertion, with its columns pre-encoded.
pub struct PendingGuest {
  display_name: String,
  member_host:  String,
  name_key:     String,
  host_key:     String,
  source_row:   Option<i64>,
  /// `(in_ts, out_ts)` of an imported check-in record.
  history:      Option<(String, Option<String>)>,
}

impl PendingGuest {
  fn key(&self) -> (String, String) { (self.name_key.clone(), self.host_key.clone()) }
}

/// Run the normalizer over every row. Rows that yield no names contribute
/// nothing.
pub fn prepare(rows: &[RosterRow], now: DateTime<Utc>) -> Vec<PendingGuest> {
  rows
    .iter()
    .flat_map(|row| {
      let guests = normalize_row(row);
      if guests.is_empty() {
        warn!(source_row = ?row.source_row, "roster row has no guest names; skipped");
      }
      let history = row
        .imported_attendance(now)
        .map(|h| (encode_dt(h.in_ts), h.out_ts.map(encode_dt)));
      guests.into_iter().map(move |guest| {
        let (name_key, host_key) = guest.dedup_key();
        PendingGuest {
          name_key,
          host_key,
          display_name: guest.display_name,
          member_host: guest.member_host,
          source_row: row.source_row,
          history: history.clone(),
        }
      })
    })
    .collect()
}

/// Apply an import atomically. Returns the number of guests inserted.
pub fn apply(
  conn: &mut Connection,
  guests: Vec<PendingGuest>,
  mode: ImportMode,
  created_at: &str,
) -> rusqlite::Result<usize> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let mut seen: HashSet<(String, String)> = HashSet::new();
  match mode {
    ImportMode::Replace => {
      // Guest deletes fire the index triggers; dependants are cleared first.
      tx.execute("DELETE FROM attendance_events", [])?;
      tx.execute("DELETE FROM checkins", [])?;
      tx.execute("DELETE FROM guests", [])?;
    }
    ImportMode::Append => {
      let mut stmt = tx.prepare("SELECT name_key, host_key FROM guests")?;
      let existing = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
      for key in existing {
        seen.insert(key?);
      }
    }
  }

  let mut inserted = 0usize;
  {
    let mut insert_guest = tx.prepare(
      "INSERT INTO guests (display_name, member_host, name_key, host_key, source_row, created_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let mut insert_checkin = tx.prepare(
      "INSERT INTO checkins (guest_id, in_ts, out_ts, in_by, out_by)
       VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    for guest in guests {
      if mode == ImportMode::Append && !seen.insert(guest.key()) {
        continue;
      }

      let guest_id = insert_guest.insert(params![
        guest.display_name,
        guest.member_host,
        guest.name_key,
        guest.host_key,
        guest.source_row,
        created_at,
      ])?;
      inserted += 1;

      if let Some((in_ts, out_ts)) = &guest.history {
        let out_by = out_ts.as_ref().map(|_| IMPORT_OPERATOR);
        insert_checkin.execute(params![guest_id, in_ts, out_ts, IMPORT_OPERATOR, out_by])?;
      }
    }
  }

  tx.commit()?;
  Ok(inserted)
}
