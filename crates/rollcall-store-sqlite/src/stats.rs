//! Aggregate reads. Each function runs inside a single connection call so it
//! sees one consistent state.

use rollcall_core::{guest::HostSummary, stats::TOP_HOSTS};
use rusqlite::Connection;

use crate::{
  encode::{RawPresentGuest, RawSnapshotRow},
  search,
};

/// Everything the stats summary needs, with timestamps still encoded.
pub struct RawStats {
  pub total_guests:      i64,
  pub total_check_ins:   i64,
  pub total_check_outs:  i64,
  pub currently_present: i64,
  pub present:           Vec<RawPresentGuest>,
  pub top_hosts:         Vec<HostSummary>,
}

pub fn summary(conn: &mut Connection) -> rusqlite::Result<RawStats> {
  // A read transaction pins one snapshot across the separate queries.
  let tx = conn.transaction()?;

  let (total_guests, total_check_ins, total_check_outs, currently_present) = tx.query_row(
    "SELECT
       (SELECT COUNT(*) FROM guests),
       (SELECT COUNT(*) FROM attendance_events WHERE action = 'in'),
       (SELECT COUNT(*) FROM attendance_events WHERE action = 'out'),
       (SELECT COUNT(*) FROM checkins WHERE out_ts IS NULL)",
    [],
    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
  )?;

  let present = {
    let mut stmt = tx.prepare(
      "SELECT g.id, g.display_name, g.member_host, c.in_ts, c.in_by
       FROM checkins c
       JOIN guests g ON g.id = c.guest_id
       WHERE c.out_ts IS NULL
       ORDER BY c.in_ts DESC, c.id DESC",
    )?;
    stmt
      .query_map([], |row| {
        Ok(RawPresentGuest {
          id:           row.get(0)?,
          display_name: row.get(1)?,
          member_host:  row.get(2)?,
          in_ts:        row.get(3)?,
          operator:     row.get(4)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let top_hosts = search::top_hosts(&tx, TOP_HOSTS)?;

  tx.commit()?;
  Ok(RawStats {
    total_guests,
    total_check_ins,
    total_check_outs,
    currently_present,
    present,
    top_hosts,
  })
}

/// One row per guest joined with its most recent check-in record.
pub fn snapshot(conn: &Connection) -> rusqlite::Result<Vec<RawSnapshotRow>> {
  let mut stmt = conn.prepare(
    "SELECT g.display_name, g.member_host, c.in_ts, c.out_ts
     FROM guests g
     LEFT JOIN checkins c
       ON c.id = (SELECT MAX(c2.id) FROM checkins c2 WHERE c2.guest_id = g.id)
     ORDER BY g.name_key, g.id",
  )?;
  stmt
    .query_map([], |row| {
      Ok(RawSnapshotRow {
        display_name: row.get(0)?,
        member_host:  row.get(1)?,
        in_ts:        row.get(2)?,
        out_ts:       row.get(3)?,
      })
    })?
    .collect()
}
