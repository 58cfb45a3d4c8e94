//! Roster CSV codec for rollcall.
//!
//! Reads a roster spreadsheet export into [`RosterRow`]s for import, and
//! writes the attendance snapshot back out as CSV. Pure synchronous; no
//! database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use rollcall_roster::parse_roster;
//!
//! let csv = "Guest Names,Member Name\nJohn Smith & Mary Jones,Chris Park\n";
//! let rows = parse_roster(csv.as_bytes()).unwrap();
//! println!("{} rows", rows.len());
//! ```

pub mod error;
mod parse;
mod serialize;

use std::{fs::File, path::Path};

pub use error::{Error, Result};
pub use parse::parse_roster;
pub use serialize::{snapshot_filename, write_snapshot, write_snapshot_to};

use rollcall_core::roster::RosterRow;

/// Open and parse the roster file at `path`.
pub fn read_roster(path: impl AsRef<Path>) -> Result<Vec<RosterRow>> {
  let file = File::open(path)?;
  parse_roster(file)
}

// ─── Round-trip test ─────────────────────────────────────────────────────────

#[cfg(test)]
mod roundtrip_tests {
  use chrono::{TimeZone, Utc};
  use rollcall_core::stats::SnapshotRow;

  use super::*;

  #[test]
  fn snapshot_reads_back_as_roster() {
    let in_ts = Utc.with_ymd_and_hms(2024, 6, 1, 19, 0, 0).unwrap();
    let out_ts = Utc.with_ymd_and_hms(2024, 6, 1, 21, 30, 0).unwrap();
    let rows = vec![
      SnapshotRow {
        display_name: "Jane Smith".into(),
        member_host:  "Dana Lee".into(),
        checked_in:   true,
        in_ts:        Some(in_ts),
        out_ts:       Some(out_ts),
      },
      SnapshotRow {
        display_name: "Alex Wu".into(),
        member_host:  String::new(),
        checked_in:   false,
        in_ts:        None,
        out_ts:       None,
      },
    ];

    let mut buf = Vec::new();
    write_snapshot_to(&rows, &mut buf).unwrap();
    let parsed = parse_roster(buf.as_slice()).unwrap();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].guest_names.as_deref(), Some("Jane Smith"));
    assert_eq!(parsed[0].member_name.as_deref(), Some("Dana Lee"));

    let history = parsed[0].imported_attendance(Utc::now()).unwrap();
    assert_eq!(history.in_ts, in_ts);
    assert_eq!(history.out_ts, Some(out_ts));

    assert_eq!(parsed[1].member_name, None);
    assert_eq!(parsed[1].imported_attendance(Utc::now()), None);
  }
}
