//! Attendance snapshot writer.

use std::{
  fs::{self, File},
  io::Write,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Local, SecondsFormat, Utc};
use csv::Writer;
use rollcall_core::stats::SnapshotRow;

use crate::error::Result;

const HEADER: [&str; 6] = [
  "Guest Name",
  "Member Name",
  "Checked In",
  "Check In Time",
  "Checked Out",
  "Check Out Time",
];

fn flag(value: bool) -> &'static str { if value { "Y" } else { "N" } }

fn timestamp(ts: Option<DateTime<Utc>>) -> String {
  ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)).unwrap_or_default()
}

/// `rollcall-snapshot-YYYYMMDD-HHMMSS.csv`, stamped in local time.
pub fn snapshot_filename(now: DateTime<Utc>) -> String {
  format!("rollcall-snapshot-{}.csv", now.with_timezone(&Local).format("%Y%m%d-%H%M%S"))
}

/// Write `rows` as CSV to any writer.
pub fn write_snapshot_to<W: Write>(rows: &[SnapshotRow], writer: W) -> Result<()> {
  let mut wtr = Writer::from_writer(writer);
  wtr.write_record(HEADER)?;

  for row in rows {
    wtr.write_record([
      row.display_name.as_str(),
      row.member_host.as_str(),
      flag(row.checked_in),
      timestamp(row.in_ts).as_str(),
      flag(row.checked_out()),
      timestamp(row.out_ts).as_str(),
    ])?;
  }

  wtr.flush()?;
  Ok(())
}

/// Write a timestamped snapshot file into `dir`, creating it if needed.
/// Returns the path written.
pub fn write_snapshot(rows: &[SnapshotRow], dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
  fs::create_dir_all(dir)?;
  let path = dir.join(snapshot_filename(now));
  write_snapshot_to(rows, File::create(&path)?)?;
  Ok(path)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn row(name: &str, in_ts: Option<DateTime<Utc>>, out_ts: Option<DateTime<Utc>>) -> SnapshotRow {
    SnapshotRow {
      display_name: name.into(),
      member_host: "Dana Lee".into(),
      checked_in: in_ts.is_some(),
      in_ts,
      out_ts,
    }
  }

  fn render(rows: &[SnapshotRow]) -> String {
    let mut buf = Vec::new();
    write_snapshot_to(rows, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
  }

  #[test]
  fn header_only_for_empty_directory() {
    assert_eq!(
      render(&[]),
      "Guest Name,Member Name,Checked In,Check In Time,Checked Out,Check Out Time\n"
    );
  }

  #[test]
  fn flags_follow_latest_record() {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 19, 0, 0).unwrap();
    let out = render(&[
      row("Never", None, None),
      row("Present", Some(at), None),
      row("Left", Some(at), Some(at)),
    ]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[1], "Never,Dana Lee,N,,N,");
    assert_eq!(lines[2], "Present,Dana Lee,Y,2024-06-01T19:00:00Z,N,");
    assert_eq!(lines[3], "Left,Dana Lee,Y,2024-06-01T19:00:00Z,Y,2024-06-01T19:00:00Z");
  }

  #[test]
  fn names_with_commas_are_quoted() {
    let out = render(&[row("Smith, Jane", None, None)]);
    assert!(out.lines().nth(1).unwrap().starts_with("\"Smith, Jane\","));
  }

  #[test]
  fn writes_timestamped_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("exports");
    let now = Utc::now();

    let path = write_snapshot(&[row("Ann", None, None)], &target, now).unwrap();

    assert_eq!(path.parent(), Some(target.as_path()));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert_eq!(name, snapshot_filename(now));
    assert!(name.starts_with("rollcall-snapshot-") && name.ends_with(".csv"));
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
  }
}
