//! Roster CSV reader.
//!
//! Columns are located by header name, not position. Header matching ignores
//! case, spaces, `_` and `-`, so `Guest Names`, `guestNames` and
//! `guest_names` all name the same column.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use rollcall_core::roster::RosterRow;

use crate::error::{Error, Result};

// ─── Header aliases ──────────────────────────────────────────────────────────

const GUEST_NAMES: &[&str] = &["guestnames", "guestname", "guests", "guest"];
const MEMBER_NAME: &[&str] = &["membername", "member", "memberhost", "host"];
const SOURCE_ROW: &[&str] = &["sourcerow", "row"];
const CHECK_IN: &[&str] = &["checkin", "checkedin", "checkinyn"];
const CHECK_IN_TIME: &[&str] = &["checkintime", "intime"];
const CHECK_OUT: &[&str] = &["checkout", "checkedout", "checkoutyn"];
const CHECK_OUT_TIME: &[&str] = &["checkouttime", "outtime"];

/// Reduce a header cell to its comparison form.
fn header_key(header: &str) -> String {
  header
    .trim_start_matches('\u{feff}')
    .chars()
    .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '-' | '/'))
    .flat_map(char::to_lowercase)
    .collect()
}

/// Column positions resolved from the header row.
struct Columns {
  guest_names:    usize,
  member_name:    Option<usize>,
  source_row:     Option<usize>,
  check_in:       Option<usize>,
  check_in_time:  Option<usize>,
  check_out:      Option<usize>,
  check_out_time: Option<usize>,
}

impl Columns {
  fn resolve(headers: &StringRecord) -> Result<Self> {
    let keys: Vec<String> = headers.iter().map(header_key).collect();
    let find = |aliases: &[&str]| keys.iter().position(|k| aliases.contains(&k.as_str()));

    Ok(Self {
      guest_names:    find(GUEST_NAMES).ok_or(Error::MissingColumn("guest names"))?,
      member_name:    find(MEMBER_NAME),
      source_row:     find(SOURCE_ROW),
      check_in:       find(CHECK_IN),
      check_in_time:  find(CHECK_IN_TIME),
      check_out:      find(CHECK_OUT),
      check_out_time: find(CHECK_OUT_TIME),
    })
  }

  fn row(&self, record: &StringRecord, data_row: usize) -> RosterRow {
    let cell = |idx: Option<usize>| {
      idx
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
    };

    let source_row = cell(self.source_row)
      .and_then(|v| v.parse().ok())
      .unwrap_or(data_row as i64);

    RosterRow {
      guest_names:    cell(Some(self.guest_names)),
      member_name:    cell(self.member_name),
      source_row:     Some(source_row),
      check_in:       cell(self.check_in),
      check_in_time:  cell(self.check_in_time),
      check_out:      cell(self.check_out),
      check_out_time: cell(self.check_out_time),
    }
  }
}

// ─── Public entry point ──────────────────────────────────────────────────────

/// Parse a roster with a header row from `reader`.
///
/// Records shorter than the header are accepted; missing cells read as
/// empty. `source_row` falls back to the 1-based data-row number when the
/// roster has no usable source-row column.
pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<RosterRow>> {
  let mut rdr = ReaderBuilder::new().flexible(true).trim(Trim::All).from_reader(reader);

  let columns = Columns::resolve(rdr.headers()?)?;

  let mut rows = Vec::new();
  for (i, record) in rdr.records().enumerate() {
    rows.push(columns.row(&record?, i + 1));
  }
  Ok(rows)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(input: &str) -> Vec<RosterRow> { parse_roster(input.as_bytes()).unwrap() }

  #[test]
  fn reads_named_columns() {
    let rows = parse("Member Name,Guest Names\nChris Park,\"John Smith, Mary Jones & Alex Wu\"\n");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].guest_names.as_deref(), Some("John Smith, Mary Jones & Alex Wu"));
    assert_eq!(rows[0].member_name.as_deref(), Some("Chris Park"));
    assert_eq!(rows[0].source_row, Some(1));
  }

  #[test]
  fn header_aliases_are_loose() {
    let rows = parse("guest_names,HOST,check-in,Check In Time\nAnn,Bob,Y,7:30 PM\n");
    assert_eq!(rows[0].guest_names.as_deref(), Some("Ann"));
    assert_eq!(rows[0].member_name.as_deref(), Some("Bob"));
    assert_eq!(rows[0].check_in.as_deref(), Some("Y"));
    assert_eq!(rows[0].check_in_time.as_deref(), Some("7:30 PM"));

    let camel = parse("memberName,guestNames,checkOutTime\nBob,Ann,21:00\n");
    assert_eq!(camel[0].guest_names.as_deref(), Some("Ann"));
    assert_eq!(camel[0].check_out_time.as_deref(), Some("21:00"));
  }

  #[test]
  fn byte_order_mark_is_ignored() {
    let rows = parse("\u{feff}Guests,Member\nAnn,Bob\n");
    assert_eq!(rows[0].guest_names.as_deref(), Some("Ann"));
  }

  #[test]
  fn missing_guest_column_is_an_error() {
    let err = parse_roster("Member Name,Notes\nBob,hi\n".as_bytes()).unwrap_err();
    assert!(matches!(err, Error::MissingColumn(_)));
  }

  #[test]
  fn host_column_is_optional() {
    let rows = parse("Guests\nAnn\n");
    assert_eq!(rows[0].member_name, None);
  }

  #[test]
  fn short_records_are_tolerated() {
    let rows = parse("Guest Names,Member Name,Check In\nAnn\nBen,Host\n");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].member_name, None);
    assert_eq!(rows[0].check_in, None);
    assert_eq!(rows[1].member_name.as_deref(), Some("Host"));
  }

  #[test]
  fn blank_cells_read_as_none() {
    let rows = parse("Guest Names,Member Name\n   ,  \n");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].guest_names, None);
    assert_eq!(rows[0].member_name, None);
  }

  #[test]
  fn source_row_column_wins_over_position() {
    let rows = parse("Source Row,Guests\n14,Ann\nnot-a-number,Ben\n");
    assert_eq!(rows[0].source_row, Some(14));
    assert_eq!(rows[1].source_row, Some(2));
  }

  #[test]
  fn empty_roster_has_no_rows() {
    assert!(parse("Guest Names,Member Name\n").is_empty());
  }
}
