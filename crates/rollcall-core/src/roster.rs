//! Raw roster rows as handed to import, and the attendance history a row
//! may carry over from a previous event.

use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

/// Operator id recorded on check-in records created by import.
pub const IMPORT_OPERATOR: &str = "import";

/// One row of the roster source. Every cell is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
  /// Free-text guest list, e.g. `"John Smith, Mary Jones & Alex Wu"`.
  pub guest_names:    Option<String>,
  /// The sponsoring member.
  pub member_name:    Option<String>,
  pub source_row:     Option<i64>,
  pub check_in:       Option<String>,
  pub check_in_time:  Option<String>,
  pub check_out:      Option<String>,
  pub check_out_time: Option<String>,
}

impl RosterRow {
  pub fn new(guest_names: impl Into<String>, member_name: impl Into<String>) -> Self {
    Self {
      guest_names: Some(guest_names.into()),
      member_name: Some(member_name.into()),
      ..Self::default()
    }
  }

  /// The check-in record this row implies, if it carries any prior
  /// attendance. Time-only values are placed on `now`'s local date.
  pub fn imported_attendance(&self, now: DateTime<Utc>) -> Option<ImportedAttendance> {
    let in_flag = parse_flag(self.check_in.as_deref());
    let out_flag = parse_flag(self.check_out.as_deref());
    let in_time = parse_timestamp(self.check_in_time.as_deref(), now);
    let out_time = parse_timestamp(self.check_out_time.as_deref(), now);

    if !(in_flag || out_flag || in_time.is_some() || out_time.is_some()) {
      return None;
    }

    let in_ts = in_time.or(out_time).unwrap_or(now);
    let out_ts = (out_flag || out_time.is_some()).then(|| out_time.unwrap_or(in_ts));

    Some(ImportedAttendance { in_ts, out_ts })
  }
}

/// A check-in record carried over by import. Closed when `out_ts` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedAttendance {
  pub in_ts:  DateTime<Utc>,
  pub out_ts: Option<DateTime<Utc>>,
}

// ─── Import mode and summary ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImportMode {
  /// Wipe guests, check-ins, events and the index, then insert every name.
  Replace,
  /// Insert only names whose (name, host) key is not already present.
  Append,
}

impl ImportMode {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s.trim()).map_err(|_| Error::InvalidImportMode(s.to_owned()))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
  pub inserted_guests:      usize,
  pub total_rows_processed: usize,
}

// ─── Cell parsing ────────────────────────────────────────────────────────────

fn parse_flag(value: Option<&str>) -> bool {
  value
    .map(|v| v.trim().to_lowercase())
    .is_some_and(|v| matches!(v.as_str(), "y" | "yes" | "true" | "1" | "checked" | "in"))
}

const TIME_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S", "%H:%M", "%I%M%p", "%H%M%S"];

const DATETIME_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%dT%H:%M:%S",
  "%m/%d/%Y %I:%M:%S %p",
  "%m/%d/%Y %I:%M %p",
  "%m/%d/%Y %H:%M:%S",
  "%m/%d/%Y %H:%M",
];

/// Parse a check-in/out cell. Unrecognised text yields `None`.
fn parse_timestamp(value: Option<&str>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
  let raw = value?.trim();
  if raw.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }

  let today: NaiveDate = now.with_timezone(&Local).date_naive();
  let naive = TIME_FORMATS
    .iter()
    .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
    .map(|time| today.and_time(time))
    .or_else(|| {
      DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    })?;

  Local
    .from_local_datetime(&naive)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
}
