//! Guest records and the search-facing projections of them.
//!
//! A guest is created by roster import and never edited afterwards; a
//! replace-import is the only way to change the directory's contents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable surrogate key of a [`Guest`]. Assigned by the store, never reused.
pub type GuestId = i64;

/// One attendee derived from a roster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
  pub id:           GuestId,
  /// Normalized, never empty.
  pub display_name: String,
  /// The sponsoring member; empty when the roster row named none.
  pub member_host:  String,
  /// Provenance pointer back into the import source.
  pub source_row:   Option<i64>,
  pub created_at:   DateTime<Utc>,
}

impl Guest {
  pub fn has_host(&self) -> bool { !self.member_host.is_empty() }
}

/// A guest as returned by search and host lookups, annotated with its
/// current attendance status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestMatch {
  pub id:            GuestId,
  pub display_name:  String,
  pub member_host:   String,
  /// An open check-in record exists.
  pub is_checked_in: bool,
  /// Any check-in record, open or closed, exists.
  pub has_history:   bool,
}

/// Attendance rollup for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
  pub host:           String,
  pub total_guests:   i64,
  pub present_guests: i64,
}
