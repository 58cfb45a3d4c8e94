//! Read-only projections over the directory. Never stored, always derived.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::guest::{GuestId, HostSummary};

/// Number of hosts reported in [`StatsSummary::top_hosts`].
pub const TOP_HOSTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
  pub total_guests:      i64,
  /// Durable tally of `in` events, not a count of open records.
  pub total_check_ins:   i64,
  pub total_check_outs:  i64,
  pub currently_present: i64,
  /// Newest check-in first.
  pub present_guests:    Vec<PresentGuest>,
  pub top_hosts:         Vec<HostSummary>,
}

/// A guest with an open check-in record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentGuest {
  pub id:           GuestId,
  pub display_name: String,
  pub member_host:  String,
  pub in_ts:        DateTime<Utc>,
  pub operator:     Option<String>,
}

/// One line of the attendance snapshot export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRow {
  pub display_name: String,
  pub member_host:  String,
  /// The guest has checked in at least once.
  pub checked_in:   bool,
  /// Check-in time of the latest record.
  pub in_ts:        Option<DateTime<Utc>>,
  /// Check-out time of the latest record; `None` while it is open.
  pub out_ts:       Option<DateTime<Utc>>,
}

impl SnapshotRow {
  pub fn checked_out(&self) -> bool { self.out_ts.is_some() }
}
