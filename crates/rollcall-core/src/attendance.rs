//! The attendance state machine.
//!
//! Each guest moves `NeverIn → In → Out → In → …`. Every transition that
//! changes state is mirrored by one [`AttendanceEvent`] in an append-only
//! log; undo only ever looks at the newest entry of that log.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result, guest::GuestId};

pub type CheckinId = i64;
pub type EventId = i64;

// ─── Actions ─────────────────────────────────────────────────────────────────

/// The direction of a toggle.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Action {
  In,
  Out,
}

impl Action {
  /// Parse `"in"` / `"out"`, ignoring ASCII case and surrounding whitespace.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s.trim()).map_err(|_| Error::InvalidAction(s.to_owned()))
  }
}

/// A toggle request as issued by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
  pub guest_id: GuestId,
  pub action:   Action,
  pub operator: Option<String>,
  /// Explicit forced-checkout gesture. Performs the same transition as a
  /// normal check-out and never bypasses the open-record requirement.
  pub force:    bool,
}

impl Toggle {
  pub fn check_in(guest_id: GuestId) -> Self {
    Self { guest_id, action: Action::In, operator: None, force: false }
  }

  pub fn check_out(guest_id: GuestId) -> Self {
    Self { guest_id, action: Action::Out, operator: None, force: false }
  }

  pub fn by(mut self, operator: impl Into<String>) -> Self {
    self.operator = Some(operator.into());
    self
  }

  pub fn forced(mut self) -> Self {
    self.force = true;
    self
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One attendance session. At most one record per guest is open at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRecord {
  pub id:       CheckinId,
  pub guest_id: GuestId,
  pub in_ts:    DateTime<Utc>,
  pub out_ts:   Option<DateTime<Utc>>,
  pub in_by:    Option<String>,
  pub out_by:   Option<String>,
}

impl CheckinRecord {
  pub fn is_open(&self) -> bool { self.out_ts.is_none() }
}

/// Append-only log entry for one state-changing toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
  pub id:         EventId,
  pub guest_id:   GuestId,
  /// The record this action opened or closed.
  pub checkin_id: CheckinId,
  pub timestamp:  DateTime<Utc>,
  pub action:     Action,
}

// ─── State machine ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceState {
  /// No check-in record has ever existed.
  NeverIn,
  /// An open record exists.
  In,
  /// The most recent record is closed.
  Out,
}

impl AttendanceState {
  /// Derive the state from a guest's records (any order).
  pub fn from_records(records: &[CheckinRecord]) -> Self {
    if records.is_empty() {
      Self::NeverIn
    } else if records.iter().any(CheckinRecord::is_open) {
      Self::In
    } else {
      Self::Out
    }
  }

  /// Decide what a toggle does from this state.
  ///
  /// `force` is accepted for symmetry with the request but does not change
  /// the outcome: a check-out still needs an open record.
  pub fn plan(self, action: Action, _force: bool) -> Transition {
    match (self, action) {
      (Self::In, Action::In) => Transition::Unchanged(ToggleStatus::AlreadyIn),
      (_, Action::In) => Transition::Open,
      (Self::In, Action::Out) => Transition::Close,
      (Self::Out, Action::Out) => Transition::Unchanged(ToggleStatus::NotCheckedIn),
      (Self::NeverIn, Action::Out) => Transition::Unchanged(ToggleStatus::NeverCheckedIn),
    }
  }
}

/// The effect a toggle has on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// Open a new record and log an `in` event.
  Open,
  /// Close the open record and log an `out` event.
  Close,
  /// Nothing to write; report the status as-is.
  Unchanged(ToggleStatus),
}

impl Transition {
  pub fn status(self) -> ToggleStatus {
    match self {
      Self::Open => ToggleStatus::CheckedIn,
      Self::Close => ToggleStatus::CheckedOut,
      Self::Unchanged(status) => status,
    }
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of a toggle. Only `CheckedIn` and `CheckedOut` changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToggleStatus {
  CheckedIn,
  CheckedOut,
  AlreadyIn,
  NotCheckedIn,
  NeverCheckedIn,
}

impl ToggleStatus {
  pub fn changed_state(self) -> bool { matches!(self, Self::CheckedIn | Self::CheckedOut) }
}

/// Result of an undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UndoStatus {
  RevertedCheckIn,
  RevertedCheckOut,
  Empty,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn record(id: CheckinId, open: bool) -> CheckinRecord {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 19, 0, 0).unwrap();
    CheckinRecord {
      id,
      guest_id: 1,
      in_ts: at,
      out_ts: (!open).then_some(at),
      in_by: None,
      out_by: None,
    }
  }

  #[test]
  fn parse_action_ignores_case() {
    assert_eq!(Action::parse("IN").unwrap(), Action::In);
    assert_eq!(Action::parse(" out ").unwrap(), Action::Out);
    assert!(matches!(Action::parse("sideways"), Err(Error::InvalidAction(_))));
  }

  #[test]
  fn state_from_records() {
    assert_eq!(AttendanceState::from_records(&[]), AttendanceState::NeverIn);
    assert_eq!(AttendanceState::from_records(&[record(1, false)]), AttendanceState::Out);
    assert_eq!(
      AttendanceState::from_records(&[record(1, false), record(2, true)]),
      AttendanceState::In
    );
  }

  #[test]
  fn check_in_plans() {
    assert_eq!(AttendanceState::NeverIn.plan(Action::In, false), Transition::Open);
    assert_eq!(AttendanceState::Out.plan(Action::In, false), Transition::Open);
    assert_eq!(
      AttendanceState::In.plan(Action::In, true),
      Transition::Unchanged(ToggleStatus::AlreadyIn)
    );
  }

  #[test]
  fn check_out_plans_ignore_force() {
    for force in [false, true] {
      assert_eq!(AttendanceState::In.plan(Action::Out, force), Transition::Close);
      assert_eq!(
        AttendanceState::Out.plan(Action::Out, force).status(),
        ToggleStatus::NotCheckedIn
      );
      assert_eq!(
        AttendanceState::NeverIn.plan(Action::Out, force).status(),
        ToggleStatus::NeverCheckedIn
      );
    }
  }

  #[test]
  fn status_tags_are_snake_case() {
    assert_eq!(ToggleStatus::NeverCheckedIn.to_string(), "never_checked_in");
    assert_eq!(UndoStatus::RevertedCheckOut.as_ref(), "reverted_check_out");
    assert_eq!(
      serde_json::to_string(&ToggleStatus::AlreadyIn).unwrap(),
      "\"already_in\""
    );
    assert_eq!(AttendanceState::NeverIn.to_string(), "NEVER_IN");
  }
}
