//! Toggle and undo, each applied inside one immediate transaction.

use rollcall_core::{
  attendance::{Action, AttendanceState, Toggle, ToggleStatus, Transition, UndoStatus},
  guest::GuestId,
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};

use crate::encode::{RawEvent, encode_action};

/// What an undo did, and the event it removed.
pub struct Undone {
  pub status: UndoStatus,
  pub event:  Option<RawEvent>,
}

/// Apply `toggle` at time `now`. Returns `None` when the guest does not
/// exist, in which case nothing is written.
pub fn toggle(
  conn: &mut Connection,
  toggle: &Toggle,
  now: &str,
) -> rusqlite::Result<Option<ToggleStatus>> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let exists: bool = tx.query_row(
    "SELECT EXISTS(SELECT 1 FROM guests WHERE id = ?1)",
    [toggle.guest_id],
    |row| row.get(0),
  )?;
  if !exists {
    return Ok(None);
  }

  let open: Option<i64> = tx
    .query_row(
      "SELECT id FROM checkins WHERE guest_id = ?1 AND out_ts IS NULL",
      [toggle.guest_id],
      |row| row.get(0),
    )
    .optional()?;

  let state = if open.is_some() {
    AttendanceState::In
  } else {
    let any: bool = tx.query_row(
      "SELECT EXISTS(SELECT 1 FROM checkins WHERE guest_id = ?1)",
      [toggle.guest_id],
      |row| row.get(0),
    )?;
    if any { AttendanceState::Out } else { AttendanceState::NeverIn }
  };

  let transition = state.plan(toggle.action, toggle.force);
  match (transition, open) {
    (Transition::Open, _) => {
      let checkin_id = tx
        .prepare("INSERT INTO checkins (guest_id, in_ts, in_by) VALUES (?1, ?2, ?3)")?
        .insert(params![toggle.guest_id, now, toggle.operator])?;
      log_event(&tx, toggle.guest_id, checkin_id, now, Action::In)?;
    }
    (Transition::Close, Some(checkin_id)) => {
      tx.execute(
        "UPDATE checkins SET out_ts = ?1, out_by = ?2 WHERE id = ?3",
        params![now, toggle.operator, checkin_id],
      )?;
      log_event(&tx, toggle.guest_id, checkin_id, now, Action::Out)?;
    }
    _ => {}
  }

  tx.commit()?;
  Ok(Some(transition.status()))
}

fn log_event(
  conn: &Connection,
  guest_id: GuestId,
  checkin_id: i64,
  now: &str,
  action: Action,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO attendance_events (guest_id, checkin_id, ts, action) VALUES (?1, ?2, ?3, ?4)",
    params![guest_id, checkin_id, now, encode_action(action)],
  )?;
  Ok(())
}

/// Revert the newest event in the log, whichever guest it belongs to.
pub fn undo_last(conn: &mut Connection) -> rusqlite::Result<Undone> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let latest = tx
    .query_row(
      "SELECT id, guest_id, checkin_id, ts, action
       FROM attendance_events ORDER BY id DESC LIMIT 1",
      [],
      RawEvent::from_row,
    )
    .optional()?;

  let Some(event) = latest else {
    return Ok(Undone { status: UndoStatus::Empty, event: None });
  };

  tx.execute("DELETE FROM attendance_events WHERE id = ?1", [event.id])?;
  let status = match event.action {
    Action::In => {
      tx.execute("DELETE FROM checkins WHERE id = ?1", [event.checkin_id])?;
      UndoStatus::RevertedCheckIn
    }
    Action::Out => {
      tx.execute(
        "UPDATE checkins SET out_ts = NULL, out_by = NULL WHERE id = ?1",
        [event.checkin_id],
      )?;
      UndoStatus::RevertedCheckOut
    }
  };

  tx.commit()?;
  Ok(Undone { status, event: Some(event) })
}
