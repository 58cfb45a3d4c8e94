//! Rendering of command results: pretty JSON with `--json`, plain text
//! otherwise. Everything goes to stdout; logs go to stderr.

use chrono::{DateTime, Local, Utc};
use rollcall_core::{
  attendance::{AttendanceState, CheckinRecord},
  guest::{Guest, GuestMatch, HostSummary},
  stats::StatsSummary,
};
use serde::Serialize;

/// Print `value` as JSON, or hand it to `human` for text output.
pub fn emit<T: Serialize + ?Sized>(json: bool, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(value)?);
  } else {
    human(value);
  }
  Ok(())
}

fn local(ts: DateTime<Utc>) -> String {
  ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn marker(guest: &GuestMatch) -> &'static str {
  match (guest.is_checked_in, guest.has_history) {
    (true, _) => "IN ",
    (false, true) => "OUT",
    (false, false) => "   ",
  }
}

pub fn guest_list(guests: &[GuestMatch]) {
  if guests.is_empty() {
    println!("no matching guests");
    return;
  }
  for g in guests {
    if g.member_host.is_empty() {
      println!("{:>6}  {}  {}", g.id, marker(g), g.display_name);
    } else {
      println!("{:>6}  {}  {}  (guest of {})", g.id, marker(g), g.display_name, g.member_host);
    }
  }
}

pub fn host_list(hosts: &[HostSummary]) {
  if hosts.is_empty() {
    println!("no matching hosts");
    return;
  }
  for h in hosts {
    println!("{:>4}/{:<4} {}", h.present_guests, h.total_guests, h.host);
  }
}

/// Detail view for `rollcall show`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetail {
  pub guest:    Guest,
  pub state:    AttendanceState,
  pub checkins: Vec<CheckinRecord>,
}

pub fn guest_detail(detail: &GuestDetail) {
  let guest = &detail.guest;
  println!("{} (#{})", guest.display_name, guest.id);
  if guest.has_host() {
    println!("  guest of   {}", guest.member_host);
  }
  if let Some(row) = guest.source_row {
    println!("  roster row {row}");
  }
  println!("  state      {}", detail.state);

  for record in &detail.checkins {
    let by = record.in_by.as_deref().unwrap_or("-");
    match record.out_ts {
      Some(out) => println!(
        "  in  {} by {by}, out {} by {}",
        local(record.in_ts),
        local(out),
        record.out_by.as_deref().unwrap_or("-"),
      ),
      None => println!("  in  {} by {by}, still present", local(record.in_ts)),
    }
  }
}

pub fn stats(stats: &StatsSummary) {
  println!("guests     {}", stats.total_guests);
  println!("check-ins  {}", stats.total_check_ins);
  println!("check-outs {}", stats.total_check_outs);
  println!("present    {}", stats.currently_present);

  if !stats.present_guests.is_empty() {
    println!();
    println!("present now:");
    for p in &stats.present_guests {
      println!("  {}  {:>6}  {}", local(p.in_ts), p.id, p.display_name);
    }
  }

  if !stats.top_hosts.is_empty() {
    println!();
    println!("top hosts:");
    for h in &stats.top_hosts {
      println!("  {:>4}/{:<4} {}", h.present_guests, h.total_guests, h.host);
    }
  }
}
