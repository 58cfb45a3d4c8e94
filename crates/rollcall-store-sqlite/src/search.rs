//! Guest and host search over the `guest_fts` prefix index, with a fuzzy
//! scan when the index finds nothing.

use std::cmp::Reverse;

use rollcall_core::{
  guest::{GuestId, GuestMatch, HostSummary},
  query::SearchQuery,
};
use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;

use crate::encode::{MATCH_COLUMNS, guest_match_from_row};

// ─── FTS query text ──────────────────────────────────────────────────────────

/// Build an FTS5 expression requiring every token as a prefix, optionally
/// restricted to one column.
fn fts_prefix_query(query: &SearchQuery, column: Option<&str>) -> String {
  query
    .tokens()
    .iter()
    .map(|token| {
      let phrase = format!("\"{}\"*", token.replace('"', "\"\""));
      match column {
        Some(column) => format!("{column} : {phrase}"),
        None => phrase,
      }
    })
    .collect::<Vec<_>>()
    .join(" AND ")
}

// ─── Guests ──────────────────────────────────────────────────────────────────

pub fn search_guests(
  conn: &Connection,
  query: &SearchQuery,
  limit: usize,
) -> rusqlite::Result<Vec<GuestMatch>> {
  if limit == 0 {
    return Ok(Vec::new());
  }
  if query.is_empty() {
    return all_guests(conn, limit);
  }

  let hits = prefix_guests(conn, query, limit)?;
  if !hits.is_empty() {
    return Ok(hits);
  }

  debug!(query = %query.text(), "no prefix match; scanning for fuzzy matches");
  fuzzy_guests(conn, query, limit)
}

fn all_guests(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<GuestMatch>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {MATCH_COLUMNS} FROM guests g ORDER BY g.name_key, g.id LIMIT ?1"
  ))?;
  stmt.query_map([limit as i64], guest_match_from_row)?.collect()
}

pub fn prefix_guests(
  conn: &Connection,
  query: &SearchQuery,
  limit: usize,
) -> rusqlite::Result<Vec<GuestMatch>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {MATCH_COLUMNS}
     FROM guest_fts
     JOIN guests g ON g.id = guest_fts.rowid
     WHERE guest_fts MATCH ?1
     ORDER BY bm25(guest_fts), g.id
     LIMIT ?2"
  ))?;
  stmt
    .query_map(params![fts_prefix_query(query, None), limit as i64], guest_match_from_row)?
    .collect()
}

/// Insertion-order scan accepting guests the fuzzy matcher likes.
fn fuzzy_guests(
  conn: &Connection,
  query: &SearchQuery,
  limit: usize,
) -> rusqlite::Result<Vec<GuestMatch>> {
  let mut ids: Vec<GuestId> = Vec::new();
  {
    let mut stmt = conn.prepare("SELECT id, display_name, member_host FROM guests ORDER BY id")?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
      let name: String = row.get(1)?;
      let host: String = row.get(2)?;
      if query.fuzzy_matches(&[name.as_str(), host.as_str()]) {
        ids.push(row.get(0)?);
        if ids.len() == limit {
          break;
        }
      }
    }
  }

  let mut stmt = conn.prepare(&format!("SELECT {MATCH_COLUMNS} FROM guests g WHERE g.id = ?1"))?;
  let mut results = Vec::with_capacity(ids.len());
  for id in ids {
    if let Some(hit) = stmt.query_row([id], guest_match_from_row).optional()? {
      results.push(hit);
    }
  }
  Ok(results)
}

/// Guests whose host key equals `host_key`, by name.
pub fn guests_for_host(conn: &Connection, host_key: &str) -> rusqlite::Result<Vec<GuestMatch>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {MATCH_COLUMNS} FROM guests g WHERE g.host_key = ?1 ORDER BY g.name_key, g.id"
  ))?;
  stmt.query_map([host_key], guest_match_from_row)?.collect()
}

// ─── Hosts ───────────────────────────────────────────────────────────────────

/// One aggregated host, before ranking.
struct HostRow {
  key:      String,
  first_id: GuestId,
  summary:  HostSummary,
}

/// Aggregate every non-empty host, or only those whose guests match `fts`.
fn host_rows(conn: &Connection, fts: Option<&str>) -> rusqlite::Result<Vec<HostRow>> {
  let filter = if fts.is_some() {
    "AND g.host_key IN (
       SELECT host_key FROM guests
       WHERE id IN (SELECT rowid FROM guest_fts WHERE guest_fts MATCH ?1))"
  } else {
    ""
  };

  let mut stmt = conn.prepare(&format!(
    "SELECT g.host_key, MIN(g.id), MIN(g.member_host), COUNT(*),
       SUM(EXISTS(SELECT 1 FROM checkins c WHERE c.guest_id = g.id AND c.out_ts IS NULL))
     FROM guests g
     WHERE g.host_key != '' {filter}
     GROUP BY g.host_key"
  ))?;

  match fts {
    Some(fts) => stmt.query_map([fts], host_row)?.collect(),
    None => stmt.query_map([], host_row)?.collect(),
  }
}

fn host_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HostRow> {
  Ok(HostRow {
    key:      row.get(0)?,
    first_id: row.get(1)?,
    summary:  HostSummary {
      host:           row.get(2)?,
      total_guests:   row.get(3)?,
      present_guests: row.get(4)?,
    },
  })
}

pub fn search_hosts(
  conn: &Connection,
  query: &SearchQuery,
  limit: usize,
) -> rusqlite::Result<Vec<HostSummary>> {
  if limit == 0 {
    return Ok(Vec::new());
  }

  if query.is_empty() {
    let mut rows = host_rows(conn, None)?;
    rows.sort_by(|a, b| {
      Reverse(a.summary.present_guests)
        .cmp(&Reverse(b.summary.present_guests))
        .then_with(|| a.key.cmp(&b.key))
    });
    return Ok(take(rows, limit));
  }

  let mut rows = host_rows(conn, Some(&fts_prefix_query(query, Some("member_host"))))?;
  if !rows.is_empty() {
    // Hosts that start with the whole query outrank word-level matches.
    let text = query.text();
    rows.sort_by_cached_key(|row| {
      (!row.key.starts_with(&text), Reverse(row.summary.present_guests), row.key.clone())
    });
    return Ok(take(rows, limit));
  }

  debug!(query = %query.text(), "no host prefix match; scanning for fuzzy matches");
  let mut rows: Vec<HostRow> = host_rows(conn, None)?
    .into_iter()
    .filter(|row| query.fuzzy_matches(&[row.summary.host.as_str()]))
    .collect();
  rows.sort_by_key(|row| row.first_id);
  Ok(take(rows, limit))
}

/// Rank hosts for the stats rollup: present desc, total desc, name asc.
pub fn top_hosts(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<HostSummary>> {
  let mut rows = host_rows(conn, None)?;
  rows.sort_by(|a, b| {
    Reverse(a.summary.present_guests)
      .cmp(&Reverse(b.summary.present_guests))
      .then_with(|| Reverse(a.summary.total_guests).cmp(&Reverse(b.summary.total_guests)))
      .then_with(|| a.key.cmp(&b.key))
  });
  Ok(take(rows, limit))
}

fn take(rows: Vec<HostRow>, limit: usize) -> Vec<HostSummary> {
  rows.into_iter().take(limit).map(|row| row.summary).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prefix_query_ands_tokens() {
    let q = SearchQuery::parse("Jan sm");
    assert_eq!(fts_prefix_query(&q, None), "\"jan\"* AND \"sm\"*");
  }

  #[test]
  fn prefix_query_with_column() {
    let q = SearchQuery::parse("chris");
    assert_eq!(fts_prefix_query(&q, Some("member_host")), "member_host : \"chris\"*");
  }
}
