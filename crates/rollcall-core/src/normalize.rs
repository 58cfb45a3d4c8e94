//! Name normalization: turns one roster row into individual (name, host)
//! pairs.
//!
//! The guest-list cell is split on `,`, `&` and the word `and` (any case,
//! whitespace on both sides). Each piece is trimmed, inner whitespace runs
//! collapse to one space, and all-caps names are title-cased. Everything here
//! is pure so re-importing the same roster is deterministic.

use std::sync::LazyLock;

use regex::Regex;

use crate::roster::RosterRow;

static MULTISPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static AND_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());

/// One guest produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedGuest {
  pub display_name: String,
  /// Copied from the row's host cell; possibly empty.
  pub member_host:  String,
}

impl NormalizedGuest {
  /// Case-insensitive identity used by append-mode deduplication.
  pub fn dedup_key(&self) -> (String, String) {
    (self.display_name.to_lowercase(), host_key(&self.member_host))
  }
}

/// Normalize a whole row. A row without a guest-list cell yields nothing.
pub fn normalize_row(row: &RosterRow) -> Vec<NormalizedGuest> {
  let member_host = row.member_name.as_deref().map(clean_whitespace).unwrap_or_default();

  row
    .guest_names
    .as_deref()
    .map(split_guest_names)
    .unwrap_or_default()
    .into_iter()
    .map(|display_name| NormalizedGuest { display_name, member_host: member_host.clone() })
    .collect()
}

/// Split a guest-list cell into cleaned, non-empty names.
pub fn split_guest_names(input: &str) -> Vec<String> {
  let replaced = AND_SPLIT_RE.replace_all(input, ",");
  replaced.replace('&', ",").split(',').filter_map(clean_name).collect()
}

/// Trim and collapse whitespace.
pub fn clean_whitespace(value: &str) -> String {
  MULTISPACE_RE.replace_all(value.trim(), " ").into_owned()
}

/// Lower-cased host used for case-insensitive host grouping and lookup.
pub fn host_key(host: &str) -> String { clean_whitespace(host).to_lowercase() }

fn clean_name(value: &str) -> Option<String> {
  let collapsed = clean_whitespace(value);
  if collapsed.is_empty() {
    return None;
  }
  if is_all_caps(&collapsed) {
    Some(title_case(&collapsed))
  } else {
    Some(collapsed)
  }
}

fn is_all_caps(value: &str) -> bool {
  let mut letters = value.chars().filter(|c| c.is_alphabetic()).peekable();
  letters.peek().is_some() && letters.all(char::is_uppercase)
}

fn title_case(value: &str) -> String {
  value
    .split(' ')
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<String>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn names(guest_names: &str) -> Vec<String> {
    normalize_row(&RosterRow::new(guest_names, "Host"))
      .into_iter()
      .map(|g| g.display_name)
      .collect()
  }

  #[test]
  fn splits_on_all_delimiters() {
    let guests = normalize_row(&RosterRow::new("John Smith, Mary Jones & Alex Wu", "Chris Park"));
    assert_eq!(guests.len(), 3);
    assert!(guests.iter().all(|g| g.member_host == "Chris Park"));
    assert_eq!(names("Ann AND Bob and Cy"), ["Ann", "Bob", "Cy"]);
  }

  #[test]
  fn and_must_be_a_whole_word() {
    assert_eq!(names("Sandy Anderson"), ["Sandy Anderson"]);
    assert_eq!(names("Andrew,Band"), ["Andrew", "Band"]);
  }

  #[test]
  fn empty_tokens_are_dropped() {
    assert_eq!(names(" , & ,, Ann ,"), ["Ann"]);
    assert!(names("   ").is_empty());
    assert!(normalize_row(&RosterRow::default()).is_empty());
  }

  #[test]
  fn collapses_whitespace() {
    assert_eq!(names("  Mary \t  Jones  "), ["Mary Jones"]);
  }

  #[test]
  fn title_cases_only_all_caps() {
    assert_eq!(names("JOHN SMITH"), ["John Smith"]);
    assert_eq!(names("O'BRIEN"), ["O'brien"]);
    assert_eq!(names("McDONALD"), ["McDONALD"]);
    assert_eq!(names("mary jones"), ["mary jones"]);
    assert_eq!(names("GUEST 2"), ["Guest 2"]);
    assert_eq!(names("123"), ["123"]);
  }

  #[test]
  fn host_is_trimmed_and_copied() {
    let guests = normalize_row(&RosterRow::new("A & B", "  Chris   Park "));
    assert_eq!(guests[0].member_host, "Chris Park");
    assert_eq!(guests[1].member_host, "Chris Park");
  }

  #[test]
  fn dedup_key_ignores_case() {
    let a = NormalizedGuest { display_name: "Jane Smith".into(), member_host: "Chris Park".into() };
    let b = NormalizedGuest { display_name: "JANE SMITH".into(), member_host: "chris park".into() };
    assert_eq!(a.dedup_key(), b.dedup_key());
  }

  #[test]
  fn is_deterministic() {
    let row = RosterRow::new("x AND y & z", "h");
    assert_eq!(normalize_row(&row), normalize_row(&row));
  }
}
