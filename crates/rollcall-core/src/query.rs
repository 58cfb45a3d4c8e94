//! Search query tokenization and the typo-tolerant fallback matcher.
//!
//! The primary search path is a prefix index owned by the store. When it
//! finds nothing, the store scans guests in insertion order and keeps those
//! accepted by [`SearchQuery::fuzzy_matches`].

/// Result limit used when the caller does not supply one.
pub const DEFAULT_LIMIT: usize = 25;

/// Upper bound applied to every caller-supplied limit.
pub const MAX_LIMIT: usize = 200;

/// Tokens shorter than this only match as plain substrings.
const MIN_FUZZY_TOKEN: usize = 3;

pub fn clamp_limit(limit: usize) -> usize { limit.min(MAX_LIMIT) }

/// A parsed free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
  tokens: Vec<String>,
}

impl SearchQuery {
  /// Split on whitespace, lower-case, strip non-alphanumerics, drop empties.
  pub fn parse(text: &str) -> Self {
    let tokens = text.split_whitespace().map(clean_token).filter(|t| !t.is_empty()).collect();
    Self { tokens }
  }

  pub fn is_empty(&self) -> bool { self.tokens.is_empty() }

  pub fn tokens(&self) -> &[String] { &self.tokens }

  /// Tokens re-joined with single spaces.
  pub fn text(&self) -> String { self.tokens.join(" ") }

  /// Every token must match at least one of `fields`, either as a substring
  /// or, for longer tokens, as a word prefix one edit (including a
  /// transposition) away.
  pub fn fuzzy_matches(&self, fields: &[&str]) -> bool {
    let fields: Vec<String> = fields.iter().map(|f| fold_field(f)).collect();
    self
      .tokens
      .iter()
      .all(|token| fields.iter().any(|field| token_matches(token, field)))
  }
}

fn clean_token(token: &str) -> String {
  token.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

/// Lower-case and drop everything but alphanumerics and whitespace, so
/// fields compare the way tokens were cleaned.
fn fold_field(field: &str) -> String {
  field
    .chars()
    .filter(|c| c.is_alphanumeric() || c.is_whitespace())
    .flat_map(char::to_lowercase)
    .collect()
}

fn token_matches(token: &str, field: &str) -> bool {
  if field.contains(token) {
    return true;
  }

  let len = token.chars().count();
  if len < MIN_FUZZY_TOKEN {
    return false;
  }

  field.split_whitespace().any(|word| {
    let prefix: String = word.chars().take(len).collect();
    strsim::damerau_levenshtein(token, &prefix) <= 1
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_cleans_tokens() {
    let q = SearchQuery::parse("  Jan   SM!  ");
    assert_eq!(q.tokens(), ["jan", "sm"]);
    assert_eq!(q.text(), "jan sm");
  }

  #[test]
  fn punctuation_only_is_empty() {
    assert!(SearchQuery::parse("  -- ? ").is_empty());
    assert!(SearchQuery::parse("").is_empty());
  }

  #[test]
  fn transposition_is_tolerated() {
    let q = SearchQuery::parse("jnae smi");
    assert!(q.fuzzy_matches(&["Jane Smith", ""]));
  }

  #[test]
  fn substring_in_either_field() {
    let q = SearchQuery::parse("ane park");
    assert!(q.fuzzy_matches(&["Jane Smith", "Chris Park"]));
  }

  #[test]
  fn punctuation_in_field_is_ignored() {
    assert!(SearchQuery::parse("obrien").fuzzy_matches(&["Pat O'Brien", ""]));
  }

  #[test]
  fn every_token_must_match() {
    let q = SearchQuery::parse("jane zzz");
    assert!(!q.fuzzy_matches(&["Jane Smith", "Chris Park"]));
  }

  #[test]
  fn short_tokens_are_not_fuzzy() {
    assert!(!SearchQuery::parse("jx").fuzzy_matches(&["Jane Smith"]));
  }

  #[test]
  fn two_edits_do_not_match() {
    assert!(!SearchQuery::parse("jxxe").fuzzy_matches(&["Jane Smith"]));
  }

  #[test]
  fn limit_is_clamped() {
    assert_eq!(clamp_limit(10), 10);
    assert_eq!(clamp_limit(10_000), MAX_LIMIT);
  }
}
