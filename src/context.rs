//! Per-query state shared by every product score of a search.

use crate::extract::{FeatureExtractor, Features};
use crate::intent::IntentRecognizer;
use crate::types::Intent;

/// A query analysed once per search.
///
/// Scorers receive a `QueryContext` instead of the raw query string so the
/// extractors and the intent recognizer run once per search, not once per
/// product.
#[derive(Debug, Clone)]
pub struct QueryContext {
  /// The query as typed, trimmed.
  pub text: String,
  /// Lower-cased `text`.
  pub normalized: String,
  /// Lower-cased whitespace tokens of at least two characters.
  pub tokens: Vec<String>,
  /// Signals extracted from the query.
  pub features: Features,
  pub intent: Intent,
}

/// Tokens shorter than this are ignored by the term tiers.
pub const MIN_TOKEN_LEN: usize = 2;

impl QueryContext {
  /// Analyses a query.
  pub fn new(query: &str, extractor: &FeatureExtractor, recognizer: &IntentRecognizer) -> Self {
    let intent = recognizer.recognize(query);
    Self::with_intent(query, extractor, intent)
  }

  /// Analyses a query whose intent is already known.
  pub fn with_intent(query: &str, extractor: &FeatureExtractor, intent: Intent) -> Self {
    let text = query.trim().to_string();
    let normalized = text.to_lowercase();
    let tokens = tokenize(&normalized);
    let features = extractor.extract(&text);

    Self {
      text,
      normalized,
      tokens,
      features,
      intent,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.text.is_empty()
  }
}

/// Splits on whitespace and drops tokens shorter than [`MIN_TOKEN_LEN`].
pub fn tokenize(text: &str) -> Vec<String> {
  text
    .split_whitespace()
    .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
    .map(str::to_lowercase)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tokenize() {
    let tokens = tokenize("Shell  Helix 5W30 a 1L");
    assert_eq!(tokens, vec!["shell", "helix", "5w30", "1l"]);
  }

  #[test]
  fn test_context_trims_and_extracts() {
    let context = QueryContext::new(
      "  Filter ABC12345  ",
      &FeatureExtractor::default(),
      &IntentRecognizer::default(),
    );
    assert_eq!(context.text, "Filter ABC12345");
    assert_eq!(context.normalized, "filter abc12345");
    assert!(context.features.codes.contains("ABC12345"));
    assert!(!context.is_empty());
  }
}
