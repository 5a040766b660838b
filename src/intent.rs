//! Query intent recognition.

use crate::config::{ScoreWeights, Vocabulary};
use crate::types::{Intent, IntentKind};
use std::collections::BTreeSet;
use tracing::trace;

/// Classifies the dominant signal of a query.
///
/// Each category's confidence is the share of its vocabulary present in the
/// query, multiplied by the category weight. The best category wins, and on
/// ties the one checked first (see [`IntentKind::CATEGORIES`]).
#[derive(Debug, Clone)]
pub struct IntentRecognizer {
  vocabulary: Vocabulary,
  weights: ScoreWeights,
}

impl IntentRecognizer {
  /// Creates a recognizer. Vocabulary entries are lower-cased.
  pub fn new(vocabulary: Vocabulary, weights: ScoreWeights) -> Self {
    Self {
      vocabulary: vocabulary.normalized(),
      weights,
    }
  }

  /// Recognizes the intent of a query.
  pub fn recognize(&self, query: &str) -> Intent {
    let lower = query.trim().to_lowercase();
    if lower.is_empty() {
      return Intent::general();
    }
    // "5w 30", "5w-30" and "5 l" are written many ways
    let compact: String = lower
      .chars()
      .filter(|c| !c.is_whitespace() && *c != '-')
      .collect();

    let mut best = Intent::general();

    for kind in IntentKind::CATEGORIES {
      let vocabulary = self.vocabulary.for_intent(kind);
      if vocabulary.is_empty() {
        continue;
      }

      let matched: BTreeSet<String> = vocabulary
        .iter()
        .filter(|word| !word.is_empty())
        .filter(|word| match kind {
          IntentKind::Viscosity | IntentKind::Capacity => {
            compact.contains(word.as_str()) || lower.contains(word.as_str())
          }
          _ => lower.contains(word.as_str()),
        })
        .cloned()
        .collect();

      if matched.is_empty() {
        continue;
      }

      let confidence =
        matched.len() as f32 / vocabulary.len() as f32 * self.weights.intent_weight(kind);
      trace!(?kind, confidence, ?matched, "intent candidate");

      if confidence > best.confidence {
        best = Intent {
          kind,
          confidence,
          matched_entities: matched,
        };
      }
    }

    best
  }
}

impl Default for IntentRecognizer {
  fn default() -> Self {
    Self::new(Vocabulary::default(), ScoreWeights::default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn vocabulary() -> Vocabulary {
    Vocabulary {
      brands: vec!["shell".into(), "total".into()],
      applications: vec!["engine".into(), "diesel".into()],
      product_types: vec!["oil".into(), "grease".into()],
      viscosities: vec!["5w30".into(), "10w40".into()],
      capacities: vec!["1l".into(), "5l".into()],
    }
  }

  #[test]
  fn test_general_when_nothing_matches() {
    let recognizer = IntentRecognizer::new(vocabulary(), ScoreWeights::default());
    let intent = recognizer.recognize("windshield wiper");
    assert_eq!(intent, Intent::general());
    assert_eq!(recognizer.recognize("   "), Intent::general());
  }

  #[test]
  fn test_viscosity_beats_brand_with_equal_share() {
    let recognizer = IntentRecognizer::new(vocabulary(), ScoreWeights::default());
    let intent = recognizer.recognize("Shell 5W-30");
    assert_eq!(intent.kind, IntentKind::Viscosity);
    assert!((intent.confidence - 0.45).abs() < 1e-6);
    assert!(intent.matched_entities.contains("5w30"));
  }

  #[test]
  fn test_more_matches_raise_confidence() {
    let recognizer = IntentRecognizer::new(vocabulary(), ScoreWeights::default());
    let intent = recognizer.recognize("shell or total");
    assert_eq!(intent.kind, IntentKind::Brand);
    assert!((intent.confidence - 0.8).abs() < 1e-6);
    assert_eq!(intent.matched_entities.len(), 2);
  }

  #[test]
  fn test_ties_go_to_first_category() {
    let weights = ScoreWeights {
      intent_product_type: 0.7,
      intent_application: 0.7,
      ..ScoreWeights::default()
    };
    let recognizer = IntentRecognizer::new(vocabulary(), weights);
    let intent = recognizer.recognize("engine oil");
    assert_eq!(intent.kind, IntentKind::ProductType);
  }

  #[test]
  fn test_capacity_with_space() {
    let recognizer = IntentRecognizer::new(vocabulary(), ScoreWeights::default());
    let intent = recognizer.recognize("bidon 5 L");
    assert_eq!(intent.kind, IntentKind::Capacity);
  }

  #[test]
  fn test_mixed_case_vocabulary() {
    let vocabulary = Vocabulary {
      brands: vec!["Valvoline".into(), "Shell".into()],
      ..vocabulary()
    };
    let recognizer = IntentRecognizer::new(vocabulary, ScoreWeights::default());
    let intent = recognizer.recognize("valvoline");
    assert_eq!(intent.kind, IntentKind::Brand);
    assert!(intent.matched_entities.contains("valvoline"));
  }
}
