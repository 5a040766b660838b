//! Tunable thresholds, weights and vocabularies.
//!
//! Every numeric cut-off used by the scorer and ranker lives here so that
//! relevance can be tuned per deployment without code changes. The defaults
//! reproduce the reference behaviour for an automotive lubricants catalog.

use crate::error::{Result, SearchError};
use crate::types::IntentKind;
use serde::{Deserialize, Serialize};

/// Configuration of a [`SearchEngine`](crate::engine::SearchEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
  /// Minimum score of a confident result.
  #[serde(default = "default_confident_threshold")]
  pub confident_threshold: f32,
  /// Minimum score of a low-confidence suggestion.
  #[serde(default = "default_suggestion_floor")]
  pub suggestion_floor: f32,
  /// Suggestions shown when there are no confident results.
  #[serde(default = "default_max_suggestions")]
  pub max_suggestions: usize,
  /// Cap on compatible alternatives.
  #[serde(default = "default_max_alternatives")]
  pub max_alternatives: usize,
  /// Number of top results used as anchors for alternatives.
  #[serde(default = "default_anchor_count")]
  pub anchor_count: usize,
  /// Suggestion slots topped up from low-confidence candidates when few
  /// alternatives are found.
  #[serde(default = "default_suggestion_fill")]
  pub suggestion_fill: usize,
  #[serde(default)]
  pub weights: ScoreWeights,
  #[serde(default)]
  pub vocabulary: Vocabulary,
  /// Delay after the last keystroke before a non-empty query is searched.
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
}

fn default_confident_threshold() -> f32 {
  0.4
}

fn default_suggestion_floor() -> f32 {
  0.15
}

fn default_max_suggestions() -> usize {
  5
}

fn default_max_alternatives() -> usize {
  5
}

fn default_anchor_count() -> usize {
  3
}

fn default_suggestion_fill() -> usize {
  3
}

fn default_debounce_ms() -> u64 {
  500
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      confident_threshold: default_confident_threshold(),
      suggestion_floor: default_suggestion_floor(),
      max_suggestions: default_max_suggestions(),
      max_alternatives: default_max_alternatives(),
      anchor_count: default_anchor_count(),
      suggestion_fill: default_suggestion_fill(),
      weights: ScoreWeights::default(),
      vocabulary: Vocabulary::default(),
      debounce_ms: default_debounce_ms(),
    }
  }
}

impl SearchConfig {
  /// Parses a JSON configuration. Missing fields take their defaults.
  pub fn from_json_str(json: &str) -> Result<Self> {
    let mut config: SearchConfig = serde_json::from_str(json)?;
    config.vocabulary = config.vocabulary.normalized();
    config.validate()?;
    Ok(config)
  }

  /// Checks that thresholds are consistent.
  pub fn validate(&self) -> Result<()> {
    let unit = [
      ("confident_threshold", self.confident_threshold),
      ("suggestion_floor", self.suggestion_floor),
      ("fuzzy_gate", self.weights.fuzzy_gate),
      ("specification_gate", self.weights.specification_gate),
    ];
    for (name, value) in unit {
      if !(0.0..=1.0).contains(&value) {
        return Err(SearchError::Config(format!(
          "{name} must be within [0, 1], got {value}"
        )));
      }
    }
    if self.suggestion_floor > self.confident_threshold {
      return Err(SearchError::Config(format!(
        "suggestion_floor ({}) exceeds confident_threshold ({})",
        self.suggestion_floor, self.confident_threshold
      )));
    }
    Ok(())
  }

  /// Sets the confident threshold.
  pub fn confident_threshold(mut self, threshold: f32) -> Self {
    self.confident_threshold = threshold;
    self
  }

  /// Sets the suggestion floor.
  pub fn suggestion_floor(mut self, floor: f32) -> Self {
    self.suggestion_floor = floor;
    self
  }

  /// Replaces the brand vocabulary.
  pub fn brands<I, S>(mut self, brands: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.vocabulary.brands = brands.into_iter().map(|b| b.into().to_lowercase()).collect();
    self
  }

  /// Sets the debounce delay.
  pub fn debounce_ms(mut self, ms: u64) -> Self {
    self.debounce_ms = ms;
    self
  }
}

/// Per-tier scores and gates used by the heuristic scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
  pub exact_name: f32,
  pub exact_code: f32,
  pub exact_description: f32,
  /// The fuzzy tier only runs while the running score is below this.
  pub fuzzy_gate: f32,
  pub fuzzy_name: f32,
  pub fuzzy_code: f32,
  pub fuzzy_description: f32,
  /// The specification tier only runs while the running score is below this.
  pub specification_gate: f32,
  pub viscosity: f32,
  pub grade: f32,
  pub volume: f32,
  /// Multiplied by the intent category weight for an intent entity hit.
  pub intent_entity: f32,
  pub oem_partial: f32,
  /// Category weights of the intent recognizer.
  pub intent_viscosity: f32,
  pub intent_brand: f32,
  pub intent_product_type: f32,
  pub intent_capacity: f32,
  pub intent_application: f32,
}

impl Default for ScoreWeights {
  fn default() -> Self {
    Self {
      exact_name: 0.85,
      exact_code: 0.8,
      exact_description: 0.7,
      fuzzy_gate: 0.7,
      fuzzy_name: 0.8,
      fuzzy_code: 0.9,
      fuzzy_description: 0.6,
      specification_gate: 0.6,
      viscosity: 0.6,
      grade: 0.55,
      volume: 0.5,
      intent_entity: 0.5,
      oem_partial: 0.7,
      intent_viscosity: 0.9,
      intent_brand: 0.8,
      intent_product_type: 0.7,
      intent_capacity: 0.6,
      intent_application: 0.7,
    }
  }
}

impl ScoreWeights {
  /// The recognizer weight of an intent category.
  pub fn intent_weight(&self, kind: IntentKind) -> f32 {
    match kind {
      IntentKind::Viscosity => self.intent_viscosity,
      IntentKind::Brand => self.intent_brand,
      IntentKind::ProductType => self.intent_product_type,
      IntentKind::Capacity => self.intent_capacity,
      IntentKind::Application => self.intent_application,
      IntentKind::General => 0.0,
    }
  }
}

/// Closed vocabularies for the extractors and the intent recognizer.
///
/// Entries are matched against lower-cased text. The extractors and the
/// recognizer lower-case them on construction, so `"Valvoline"` in a JSON
/// configuration works the same as `"valvoline"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
  pub brands: Vec<String>,
  pub applications: Vec<String>,
  pub product_types: Vec<String>,
  pub viscosities: Vec<String>,
  pub capacities: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
  list.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
  fn default() -> Self {
    Self {
      brands: words(&["total", "shell", "mobil", "castrol", "afriquia", "motul", "elf"]),
      applications: words(&["engine", "gasoline", "diesel", "gear", "transmission", "hydraulic"]),
      product_types: words(&["oil", "huile", "lubricant", "grease", "coolant", "fluid", "filter"]),
      viscosities: words(&[
        "0w20", "0w30", "5w20", "5w30", "5w40", "10w30", "10w40", "15w40", "20w50", "75w90",
        "80w90",
      ]),
      capacities: words(&["1l", "2l", "4l", "5l", "20l", "60l", "208l"]),
    }
  }
}

impl Vocabulary {
  /// Returns the vocabulary with every entry trimmed and lower-cased.
  pub fn normalized(&self) -> Self {
    let lower = |list: &[String]| -> Vec<String> {
      list.iter().map(|word| word.trim().to_lowercase()).collect()
    };
    Self {
      brands: lower(&self.brands),
      applications: lower(&self.applications),
      product_types: lower(&self.product_types),
      viscosities: lower(&self.viscosities),
      capacities: lower(&self.capacities),
    }
  }

  /// The vocabulary of an intent category.
  pub fn for_intent(&self, kind: IntentKind) -> &[String] {
    match kind {
      IntentKind::Viscosity => &self.viscosities,
      IntentKind::Brand => &self.brands,
      IntentKind::ProductType => &self.product_types,
      IntentKind::Capacity => &self.capacities,
      IntentKind::Application => &self.applications,
      IntentKind::General => &[],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partial_json_uses_defaults() {
    let config = SearchConfig::from_json_str(r#"{"confident_threshold": 0.5}"#).unwrap();
    assert_eq!(config.confident_threshold, 0.5);
    assert_eq!(config.suggestion_floor, 0.15);
    assert_eq!(config.weights.exact_name, 0.85);
    assert_eq!(config.vocabulary.brands.len(), 7);
    assert_eq!(config.debounce_ms, 500);
  }

  #[test]
  fn test_nested_weights_override() {
    let config =
      SearchConfig::from_json_str(r#"{"weights": {"viscosity": 0.65}}"#).unwrap();
    assert_eq!(config.weights.viscosity, 0.65);
    assert_eq!(config.weights.volume, 0.5);
  }

  #[test]
  fn test_rejects_floor_above_threshold() {
    let err = SearchConfig::from_json_str(
      r#"{"confident_threshold": 0.2, "suggestion_floor": 0.3}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SearchError::Config(_)));
  }

  #[test]
  fn test_rejects_out_of_range() {
    let config = SearchConfig::default().confident_threshold(1.5);
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_brands_are_lowercased() {
    let config = SearchConfig::default().brands(["Valvoline", "LIQUI MOLY"]);
    assert_eq!(config.vocabulary.brands, vec!["valvoline", "liqui moly"]);
  }

  #[test]
  fn test_json_vocabulary_is_lowercased() {
    let config =
      SearchConfig::from_json_str(r#"{"vocabulary": {"brands": ["Valvoline", " Shell "]}}"#).unwrap();
    assert_eq!(config.vocabulary.brands, vec!["valvoline", "shell"]);
  }

  #[test]
  fn test_malformed_json() {
    assert!(matches!(
      SearchConfig::from_json_str("{not json"),
      Err(SearchError::Json(_))
    ));
  }
}
