//! Relevance scoring of a single (query, product) pair.

use crate::config::ScoreWeights;
use crate::context::QueryContext;
use crate::error::Result;
use crate::extract::{
  extract_grades, extract_viscosities, extract_volumes, normalize_code, FeatureExtractor, Features,
};
use crate::similarity::{code_similarity, levenshtein_ratio, normalized_similarity};
use crate::types::{Intent, IntentKind, MatchType, MatchedField, Product, ScoredMatch, SpecKind};

/// Minimum query token length for the fuzzy tier.
const MIN_FUZZY_TOKEN_LEN: usize = 3;

/// Code similarity at which a part-code match counts as similar.
const OEM_SIMILAR_THRESHOLD: f32 = 0.8;

/// A pluggable scoring strategy.
///
/// The engine calls `score` once per product that survived pre-filtering.
/// An `Err` excludes that product from the search without affecting the
/// rest of the catalog, so an implementation backed by a remote model can
/// fail per product and still be safe to use.
pub trait RelevanceScorer: Send + Sync {
  /// A short name used in logs.
  fn name(&self) -> &str {
    "custom"
  }

  /// Scores one product against an analysed query.
  fn score(&self, query: &QueryContext, product: &Product) -> Result<ScoredMatch>;
}

/// The default tiered heuristic scorer.
///
/// Tiers run in order and the score is the running maximum, so a later tier
/// can only raise it:
///
/// 1. part codes (`oem_exact`, `oem_similar`, `oem_partial`),
/// 2. query terms found verbatim in the name, code, description or category,
/// 3. edit-distance matching, skipped once the score reaches the fuzzy gate,
/// 4. shared viscosity, grade, volume or intent entity, skipped once the
///    score reaches the specification gate.
///
/// On equal scores the earlier tier keeps the match type.
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
  weights: ScoreWeights,
  extractor: FeatureExtractor,
}

impl HeuristicScorer {
  /// Creates a scorer with the given tier weights.
  ///
  /// The extractor must be built from the same vocabulary as the intent
  /// recognizer producing the query's [`Intent`].
  pub fn new(weights: ScoreWeights, extractor: FeatureExtractor) -> Self {
    Self { weights, extractor }
  }

  /// Scores a raw query string with a known intent.
  pub fn score_query(&self, query: &str, product: &Product, intent: &Intent) -> Result<ScoredMatch> {
    let context = QueryContext::with_intent(query, &self.extractor, intent.clone());
    self.score(&context, product)
  }

  fn oem_tier(
    &self,
    query: &QueryContext,
    product: &Product,
    features: &Features,
    text: &str,
    best: &mut ScoredMatch,
  ) {
    if query.features.codes.is_empty() {
      return;
    }

    let item_code = normalize_code(&product.item_code);
    if query.features.codes.iter().any(|code| item_code.contains(code.as_str())) {
      best.raise(ScoredMatch::new(1.0, MatchType::OemExact));
      return;
    }

    let top = query
      .features
      .codes
      .iter()
      .flat_map(|q| features.codes.iter().map(move |p| code_similarity(q, p)))
      .fold(0.0_f32, f32::max);

    if top >= 1.0 {
      best.raise(ScoredMatch::new(1.0, MatchType::OemExact));
    } else if top >= OEM_SIMILAR_THRESHOLD {
      best.raise(ScoredMatch::new(top, MatchType::OemSimilar));
    } else {
      let upper = text.to_uppercase();
      if query.features.codes.iter().any(|code| upper.contains(code.as_str())) {
        best.raise(ScoredMatch::new(self.weights.oem_partial, MatchType::OemPartial));
      }
      if top > 0.0 {
        best.raise(ScoredMatch::new(top, MatchType::OemPartial));
      }
    }
  }

  fn exact_tier(&self, query: &QueryContext, product: &Product, best: &mut ScoredMatch) {
    let fields = [
      (product.name.to_lowercase(), MatchedField::Name, self.weights.exact_name),
      (product.item_code.to_lowercase(), MatchedField::Code, self.weights.exact_code),
      (
        product.description().to_lowercase(),
        MatchedField::Description,
        self.weights.exact_description,
      ),
      (
        product.category().to_lowercase(),
        MatchedField::Category,
        self.weights.exact_description,
      ),
    ];

    for token in &query.tokens {
      let hit = fields
        .iter()
        .find(|(value, _, _)| value.contains(token.as_str()));
      if let Some((_, field, weight)) = hit {
        best.raise(ScoredMatch::new(*weight, MatchType::Exact(*field)));
      }
    }
  }

  fn fuzzy_tier(&self, query: &QueryContext, product: &Product, best: &mut ScoredMatch) {
    let fields = [
      (product.name.to_lowercase(), self.weights.fuzzy_name),
      (product.item_code.to_lowercase(), self.weights.fuzzy_code),
      (product.description().to_lowercase(), self.weights.fuzzy_description),
    ];

    let mut top = 0.0_f32;
    for token in query
      .tokens
      .iter()
      .filter(|t| t.chars().count() >= MIN_FUZZY_TOKEN_LEN)
    {
      for (value, weight) in &fields {
        top = top.max(field_similarity(token, value) * weight);
      }
    }

    if top > 0.0 {
      best.raise(ScoredMatch::new(top, MatchType::Fuzzy));
    }
  }

  fn specification_tier(&self, query: &QueryContext, text: &str, best: &mut ScoredMatch) {
    let signals = [
      (&query.features.viscosity, SpecKind::Viscosity, self.weights.viscosity),
      (&query.features.grade, SpecKind::Grade, self.weights.grade),
      (&query.features.volume, SpecKind::Volume, self.weights.volume),
    ];
    for (wanted, kind, weight) in signals {
      let Some(wanted) = wanted else { continue };
      // products may list several values, e.g. "10W40 / 15W40"
      let offered = match kind {
        SpecKind::Viscosity => extract_viscosities(text),
        SpecKind::Grade => extract_grades(text),
        _ => extract_volumes(text),
      };
      if offered.contains(wanted) {
        best.raise(ScoredMatch::new(weight, MatchType::Specification(kind)));
      }
    }

    let intent = &query.intent;
    if intent.kind == IntentKind::General {
      return;
    }
    let compact: String = text
      .chars()
      .filter(|c| !c.is_whitespace() && *c != '-')
      .collect();
    let found = intent
      .matched_entities
      .iter()
      .any(|entity| text.contains(entity.as_str()) || compact.contains(entity.as_str()));
    if found {
      let weight = self.weights.intent_entity * self.weights.intent_weight(intent.kind);
      best.raise(ScoredMatch::new(weight, MatchType::Specification(SpecKind::Intent)));
    }
  }
}

/// Best similarity of a token against a whole field or any word in it.
///
/// Words shorter than [`MIN_FUZZY_TOKEN_LEN`] are ignored, and words are
/// compared by edit distance only: a lone `l` in "5 L" must not count as
/// contained in every query token.
fn field_similarity(token: &str, field: &str) -> f32 {
  let whole = if field.chars().count() >= MIN_FUZZY_TOKEN_LEN {
    normalized_similarity(token, field)
  } else {
    0.0
  };
  field
    .split(|c: char| !c.is_alphanumeric())
    .filter(|word| word.chars().count() >= MIN_FUZZY_TOKEN_LEN)
    .map(|word| levenshtein_ratio(token, word))
    .fold(whole, f32::max)
}

impl Default for HeuristicScorer {
  fn default() -> Self {
    Self::new(ScoreWeights::default(), FeatureExtractor::default())
  }
}

impl RelevanceScorer for HeuristicScorer {
  fn name(&self) -> &str {
    "heuristic"
  }

  fn score(&self, query: &QueryContext, product: &Product) -> Result<ScoredMatch> {
    product.validate()?;

    let features = self.extractor.product_features(product);
    let text = product.searchable_text();
    let mut best = ScoredMatch::NONE;

    self.oem_tier(query, product, &features, &text, &mut best);
    self.exact_tier(query, product, &mut best);
    if best.score < self.weights.fuzzy_gate {
      self.fuzzy_tier(query, product, &mut best);
    }
    if best.score < self.weights.specification_gate {
      self.specification_tier(query, &text, &mut best);
    }

    Ok(best)
  }
}
