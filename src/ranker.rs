//! Ranking, confidence partitioning and compatible alternatives.

use crate::config::SearchConfig;
use crate::context::QueryContext;
use crate::error::SearchError;
use crate::extract::{FeatureExtractor, Features};
use crate::scorer::RelevanceScorer;
use crate::types::{
  MatchType, MatchedField, Product, ScoredMatch, SearchNotice, SearchResult, SmartSearchResult,
};
use tracing::warn;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const SUGGESTION_REASON: &str = "Similar to your search";

/// A product with its score and catalog position.
#[derive(Debug, Clone, Copy)]
struct Scored<'a> {
  position: usize,
  product: &'a Product,
  matched: ScoredMatch,
}

impl<'a> Scored<'a> {
  fn to_result(self) -> SearchResult<'a> {
    SearchResult::new(self.product, self.matched)
  }
}

/// Orders scored products and picks suggestions.
///
/// Results are sorted by score, then by [`MatchType::priority`], then by
/// catalog position. Products at or above the confident threshold become
/// results. When there are none, the best low-confidence candidates become
/// suggestions. Otherwise the top results serve as anchors, and
/// lower-scoring products that share their specification under a different
/// brand are offered as alternatives.
#[derive(Debug, Clone)]
pub struct Ranker {
  config: SearchConfig,
  extractor: FeatureExtractor,
}

impl Ranker {
  /// Creates a ranker. Thresholds and limits come from `config`; the
  /// extractor supplies product features for the alternative finder.
  pub fn new(config: SearchConfig, extractor: FeatureExtractor) -> Self {
    Self { config, extractor }
  }

  /// Scores and ranks `products` for `query`.
  ///
  /// Products whose scorer returns an error or a non-finite score are
  /// logged and left out.
  pub fn rank<'a>(
    &self,
    query: &QueryContext,
    products: &[&'a Product],
    scorer: &dyn RelevanceScorer,
  ) -> SmartSearchResult<'a> {
    if products.is_empty() {
      return SmartSearchResult::empty().with_notice(SearchNotice::EmptyCatalog);
    }

    if query.is_empty() {
      let results = products
        .iter()
        .map(|&product| {
          SearchResult::new(product, ScoredMatch::new(1.0, MatchType::Exact(MatchedField::Name)))
        })
        .collect();
      return SmartSearchResult {
        results,
        ..SmartSearchResult::empty()
      };
    }

    let mut scored = score_all(query, products, scorer);
    sort_scored(&mut scored);

    let threshold = self.config.confident_threshold;
    let (confident, rest): (Vec<Scored<'a>>, Vec<Scored<'a>>) = scored
      .into_iter()
      .partition(|s| s.matched.score >= threshold);
    let low: Vec<Scored<'a>> = rest
      .iter()
      .copied()
      .filter(|s| s.matched.score >= self.config.suggestion_floor)
      .collect();

    if confident.is_empty() {
      let suggestions: Vec<SearchResult<'a>> = low
        .into_iter()
        .take(self.config.max_suggestions)
        .map(|s| s.to_result().with_reason(SUGGESTION_REASON))
        .collect();
      let notice = SearchNotice::NoMatch {
        query: query.text.clone(),
        has_suggestions: !suggestions.is_empty(),
      };
      return SmartSearchResult {
        suggestions,
        ..SmartSearchResult::empty()
      }
      .with_notice(notice);
    }

    let mut suggestions = self.find_alternatives(&confident, &rest);
    let alternative_positions: Vec<usize> = suggestions.iter().map(|(pos, _)| *pos).collect();

    if suggestions.len() < self.config.suggestion_fill {
      let fill = low
        .into_iter()
        .filter(|s| !alternative_positions.contains(&s.position))
        .take(self.config.suggestion_fill - suggestions.len())
        .map(|s| (s.position, s.to_result().with_reason(SUGGESTION_REASON)));
      suggestions.extend(fill);
    }

    SmartSearchResult {
      results: confident.into_iter().map(Scored::to_result).collect(),
      suggestions: suggestions.into_iter().map(|(_, r)| r).collect(),
      ..SmartSearchResult::empty()
    }
  }

  /// Different-brand products compatible with one of the anchors.
  fn find_alternatives<'a>(
    &self,
    confident: &[Scored<'a>],
    candidates: &[Scored<'a>],
  ) -> Vec<(usize, SearchResult<'a>)> {
    let anchors: Vec<(&Scored<'a>, Features)> = confident
      .iter()
      .take(self.config.anchor_count)
      .map(|s| (s, self.extractor.product_features(s.product)))
      .collect();

    let mut alternatives = Vec::new();
    for candidate in candidates {
      if alternatives.len() >= self.config.max_alternatives {
        break;
      }
      let features = self.extractor.product_features(candidate.product);
      let hit = anchors
        .iter()
        .find_map(|(anchor, anchor_features)| {
          shared_specification(anchor_features, &features).map(|shared| (anchor, shared))
        });

      if let Some((anchor, shared)) = hit {
        let reason = format!(
          "Compatible alternative to {}: same {}",
          anchor.product.name,
          shared.join(", ")
        );
        let result = SearchResult::new(
          candidate.product,
          ScoredMatch::new(candidate.matched.score, MatchType::Alternative),
        )
        .with_reason(reason);
        alternatives.push((candidate.position, result));
      }
    }

    alternatives
  }
}

/// The specification values two products share, if they are compatible.
///
/// Compatible products share a viscosity or an application, also share a
/// volume or the application, and have two known, different brands.
fn shared_specification(anchor: &Features, candidate: &Features) -> Option<Vec<String>> {
  let same = |a: &Option<String>, b: &Option<String>| a.is_some() && a == b;

  let viscosity = same(&anchor.viscosity, &candidate.viscosity);
  let application = same(&anchor.application, &candidate.application);
  let volume = same(&anchor.volume, &candidate.volume);
  let different_brand = matches!(
    (&anchor.brand, &candidate.brand),
    (Some(a), Some(b)) if a != b
  );

  if !((viscosity || application) && (volume || application) && different_brand) {
    return None;
  }

  let shared = [
    (viscosity, &anchor.viscosity),
    (volume, &anchor.volume),
    (application, &anchor.application),
  ]
  .into_iter()
  .filter_map(|(is_shared, value)| if is_shared { value.clone() } else { None })
  .collect();
  Some(shared)
}

fn score_one<'a>(
  query: &QueryContext,
  position: usize,
  product: &'a Product,
  scorer: &dyn RelevanceScorer,
) -> Option<Scored<'a>> {
  let scored = scorer.score(query, product).and_then(|matched| {
    if matched.score.is_finite() {
      Ok(matched)
    } else {
      Err(SearchError::scoring(
        &product.id,
        format!("score {} is not a finite number", matched.score),
      ))
    }
  });
  match scored {
    Ok(matched) => Some(Scored {
      position,
      product,
      matched,
    }),
    Err(e) => {
      warn!(id = %product.id, scorer = scorer.name(), error = %e, "Excluding product from search");
      None
    }
  }
}

#[cfg(feature = "parallel")]
fn score_all<'a>(
  query: &QueryContext,
  products: &[&'a Product],
  scorer: &dyn RelevanceScorer,
) -> Vec<Scored<'a>> {
  products
    .par_iter()
    .enumerate()
    .filter_map(|(position, &product)| score_one(query, position, product, scorer))
    .collect()
}

#[cfg(not(feature = "parallel"))]
fn score_all<'a>(
  query: &QueryContext,
  products: &[&'a Product],
  scorer: &dyn RelevanceScorer,
) -> Vec<Scored<'a>> {
  products
    .iter()
    .enumerate()
    .filter_map(|(position, &product)| score_one(query, position, product, scorer))
    .collect()
}

fn sort_scored(scored: &mut [Scored<'_>]) {
  scored.sort_by(|a, b| {
    b.matched
      .score
      .total_cmp(&a.matched.score)
      .then_with(|| a.matched.match_type.priority().cmp(&b.matched.match_type.priority()))
      .then_with(|| a.position.cmp(&b.position))
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Result;
  use crate::intent::IntentRecognizer;
  use crate::scorer::HeuristicScorer;

  fn ranker() -> Ranker {
    Ranker::new(SearchConfig::default(), FeatureExtractor::default())
  }

  fn context(query: &str) -> QueryContext {
    QueryContext::new(query, &FeatureExtractor::default(), &IntentRecognizer::default())
  }

  fn features(viscosity: &str, volume: &str, application: &str, brand: &str) -> Features {
    let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
    Features {
      viscosity: opt(viscosity),
      volume: opt(volume),
      application: opt(application),
      brand: opt(brand),
      ..Features::default()
    }
  }

  #[test]
  fn test_shared_specification() {
    let shell = features("5W30", "1L", "", "shell");
    let total = features("5W30", "1L", "", "total");
    assert_eq!(
      shared_specification(&shell, &total),
      Some(vec!["5W30".to_string(), "1L".to_string()])
    );

    // same brand
    assert_eq!(shared_specification(&shell, &shell), None);
    // viscosity alone is not enough
    let total_5l = features("5W30", "5L", "", "total");
    assert_eq!(shared_specification(&shell, &total_5l), None);
    // a shared application is
    let gear_a = features("", "", "gear", "motul");
    let gear_b = features("", "", "gear", "elf");
    assert_eq!(shared_specification(&gear_a, &gear_b), Some(vec!["gear".to_string()]));
    // unknown brand
    let unbranded = features("5W30", "1L", "", "");
    assert_eq!(shared_specification(&shell, &unbranded), None);
  }

  #[test]
  fn test_ties_follow_match_type_priority() {
    let a = Product::new("a", "A", "A1", "1");
    let b = Product::new("b", "B", "B1", "1");
    let mut scored = vec![
      Scored {
        position: 0,
        product: &a,
        matched: ScoredMatch::new(0.7, MatchType::Exact(MatchedField::Description)),
      },
      Scored {
        position: 1,
        product: &b,
        matched: ScoredMatch::new(0.7, MatchType::OemPartial),
      },
    ];
    sort_scored(&mut scored);
    assert_eq!(scored[0].product.id, "b");
  }

  #[test]
  fn test_empty_catalog_notice() {
    let result = ranker().rank(&context("oil"), &[], &HeuristicScorer::default());
    assert!(result.is_empty());
    assert_eq!(result.notice, Some(SearchNotice::EmptyCatalog));
    assert!(result.no_results_message.is_some());
  }

  struct FailingScorer;

  impl RelevanceScorer for FailingScorer {
    fn score(&self, _query: &QueryContext, product: &Product) -> Result<ScoredMatch> {
      if product.id == "broken" {
        return Err(SearchError::scoring(&product.id, "corrupt record"));
      }
      Ok(ScoredMatch::new(0.9, MatchType::Fuzzy))
    }
  }

  #[test]
  fn test_scorer_failure_excludes_only_that_product() {
    let ok = Product::new("ok", "Grease", "GR1234", "3.00");
    let broken = Product::new("broken", "Grease", "GR9999", "3.00");
    let result = ranker().rank(&context("grease"), &[&broken, &ok], &FailingScorer);
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].product.id, "ok");
  }

  struct NanScorer;

  impl RelevanceScorer for NanScorer {
    fn score(&self, _query: &QueryContext, product: &Product) -> Result<ScoredMatch> {
      let n: usize = product.id.parse().unwrap();
      if n % 3 == 0 {
        return Ok(ScoredMatch {
          score: f32::NAN,
          match_type: MatchType::Fuzzy,
        });
      }
      Ok(ScoredMatch::new((n % 10) as f32 / 10.0, MatchType::Fuzzy))
    }
  }

  #[test]
  fn test_non_finite_scores_are_excluded() {
    let catalog: Vec<Product> = (0..200)
      .map(|n| Product::new(n.to_string(), "Grease", format!("GR{n:04}"), "3.00"))
      .collect();
    let refs: Vec<&Product> = catalog.iter().collect();

    let result = ranker().rank(&context("grease"), &refs, &NanScorer);

    assert!(!result.results.is_empty());
    for r in result.results.iter().chain(result.suggestions.iter()) {
      assert!(r.score.is_finite());
      assert_ne!(r.product.id.parse::<usize>().unwrap() % 3, 0);
    }
    for pair in result.results.windows(2) {
      assert!(pair[0].score >= pair[1].score);
    }
  }

  #[test]
  fn test_suggestion_fill_from_low_confidence() {
    struct Fixed;
    impl RelevanceScorer for Fixed {
      fn score(&self, _query: &QueryContext, product: &Product) -> Result<ScoredMatch> {
        let score = match product.id.as_str() {
          "hit" => 0.9,
          "near" => 0.3,
          "far" => 0.2,
          _ => 0.05,
        };
        Ok(ScoredMatch::new(score, MatchType::Fuzzy))
      }
    }

    let catalog = [
      Product::new("noise", "Noise", "N1", "1"),
      Product::new("far", "Far", "F1", "1"),
      Product::new("hit", "Hit", "H1", "1"),
      Product::new("near", "Near", "N2", "1"),
    ];
    let refs: Vec<&Product> = catalog.iter().collect();
    let result = ranker().rank(&context("hit"), &refs, &Fixed);

    assert_eq!(result.results.len(), 1);
    let ids: Vec<&str> = result.suggestions.iter().map(|s| s.product.id.as_str()).collect();
    assert_eq!(ids, vec!["near", "far"]);
    assert!(result.notice.is_none());
  }
}
