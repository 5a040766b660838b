//! Core data types for the catalog search core.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A product record as supplied by the external catalog source.
///
/// Products are never mutated by a search. Optional fields degrade to the
/// empty string when scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  /// Opaque unique identifier.
  pub id: String,
  /// Display name.
  pub name: String,
  /// Manufacturer or internal code, the primary field for part-code matching.
  pub item_code: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub brand: Option<String>,
  /// Decimal price as a string, e.g. `"12.50"`.
  pub price: String,
}

impl Product {
  /// Creates a product with the required fields.
  pub fn new(
    id: impl Into<String>,
    name: impl Into<String>,
    item_code: impl Into<String>,
    price: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      item_code: item_code.into(),
      description: None,
      category: None,
      brand: None,
      price: price.into(),
    }
  }

  /// Sets the description.
  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  /// Sets the category.
  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = Some(category.into());
    self
  }

  /// Sets the brand.
  pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
    self.brand = Some(brand.into());
    self
  }

  /// The description, or `""` when absent.
  pub fn description(&self) -> &str {
    self.description.as_deref().unwrap_or("")
  }

  /// The category, or `""` when absent.
  pub fn category(&self) -> &str {
    self.category.as_deref().unwrap_or("")
  }

  /// The brand, or `""` when absent.
  pub fn brand(&self) -> &str {
    self.brand.as_deref().unwrap_or("")
  }

  /// Parses the price. Accepts a comma as decimal separator.
  pub fn price_value(&self) -> Option<f64> {
    let normalized = self.price.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|p| p.is_finite())
  }

  /// Whether the product can be ordered, i.e. has a strictly positive price.
  pub fn is_orderable(&self) -> bool {
    self.price_value().is_some_and(|p| p > 0.0)
  }

  /// Checks that the product can enter a search.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(SearchError::invalid_product(&self.id, "name is empty"));
    }
    if self.item_code.trim().is_empty() {
      return Err(SearchError::invalid_product(&self.id, "item code is empty"));
    }
    if self.price_value().is_none() {
      return Err(SearchError::invalid_product(
        &self.id,
        format!("price '{}' is not a number", self.price),
      ));
    }
    Ok(())
  }

  /// Lower-cased concatenation of every text field, used for substring
  /// and feature matching.
  pub fn searchable_text(&self) -> String {
    [
      self.name.as_str(),
      self.item_code.as_str(),
      self.description(),
      self.category(),
      self.brand(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
  }
}

/// Decodes a JSON array of products.
pub fn decode_catalog(json: &str) -> Result<Vec<Product>> {
  Ok(serde_json::from_str(json)?)
}

/// The product field an exact term was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedField {
  Name,
  Code,
  Description,
  Category,
}

/// The specification signal that produced a specification-tier match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
  Viscosity,
  Grade,
  Volume,
  /// An entity of the recognized query intent found in the product.
  Intent,
}

/// Why a product matched.
///
/// The variant order of [`MatchType::priority`] is used to break score ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum MatchType {
  /// A query part code is contained in the product's item code.
  OemExact,
  /// A query part code closely resembles one of the product's codes.
  OemSimilar,
  /// A weaker part-code signal.
  OemPartial,
  /// A query term is a substring of a product field.
  Exact(MatchedField),
  /// Shared viscosity, grade, volume or intent entity.
  Specification(SpecKind),
  /// Edit-distance match.
  Fuzzy,
  /// A compatible, different-brand substitute for a confident result.
  Alternative,
}

impl MatchType {
  /// Tie-break rank, lower wins.
  pub fn priority(&self) -> u8 {
    match self {
      MatchType::OemExact => 0,
      MatchType::OemSimilar => 1,
      MatchType::Exact(MatchedField::Name) => 2,
      MatchType::Exact(MatchedField::Code) => 3,
      MatchType::OemPartial => 4,
      MatchType::Exact(MatchedField::Description | MatchedField::Category) => 5,
      MatchType::Specification(SpecKind::Viscosity) => 6,
      MatchType::Specification(SpecKind::Grade) => 7,
      MatchType::Specification(SpecKind::Volume) => 8,
      MatchType::Specification(SpecKind::Intent) => 9,
      MatchType::Fuzzy => 10,
      MatchType::Alternative => 11,
    }
  }

  /// Short label for UI badges.
  pub fn label(&self) -> &'static str {
    match self {
      MatchType::OemExact => "oem_exact",
      MatchType::OemSimilar => "oem_similar",
      MatchType::OemPartial => "oem_partial",
      MatchType::Exact(_) => "exact",
      MatchType::Specification(_) => "specification",
      MatchType::Fuzzy => "fuzzy",
      MatchType::Alternative => "alternative",
    }
  }
}

impl fmt::Display for MatchType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// The score of one (query, product) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
  /// Relevance in `[0, 1]`.
  pub score: f32,
  pub match_type: MatchType,
}

impl ScoredMatch {
  /// A non-match.
  pub const NONE: ScoredMatch = ScoredMatch {
    score: 0.0,
    match_type: MatchType::Fuzzy,
  };

  /// Creates a match, clamping `score` into `[0, 1]`.
  ///
  /// A NaN score stays NaN; the ranker excludes such products.
  pub fn new(score: f32, match_type: MatchType) -> Self {
    Self {
      score: score.clamp(0.0, 1.0),
      match_type,
    }
  }

  /// Raises this match to `candidate` if the candidate scores strictly higher.
  ///
  /// Ties keep the earlier tier.
  pub fn raise(&mut self, candidate: ScoredMatch) {
    if candidate.score > self.score {
      *self = candidate;
    }
  }
}

/// A product returned by a search, borrowed from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<'a> {
  pub product: &'a Product,
  /// Relevance in `[0, 1]`, higher is better.
  pub score: f32,
  pub match_type: MatchType,
  /// Explanation shown next to alternatives and suggestions.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

impl<'a> SearchResult<'a> {
  /// Creates a result without a reason.
  pub fn new(product: &'a Product, scored: ScoredMatch) -> Self {
    Self {
      product,
      score: scored.score,
      match_type: scored.match_type,
      reason: None,
    }
  }

  /// Sets the explanation.
  pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
    self.reason = Some(reason.into());
    self
  }
}

/// The dominant signal type of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
  Viscosity,
  Brand,
  ProductType,
  Capacity,
  Application,
  General,
}

impl IntentKind {
  /// Categories in recognition order. Earlier categories win ties.
  pub const CATEGORIES: [IntentKind; 5] = [
    IntentKind::Viscosity,
    IntentKind::Brand,
    IntentKind::ProductType,
    IntentKind::Capacity,
    IntentKind::Application,
  ];
}

/// The recognized intent of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
  pub kind: IntentKind,
  /// Confidence in `[0, 1]`.
  pub confidence: f32,
  /// Vocabulary entries of `kind` found in the query.
  pub matched_entities: BTreeSet<String>,
}

impl Intent {
  /// The intent of a query with no recognizable signal.
  pub fn general() -> Self {
    Self {
      kind: IntentKind::General,
      confidence: 0.0,
      matched_entities: BTreeSet::new(),
    }
  }

  pub fn is_general(&self) -> bool {
    self.kind == IntentKind::General
  }
}

impl Default for Intent {
  fn default() -> Self {
    Self::general()
  }
}

/// Why a search produced no confident results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchNotice {
  /// Nothing was left to search after filtering.
  EmptyCatalog,
  /// The query matched nothing with confidence.
  NoMatch { query: String, has_suggestions: bool },
}

impl fmt::Display for SearchNotice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SearchNotice::EmptyCatalog => write!(f, "No products are available."),
      SearchNotice::NoMatch {
        query,
        has_suggestions: true,
      } => write!(
        f,
        "No products match \"{query}\". Here are some similar products."
      ),
      SearchNotice::NoMatch {
        query,
        has_suggestions: false,
      } => write!(f, "No products match \"{query}\"."),
    }
  }
}

/// The complete answer to a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartSearchResult<'a> {
  /// Confident matches, best first.
  pub results: Vec<SearchResult<'a>>,
  /// Alternatives and low-confidence candidates.
  pub suggestions: Vec<SearchResult<'a>>,
  /// Pre-formatted banner text, present when `results` is empty.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub no_results_message: Option<String>,
  /// Machine-readable form of `no_results_message` for localization.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notice: Option<SearchNotice>,
}

impl<'a> SmartSearchResult<'a> {
  /// A result with nothing in it.
  pub fn empty() -> Self {
    Self {
      results: Vec::new(),
      suggestions: Vec::new(),
      no_results_message: None,
      notice: None,
    }
  }

  /// Sets the notice and its formatted message.
  pub fn with_notice(mut self, notice: SearchNotice) -> Self {
    self.no_results_message = Some(notice.to_string());
    self.notice = Some(notice);
    self
  }

  pub fn is_empty(&self) -> bool {
    self.results.is_empty() && self.suggestions.is_empty()
  }
}
