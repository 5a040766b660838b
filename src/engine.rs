//! The search orchestrator invoked for every query or filter change.

use crate::config::SearchConfig;
use crate::context::QueryContext;
use crate::error::Result;
use crate::extension::SearchExtension;
use crate::extract::FeatureExtractor;
use crate::filter::SearchFilters;
use crate::intent::IntentRecognizer;
use crate::ranker::Ranker;
use crate::scorer::{HeuristicScorer, RelevanceScorer};
use crate::types::{Intent, Product, SmartSearchResult};
use tracing::{debug, warn};

/// The catalog search engine.
///
/// A `SearchEngine` holds only configuration. Every call to
/// [`search`](SearchEngine::search) is a pure function of the query, the
/// catalog and the filters, so one engine can be shared between threads and
/// called concurrently.
///
/// ## Calling convention
///
/// Scoring a full catalog is too expensive to run on every keystroke.
/// Callers are expected to debounce: search
/// [`SearchConfig::debounce_ms`] after the last keystroke while the query is
/// non-empty, and immediately when the query is cleared (see
/// [`DebouncePolicy`](crate::sequence::DebouncePolicy)). When searches may
/// complete out of order, only the latest one should be rendered (see
/// [`SearchSequencer`](crate::sequence::SearchSequencer)).
///
/// ## Search lifecycle
///
/// 1. `before_query` hooks may rewrite the query.
/// 2. Products failing [`Product::validate`], priced at zero or below, or
///    outside the selected facets are dropped.
/// 3. `before_items` hooks may narrow the remaining products.
/// 4. The query is analysed once ([`QueryContext`]).
/// 5. The [`Ranker`] scores, sorts and partitions the products and looks for
///    alternatives.
/// 6. `after_rank` hooks may adjust the result.
///
/// # Examples
///
/// ```rust
/// use partfinder::prelude::*;
///
/// let catalog = vec![
///   Product::new("1", "Shell Helix 5W30 1L", "550046", "9.90").with_brand("Shell"),
///   Product::new("2", "Total Quartz 5W30 1L", "213765", "8.50").with_brand("Total"),
/// ];
///
/// let engine = SearchEngine::builder().build();
/// let result = engine.search("helix", &catalog, &SearchFilters::default());
///
/// assert_eq!(result.results[0].product.id, "1");
/// ```
pub struct SearchEngine {
  config: SearchConfig,
  extractor: FeatureExtractor,
  recognizer: IntentRecognizer,
  scorer: Box<dyn RelevanceScorer>,
  ranker: Ranker,
  extensions: Vec<Box<dyn SearchExtension>>,
}

impl SearchEngine {
  /// Creates a new `SearchEngineBuilder` to construct an engine.
  pub fn builder() -> SearchEngineBuilder {
    SearchEngineBuilder::new()
  }

  /// The configuration the engine was built with.
  pub fn config(&self) -> &SearchConfig {
    &self.config
  }

  /// Recognizes the intent of a query.
  ///
  /// This is the same analysis a search runs internally, exposed for UIs
  /// that want to show what the query was understood as.
  ///
  /// # Examples
  ///
  /// ```rust
  /// use partfinder::prelude::*;
  ///
  /// let engine = SearchEngine::default();
  /// assert_eq!(engine.recognize_intent("10W-40").kind, IntentKind::Viscosity);
  /// assert!(engine.recognize_intent("windshield wiper").is_general());
  /// ```
  pub fn recognize_intent(&self, query: &str) -> Intent {
    self.recognizer.recognize(query)
  }

  /// Searches `catalog` for `query` within `filters`.
  ///
  /// # Returns
  ///
  /// A [`SmartSearchResult`] borrowing from `catalog`: confident results
  /// best first, then alternatives and low-confidence suggestions.
  ///
  /// Never fails. Products that cannot be scored are logged and left out,
  /// and "nothing found" is reported through
  /// [`SmartSearchResult::no_results_message`].
  pub fn search<'a>(
    &self,
    query: &str,
    catalog: &'a [Product],
    filters: &SearchFilters,
  ) -> SmartSearchResult<'a> {
    let mut query = query.to_string();
    for ext in &self.extensions {
      ext.before_query(&mut query);
    }

    let mut items: Vec<&'a Product> = catalog
      .iter()
      .filter(|product| match product.validate() {
        Ok(()) => true,
        Err(e) => {
          warn!(id = %product.id, error = %e, "Skipping invalid product");
          false
        }
      })
      .filter(|product| filters.admits(product))
      .collect();

    for ext in &self.extensions {
      ext.before_items(&query, &mut items);
    }

    let context = QueryContext::new(&query, &self.extractor, &self.recognizer);
    let mut result = self.ranker.rank(&context, &items, self.scorer.as_ref());

    for ext in &self.extensions {
      ext.after_rank(&query, &mut result);
    }

    debug!(
      query = %context.text,
      intent = ?context.intent.kind,
      scorer = self.scorer.name(),
      catalog = catalog.len(),
      searched = items.len(),
      results = result.results.len(),
      suggestions = result.suggestions.len(),
      "Search completed"
    );

    result
  }

  /// Scores and ranks products that are already filtered.
  ///
  /// Unlike [`search`](SearchEngine::search), no filters, validation or
  /// extensions are applied.
  pub fn rank<'a>(&self, query: &str, products: &[&'a Product]) -> SmartSearchResult<'a> {
    let context = QueryContext::new(query, &self.extractor, &self.recognizer);
    self.ranker.rank(&context, products, self.scorer.as_ref())
  }
}

impl Default for SearchEngine {
  fn default() -> Self {
    Self::builder().build()
  }
}

/// A builder for creating `SearchEngine` instances.
///
/// Without a scorer the engine uses [`HeuristicScorer`] configured from the
/// engine's [`SearchConfig`].
#[derive(Default)]
pub struct SearchEngineBuilder {
  config: Option<SearchConfig>,
  scorer: Option<Box<dyn RelevanceScorer>>,
  extensions: Vec<Box<dyn SearchExtension>>,
}

impl SearchEngineBuilder {
  /// Creates a builder with the default configuration and scorer.
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the configuration.
  pub fn config(mut self, config: SearchConfig) -> Self {
    self.config = Some(config);
    self
  }

  /// Loads and validates a JSON configuration.
  ///
  /// Missing fields take their defaults.
  ///
  /// # Errors
  ///
  /// Returns [`SearchError::Json`](crate::SearchError::Json) for malformed
  /// JSON and [`SearchError::Config`](crate::SearchError::Config) when the
  /// thresholds are inconsistent.
  ///
  /// # Examples
  ///
  /// ```rust
  /// use partfinder::prelude::*;
  ///
  /// let engine = SearchEngine::builder()
  ///   .config_json(r#"{"confident_threshold": 0.5}"#)?
  ///   .build();
  /// assert_eq!(engine.config().confident_threshold, 0.5);
  /// # Ok::<(), SearchError>(())
  /// ```
  pub fn config_json(self, json: &str) -> Result<Self> {
    Ok(self.config(SearchConfig::from_json_str(json)?))
  }

  /// Replaces the default scorer.
  pub fn scorer(mut self, scorer: Box<dyn RelevanceScorer>) -> Self {
    self.scorer = Some(scorer);
    self
  }

  /// Adds an extension.
  pub fn with_extension(mut self, extension: Box<dyn SearchExtension>) -> Self {
    self.extensions.push(extension);
    self
  }

  /// Builds the engine.
  ///
  /// The extractors, the intent recognizer and the default scorer are all
  /// derived from the one configuration.
  pub fn build(self) -> SearchEngine {
    let config = self.config.unwrap_or_default();
    let extractor = FeatureExtractor::new(&config.vocabulary);
    let recognizer = IntentRecognizer::new(config.vocabulary.clone(), config.weights.clone());
    let scorer = self.scorer.unwrap_or_else(|| {
      Box::new(HeuristicScorer::new(config.weights.clone(), extractor.clone()))
    });
    let ranker = Ranker::new(config.clone(), extractor.clone());

    SearchEngine {
      config,
      extractor,
      recognizer,
      scorer,
      ranker,
      extensions: self.extensions,
    }
  }
}
