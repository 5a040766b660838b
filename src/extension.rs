//! Hooks into the search lifecycle.

use crate::types::{Product, SmartSearchResult};

/// A trait for extensions that can hook into a search.
///
/// Hooks run inside a single search call, in registration order. An
/// extension that is itself a pure function keeps the search pure.
///
/// # Examples
///
/// Expanding a shorthand before the query is analysed:
///
/// ```rust
/// use partfinder::prelude::*;
///
/// struct Synonyms;
///
/// impl SearchExtension for Synonyms {
///   fn before_query(&self, query: &mut String) {
///     if query.eq_ignore_ascii_case("atf") {
///       *query = "transmission fluid".to_string();
///     }
///   }
/// }
/// ```
pub trait SearchExtension: Send + Sync {
  /// Called with the raw query before it is analysed.
  fn before_query(&self, _query: &mut String) {}

  /// Called with the products that passed the filters, before scoring.
  ///
  /// Extensions may remove or reorder products here, e.g. to hide items a
  /// customer is not allowed to order.
  fn before_items(&self, _query: &str, _items: &mut Vec<&Product>) {}

  /// Called with the ranked result before it is returned.
  fn after_rank(&self, _query: &str, _result: &mut SmartSearchResult<'_>) {}
}
