//! Catalog facet filters applied before scoring.

use crate::types::Product;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Category and brand selections from the catalog sidebar.
///
/// An empty set means "no restriction". Comparisons ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
  #[serde(default)]
  pub categories: BTreeSet<String>,
  #[serde(default)]
  pub brands: BTreeSet<String>,
}

impl SearchFilters {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a selected category.
  pub fn category(mut self, category: impl Into<String>) -> Self {
    self.categories.insert(category.into());
    self
  }

  /// Adds a selected brand.
  pub fn brand(mut self, brand: impl Into<String>) -> Self {
    self.brands.insert(brand.into());
    self
  }

  pub fn is_empty(&self) -> bool {
    self.categories.is_empty() && self.brands.is_empty()
  }

  /// Whether a product passes the facet selections. Price is not checked here.
  pub fn matches(&self, product: &Product) -> bool {
    selected(&self.categories, product.category()) && selected(&self.brands, product.brand())
  }

  /// Whether a product may enter a search: orderable and within the facets.
  pub fn admits(&self, product: &Product) -> bool {
    product.is_orderable() && self.matches(product)
  }

  /// The distinct categories and brands present in a catalog.
  pub fn facets(catalog: &[Product]) -> Facets {
    let mut facets = Facets::default();
    for product in catalog {
      if !product.category().trim().is_empty() {
        facets.categories.insert(product.category().trim().to_string());
      }
      if !product.brand().trim().is_empty() {
        facets.brands.insert(product.brand().trim().to_string());
      }
    }
    facets
  }
}

fn selected(selection: &BTreeSet<String>, value: &str) -> bool {
  selection.is_empty() || selection.iter().any(|s| s.trim().eq_ignore_ascii_case(value.trim()))
}

/// Values available for filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
  pub categories: BTreeSet<String>,
  pub brands: BTreeSet<String>,
}
