//! Error types for the search core.
//!
//! Searching itself never fails: these errors describe individual products
//! that could not be scored, and configuration or catalog input that could
//! not be decoded.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while preparing or scoring a search.
#[derive(Debug, Error)]
pub enum SearchError {
  /// A product that does not satisfy the catalog invariants.
  #[error("invalid product '{id}': {reason}")]
  InvalidProduct { id: String, reason: String },

  /// A scorer failed on a single product.
  #[error("scoring failed for product '{id}': {message}")]
  Scoring { id: String, message: String },

  /// Invalid search configuration.
  #[error("invalid configuration: {0}")]
  Config(String),

  /// JSON decoding error.
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl SearchError {
  /// Creates an [`SearchError::InvalidProduct`] error.
  pub fn invalid_product(id: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::InvalidProduct {
      id: id.into(),
      reason: reason.into(),
    }
  }

  /// Creates a [`SearchError::Scoring`] error.
  pub fn scoring(id: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Scoring {
      id: id.into(),
      message: message.into(),
    }
  }
}
