//! Partfinder - relevance search for product catalogs.
//!
//! Partfinder ranks an in-memory product catalog against a free-text query
//! that may be a product name, part of a description, a manufacturer part
//! code, or a technical specification such as an oil viscosity. It recognizes
//! part-code lookups, explains why each product matched, and proposes
//! compatible products of other brands when the best matches are few.
//!
//! A search is a pure function of `(query, catalog, filters)`: nothing is
//! indexed or cached between calls.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod extension;
pub mod extract;
pub mod filter;
pub mod intent;
pub mod ranker;
pub mod scorer;
pub mod sequence;
pub mod similarity;
pub mod types;

pub use error::{Result, SearchError};

pub mod prelude {
  //! Convenient re-exports for common types and traits.

  pub use crate::config::*;
  pub use crate::context::QueryContext;
  pub use crate::engine::*;
  pub use crate::error::{Result, SearchError};
  pub use crate::extension::*;
  pub use crate::filter::*;
  pub use crate::scorer::*;
  pub use crate::sequence::*;
  pub use crate::similarity::{code_similarity, similarity};
  pub use crate::types::*;
}
