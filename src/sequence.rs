//! Helpers for the calling layer: debouncing and discarding stale results.
//!
//! The search core is synchronous and pure, so it needs neither of these
//! itself. They encode the expected calling convention for interactive
//! "search as you type" front ends.

use crate::config::SearchConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// How long to wait after a keystroke before searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncePolicy {
  delay: Duration,
}

impl DebouncePolicy {
  pub fn new(delay: Duration) -> Self {
    Self { delay }
  }

  pub fn from_config(config: &SearchConfig) -> Self {
    Self::new(Duration::from_millis(config.debounce_ms))
  }

  /// The configured delay for a non-empty query, zero for a cleared one.
  pub fn delay_for(&self, query: &str) -> Duration {
    if query.trim().is_empty() {
      Duration::ZERO
    } else {
      self.delay
    }
  }
}

impl Default for DebouncePolicy {
  fn default() -> Self {
    Self::from_config(&SearchConfig::default())
  }
}

/// Identifies one issued search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(u64);

impl SearchTicket {
  pub fn sequence(&self) -> u64 {
    self.0
  }
}

/// Hands out increasing tickets so that only the latest search is rendered.
///
/// Call [`issue`](SearchSequencer::issue) when a search starts and pass the
/// finished result through [`accept`](SearchSequencer::accept). Results of
/// searches that were superseded while running are dropped whole; a
/// superseded search never yields a partial ranking.
#[derive(Debug, Default)]
pub struct SearchSequencer {
  latest: AtomicU64,
}

impl SearchSequencer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts a new search, superseding every earlier ticket.
  pub fn issue(&self) -> SearchTicket {
    SearchTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
  }

  /// Whether `ticket` belongs to the most recently issued search.
  pub fn is_current(&self, ticket: SearchTicket) -> bool {
    self.latest.load(Ordering::Acquire) == ticket.0
  }

  /// Returns `result` if `ticket` is still current, `None` if it is stale.
  pub fn accept<T>(&self, ticket: SearchTicket, result: T) -> Option<T> {
    self.is_current(ticket).then_some(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_delay_for() {
    let policy = DebouncePolicy::default();
    assert_eq!(policy.delay_for("5w30"), Duration::from_millis(500));
    assert_eq!(policy.delay_for("   "), Duration::ZERO);
  }

  #[test]
  fn test_stale_results_are_discarded() {
    let sequencer = SearchSequencer::new();
    let first = sequencer.issue();
    let second = sequencer.issue();
    assert!(first < second);

    // the later search finishes first
    assert_eq!(sequencer.accept(second, "second"), Some("second"));
    assert_eq!(sequencer.accept(first, "first"), None);
  }

  #[test]
  fn test_concurrent_issue_is_unique() {
    let sequencer = std::sync::Arc::new(SearchSequencer::new());
    let handles: Vec<_> = (0..4)
      .map(|_| {
        let sequencer = sequencer.clone();
        std::thread::spawn(move || (0..100).map(|_| sequencer.issue().sequence()).collect::<Vec<_>>())
      })
      .collect();

    let mut all: Vec<u64> = handles
      .into_iter()
      .flat_map(|h| h.join().unwrap())
      .collect();
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), 400);
    assert!(sequencer.is_current(SearchTicket(400)));
  }
}
