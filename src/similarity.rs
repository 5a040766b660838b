//! String and part-code similarity.

use strsim::levenshtein;

/// Case-insensitive similarity of two strings in `[0, 1]`.
///
/// - `1.0` when the lower-cased strings are equal (two empty strings included),
/// - `0.0` when exactly one of them is empty,
/// - `0.9` when one contains the other,
/// - otherwise `1 - levenshtein(a, b) / max(len(a), len(b))`, lengths counted
///   in characters.
pub fn similarity(a: &str, b: &str) -> f32 {
  let a = a.to_lowercase();
  let b = b.to_lowercase();
  normalized_similarity(&a, &b)
}

/// [`similarity`] for inputs that are already lower-cased.
pub(crate) fn normalized_similarity(a: &str, b: &str) -> f32 {
  if a == b {
    return 1.0;
  }
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }
  if a.contains(b) || b.contains(a) {
    return 0.9;
  }
  levenshtein_ratio(a, b)
}

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, without the containment
/// shortcut of [`similarity`].
pub(crate) fn levenshtein_ratio(a: &str, b: &str) -> f32 {
  let max_len = a.chars().count().max(b.chars().count());
  if max_len == 0 {
    return 1.0;
  }
  let distance = levenshtein(a, b);
  (1.0 - distance as f32 / max_len as f32).clamp(0.0, 1.0)
}

/// Similarity of two normalized (upper-case, alphanumeric) part codes.
///
/// Identical codes score `1.0`, containment `0.9`, a shared three-character
/// prefix and suffix `0.8`, a shared prefix or suffix `0.6`. Anything else
/// falls back to [`similarity`] and is kept only above `0.7`.
pub fn code_similarity(a: &str, b: &str) -> f32 {
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }
  if a == b {
    return 1.0;
  }
  if a.contains(b) || b.contains(a) {
    return 0.9;
  }

  let prefix = affix_matches(a, b, |s, n| s.chars().take(n).collect());
  let suffix = affix_matches(a, b, |s, n| {
    let chars: Vec<char> = s.chars().collect();
    chars[chars.len() - n..].iter().collect()
  });

  match (prefix, suffix) {
    (true, true) => 0.8,
    (true, false) | (false, true) => 0.6,
    (false, false) => {
      let fallback = normalized_similarity(&a.to_lowercase(), &b.to_lowercase());
      if fallback > 0.7 {
        fallback
      } else {
        0.0
      }
    }
  }
}

const AFFIX_LEN: usize = 3;

fn affix_matches(a: &str, b: &str, affix: impl Fn(&str, usize) -> String) -> bool {
  if a.chars().count() < AFFIX_LEN || b.chars().count() < AFFIX_LEN {
    return false;
  }
  affix(a, AFFIX_LEN) == affix(b, AFFIX_LEN)
}
