//! Domain feature extractors.
//!
//! Each extractor scans free text (a query, or the concatenated fields of a
//! product) and pulls out one structured signal. Extractors never fail: a
//! missing signal is `None` or an empty set.

use crate::config::Vocabulary;
use crate::types::Product;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeSet;

static CODE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"(?i)\b(?:oem[\s:#-]*)?([a-z]{2,4}[a-z0-9]{4,}|\d{5,}[a-z]*|[a-z]{2,}\d{3,}|\d{3,}[a-z]\d*)\b",
  )
  .expect("valid regex")
});

static VISCOSITY_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)\b(\d{1,2})\s*w\s*-?\s*(\d{2,3})\b").expect("valid regex")
});

static VOLUME_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)\b(\d+(?:[.,]\d+)?)\s*(?:l|ltr|litres?|liters?)\b").expect("valid regex")
});

static GRADE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)\b(api|acea)\s*[:-]?\s*([a-z]{1,2}\d{0,2}(?:-\d{1,2})?)\b")
    .expect("valid regex")
});

// hyphens inside codes ("BP-1001") and grades ("5W-30")
static INNER_HYPHEN_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"([A-Za-z0-9])-([A-Za-z0-9])").expect("valid regex"));

const MIN_CODE_LEN: usize = 4;

/// Structured signals found in a piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features {
  /// Candidate part codes, upper-case.
  pub codes: BTreeSet<String>,
  /// Viscosity grade such as `5W30`.
  pub viscosity: Option<String>,
  /// Volume such as `1L` or `4.5L`.
  pub volume: Option<String>,
  /// Performance grade such as `API SN` or `ACEA C3`.
  pub grade: Option<String>,
  /// Lower-case brand token.
  pub brand: Option<String>,
  /// Lower-case application token.
  pub application: Option<String>,
}

/// Extracts part/OEM codes.
///
/// Codes contain at least one digit and at least four characters. A leading
/// `OEM` marker is dropped, and viscosity or volume designations are never
/// reported as codes.
pub fn extract_codes(text: &str) -> BTreeSet<String> {
  let text = INNER_HYPHEN_RE.replace_all(text, "$1$2");
  let mut codes = BTreeSet::new();

  for cap in CODE_RE.captures_iter(&text) {
    let raw = cap[1].to_uppercase();
    let code = match raw.strip_prefix("OEM") {
      Some(rest) if rest.len() >= MIN_CODE_LEN => rest.to_string(),
      _ => raw,
    };

    if code.len() < MIN_CODE_LEN || !code.chars().any(|c| c.is_ascii_digit()) {
      continue;
    }
    if is_full_match(&VISCOSITY_RE, &code) || is_full_match(&VOLUME_RE, &code) {
      continue;
    }
    codes.insert(code);
  }

  codes
}

fn is_full_match(re: &Regex, text: &str) -> bool {
  re.find(text)
    .is_some_and(|m| m.start() == 0 && m.end() == text.len())
}

/// Normalizes an item code into the code alphabet: upper-case alphanumerics.
pub fn normalize_code(code: &str) -> String {
  code
    .chars()
    .filter(|c| c.is_alphanumeric())
    .flat_map(char::to_uppercase)
    .collect()
}

/// Extracts the first viscosity grade, e.g. `"10w-40"` gives `10W40`.
pub fn extract_viscosity(text: &str) -> Option<String> {
  VISCOSITY_RE.captures(text).map(|cap| viscosity(&cap))
}

/// Every viscosity grade mentioned in the text.
pub fn extract_viscosities(text: &str) -> BTreeSet<String> {
  VISCOSITY_RE.captures_iter(text).map(|cap| viscosity(&cap)).collect()
}

fn viscosity(cap: &Captures<'_>) -> String {
  format!("{}W{}", &cap[1], &cap[2])
}

/// Extracts the first volume in liters, e.g. `"4,5 L"` gives `4.5L`.
pub fn extract_volume(text: &str) -> Option<String> {
  VOLUME_RE.captures(text).map(|cap| volume(&cap))
}

/// Every volume mentioned in the text.
pub fn extract_volumes(text: &str) -> BTreeSet<String> {
  VOLUME_RE.captures_iter(text).map(|cap| volume(&cap)).collect()
}

fn volume(cap: &Captures<'_>) -> String {
  format!("{}L", cap[1].replace(',', "."))
}

/// Extracts the first API or ACEA performance grade.
pub fn extract_grade(text: &str) -> Option<String> {
  GRADE_RE.captures(text).map(|cap| grade(&cap))
}

/// Every API or ACEA performance grade mentioned in the text.
pub fn extract_grades(text: &str) -> BTreeSet<String> {
  GRADE_RE.captures_iter(text).map(|cap| grade(&cap)).collect()
}

fn grade(cap: &Captures<'_>) -> String {
  format!("{} {}", cap[1].to_uppercase(), cap[2].to_uppercase())
}

fn first_in_vocabulary(text: &str, vocabulary: &[String]) -> Option<String> {
  let lower = text.to_lowercase();
  vocabulary
    .iter()
    .find(|word| !word.is_empty() && lower.contains(word.as_str()))
    .cloned()
}

/// Runs every extractor against text, using the vocabularies it was built with.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
  brands: Vec<String>,
  applications: Vec<String>,
}

impl FeatureExtractor {
  pub fn new(vocabulary: &Vocabulary) -> Self {
    let vocabulary = vocabulary.normalized();
    Self {
      brands: vocabulary.brands,
      applications: vocabulary.applications,
    }
  }

  /// The first known brand contained in the text.
  pub fn extract_brand(&self, text: &str) -> Option<String> {
    first_in_vocabulary(text, &self.brands)
  }

  /// The first known application term contained in the text.
  pub fn extract_application(&self, text: &str) -> Option<String> {
    first_in_vocabulary(text, &self.applications)
  }

  /// Extracts all features from free text.
  pub fn extract(&self, text: &str) -> Features {
    Features {
      codes: extract_codes(text),
      viscosity: extract_viscosity(text),
      volume: extract_volume(text),
      grade: extract_grade(text),
      brand: self.extract_brand(text),
      application: self.extract_application(text),
    }
  }

  /// Extracts the features of a product.
  ///
  /// The normalized item code is always one of the product's codes, and a
  /// non-empty `brand` field takes precedence over a brand found in text.
  pub fn product_features(&self, product: &Product) -> Features {
    let mut features = self.extract(&product.searchable_text());

    let item_code = normalize_code(&product.item_code);
    if item_code.len() >= MIN_CODE_LEN {
      features.codes.insert(item_code);
    }

    let brand = product.brand().trim();
    if !brand.is_empty() {
      features.brand = Some(brand.to_lowercase());
    }

    features
  }
}

impl Default for FeatureExtractor {
  fn default() -> Self {
    Self::new(&Vocabulary::default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn test_extract_codes_patterns() {
    assert_eq!(extract_codes("filter ABC12345"), set(&["ABC12345"]));
    assert_eq!(extract_codes("ref 1234567"), set(&["1234567"]));
    assert_eq!(extract_codes("part xy1234 and 123a45"), set(&["123A45", "XY1234"]));
  }

  #[test]
  fn test_extract_codes_drops_oem_marker() {
    assert_eq!(extract_codes("OEM 7700500168"), set(&["7700500168"]));
    assert_eq!(extract_codes("oem:ab12345"), set(&["AB12345"]));
  }

  #[test]
  fn test_extract_codes_skips_words_and_grades() {
    assert!(extract_codes("Castrol Quartz engine oil").is_empty());
    assert!(extract_codes("10W40 208L drum").is_empty());
  }

  #[test]
  fn test_extract_codes_joins_hyphenated() {
    assert_eq!(extract_codes("pads BP-1001"), set(&["BP1001"]));
  }

  #[test]
  fn test_viscosity() {
    assert_eq!(extract_viscosity("Helix 5w30 1L"), Some("5W30".into()));
    assert_eq!(extract_viscosity("SAE 10W-40"), Some("10W40".into()));
    assert_eq!(extract_viscosity("15 W 40"), Some("15W40".into()));
    assert_eq!(extract_viscosity("gear oil"), None);
  }

  #[test]
  fn test_volume() {
    assert_eq!(extract_volume("Quartz 5L"), Some("5L".into()));
    assert_eq!(extract_volume("bidon 4,5 l"), Some("4.5L".into()));
    assert_eq!(extract_volume("2 litres"), Some("2L".into()));
    assert_eq!(extract_volume("5W30"), None);
  }

  #[test]
  fn test_every_mention() {
    let text = "Rimula R4 10W-40 / 15W40, 1L or 5 L, API CI-4 ACEA E7";
    assert_eq!(extract_viscosities(text), set(&["10W40", "15W40"]));
    assert_eq!(extract_volumes(text), set(&["1L", "5L"]));
    assert_eq!(extract_grades(text), set(&["ACEA E7", "API CI-4"]));
    assert!(extract_viscosities("gear oil").is_empty());
  }

  #[test]
  fn test_grade() {
    assert_eq!(extract_grade("meets API SN"), Some("API SN".into()));
    assert_eq!(extract_grade("ACEA C3 approved"), Some("ACEA C3".into()));
    assert_eq!(extract_grade("api ck-4"), Some("API CK-4".into()));
    assert_eq!(extract_grade("rapid"), None);
  }

  #[test]
  fn test_brand_and_application() {
    let extractor = FeatureExtractor::default();
    assert_eq!(extractor.extract_brand("SHELL Helix"), Some("shell".into()));
    assert_eq!(extractor.extract_application("Diesel engine oil"), Some("engine".into()));
    assert_eq!(extractor.extract_brand("no brand here"), None);
  }

  #[test]
  fn test_vocabulary_case_is_ignored() {
    let vocabulary = Vocabulary {
      brands: vec!["Valvoline".into()],
      ..Vocabulary::default()
    };
    let extractor = FeatureExtractor::new(&vocabulary);
    assert_eq!(extractor.extract_brand("VALVOLINE MaxLife"), Some("valvoline".into()));
  }

  #[test]
  fn test_product_features() {
    let extractor = FeatureExtractor::default();
    let product = Product::new("1", "Helix HX7 5W40 4L", "550-046", "10.00")
      .with_brand("Shell")
      .with_description("Engine oil, API SN");
    let features = extractor.product_features(&product);
    assert!(features.codes.contains("550046"));
    assert_eq!(features.viscosity.as_deref(), Some("5W40"));
    assert_eq!(features.volume.as_deref(), Some("4L"));
    assert_eq!(features.grade.as_deref(), Some("API SN"));
    assert_eq!(features.brand.as_deref(), Some("shell"));
    assert_eq!(features.application.as_deref(), Some("engine"));
  }
}
