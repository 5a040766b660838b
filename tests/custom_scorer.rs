use partfinder::prelude::*;

fn products() -> Vec<Product> {
  vec![
    Product::new("1", "Hydraulic oil HV46 20L", "HV4620", "95.00").with_category("Hydraulic"),
    Product::new("2", "Hydraulic oil HV46 5L", "HV4605", "28.00").with_category("Hydraulic"),
    Product::new("3", "Grease EP2 400g", "EP2400", "6.50").with_category("Grease"),
  ]
}

/// Scores cheaper products higher, ignoring the query text.
struct PriceScorer {
  max_price: f64,
}

impl PriceScorer {
  fn new(max_price: f64) -> Self {
    Self { max_price }
  }
}

impl RelevanceScorer for PriceScorer {
  fn name(&self) -> &str {
    "price"
  }

  fn score(&self, _query: &QueryContext, product: &Product) -> Result<ScoredMatch> {
    let price = product
      .price_value()
      .ok_or_else(|| SearchError::scoring(&product.id, "no price"))?;
    if price > self.max_price {
      return Ok(ScoredMatch::NONE);
    }
    let score = 1.0 - (price / self.max_price) as f32;
    Ok(ScoredMatch::new(score, MatchType::Fuzzy))
  }
}

#[test]
fn test_custom_scorer() {
  let products = products();
  let engine = SearchEngine::builder()
    .scorer(Box::new(PriceScorer::new(60.0)))
    .build();

  let result = engine.search("anything", &products, &SearchFilters::default());

  let ids: Vec<&str> = result.results.iter().map(|r| r.product.id.as_str()).collect();
  // lower price -> higher score; the 95.00 drum is over budget
  assert_eq!(ids, vec!["3", "2"]);
}

/// Fails for one product, like a remote model timing out on a single call.
struct FlakyScorer;

impl RelevanceScorer for FlakyScorer {
  fn score(&self, query: &QueryContext, product: &Product) -> Result<ScoredMatch> {
    if product.id == "2" {
      return Err(SearchError::scoring(&product.id, "model timed out"));
    }
    HeuristicScorer::default().score(query, product)
  }
}

#[test]
fn test_failing_product_does_not_abort_search() {
  let products = products();
  let engine = SearchEngine::builder().scorer(Box::new(FlakyScorer)).build();

  let result = engine.search("hydraulic", &products, &SearchFilters::default());

  let ids: Vec<&str> = result.results.iter().map(|r| r.product.id.as_str()).collect();
  assert_eq!(ids, vec!["1"]);
  assert!(result.suggestions.iter().all(|s| s.product.id != "2"));
}

#[test]
fn test_scorer_receives_analysed_query() {
  struct CodeEcho;

  impl RelevanceScorer for CodeEcho {
    fn score(&self, query: &QueryContext, product: &Product) -> Result<ScoredMatch> {
      let hit = query.features.codes.contains(&product.item_code);
      Ok(if hit {
        ScoredMatch::new(1.0, MatchType::OemExact)
      } else {
        ScoredMatch::NONE
      })
    }
  }

  let products = products();
  let engine = SearchEngine::builder().scorer(Box::new(CodeEcho)).build();
  let result = engine.search("oem ep2400", &products, &SearchFilters::default());

  assert_eq!(result.results.len(), 1);
  assert_eq!(result.results[0].product.id, "3");
}
