//! Product lookup on an order-entry screen.
//!
//! Run with `RUST_LOG=partfinder=debug` to see the search log.

use partfinder::prelude::*;
use tracing_subscriber::EnvFilter;

const CATALOG: &str = r#"[
  {"id": "1", "name": "Shell Helix HX7 5W30 1L", "itemCode": "550051577", "price": "9.90",
   "brand": "Shell", "category": "Engine Oil", "description": "Semi-synthetic engine oil, API SN"},
  {"id": "2", "name": "Total Quartz 7000 5W30 1L", "itemCode": "213783", "price": "8.50",
   "brand": "Total", "category": "Engine Oil", "description": "Engine oil, API SN"},
  {"id": "3", "name": "Castrol GTX 20W50 4L", "itemCode": "CG2050-4", "price": "25.00",
   "brand": "Castrol", "category": "Engine Oil"},
  {"id": "4", "name": "Mobil ATF 220 1L", "itemCode": "MB142106", "price": "7.00",
   "brand": "Mobil", "category": "Transmission", "description": "Automatic transmission fluid"},
  {"id": "5", "name": "Oil filter", "itemCode": "ABC12345", "price": "6,00",
   "brand": "Bosch", "category": "Filters"},
  {"id": "6", "name": "Brake pads front", "itemCode": "BP-1001", "price": "45.00",
   "category": "Brakes", "description": "Ceramic brake pads"},
  {"id": "7", "name": "Display stand", "itemCode": "PLV0001", "price": "0.00"}
]"#;

fn print_result(result: &SmartSearchResult<'_>) {
  if let Some(message) = &result.no_results_message {
    println!("  {}", message);
  }

  for (i, r) in result.results.iter().enumerate() {
    println!(
      "  {}. {} [{}] (score: {:.2}, {})",
      i + 1,
      r.product.name,
      r.product.item_code,
      r.score,
      r.match_type
    );
  }

  if !result.suggestions.is_empty() {
    println!("  Suggestions:");
    for s in &result.suggestions {
      println!(
        "   - {} (score: {:.2}) {}",
        s.product.name,
        s.score,
        s.reason.as_deref().unwrap_or_default()
      );
    }
  }
}

fn main() -> partfinder::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  println!("=== Order Entry Product Search ===\n");

  let catalog = decode_catalog(CATALOG)?;
  let engine = SearchEngine::builder()
    .config_json(r#"{"confident_threshold": 0.4, "max_suggestions": 3}"#)?
    .build();

  let facets = SearchFilters::facets(&catalog);
  println!("Categories: {}", facets.categories.iter().cloned().collect::<Vec<_>>().join(", "));
  println!("Brands: {}\n", facets.brands.iter().cloned().collect::<Vec<_>>().join(", "));

  let policy = DebouncePolicy::from_config(engine.config());
  let sequencer = SearchSequencer::new();

  let queries = ["Shell Helix", "ABC12345", "5w-30", "helx", "windshield wiper XYZ999", ""];
  for query in queries {
    let intent = engine.recognize_intent(query);
    println!(
      "Query: \"{}\" (intent: {:?}, debounce: {:?})\n",
      query,
      intent.kind,
      policy.delay_for(query)
    );

    let ticket = sequencer.issue();
    let result = engine.search(query, &catalog, &SearchFilters::default());
    match sequencer.accept(ticket, result) {
      Some(result) => print_result(&result),
      None => println!("  (superseded)"),
    }
    println!("---\n");
  }

  println!("Query: \"oil\" in category Engine Oil\n");
  let filters = SearchFilters::new().category("Engine Oil");
  print_result(&engine.search("oil", &catalog, &filters));

  Ok(())
}
