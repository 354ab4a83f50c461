//! Cross-crate wiring: extraction output feeds the store, store output
//! feeds the row selection, with no glue beyond the public APIs.

use stockline_extract::extract_object_details;
use stockline_feed::read_records;
use stockline_store::{normalize_key, MemoryStore, ObjectStore};

const ENTRY_HTML: &str = r#"<html><body>
  <div id="bucket-value">city-hive-integration</div>
  <div id="region-value" data-region="us-east-1"></div>
  <div id="object-value">
    <span class="path">integration-eng</span>
    <span class="path-sep">/</span>
    <span class="path">inventory_export.csv</span>
  </div>
</body></html>"#;

const FEED: &str = "\
0123456789|Widget|Acme|12oz|9.99|4|a|b|c|d|e
short|row
9876543210|Gadget|Acme|6pk|19.99|2|a|b|c|d|e|f
";

#[tokio::test]
async fn extracted_key_pulls_and_parses_the_feed() {
    let details = extract_object_details(ENTRY_HTML).unwrap();
    assert_eq!(details.bucket, "city-hive-integration");
    assert_eq!(details.object_path, "integration-eng/inventory_export.csv");

    let store = MemoryStore::new();
    store.insert(&details.object_path, FEED.as_bytes().to_vec());

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("inventory_export.csv");

    let key = normalize_key(&details.object_path);
    store.download_to(&key, &out).await.unwrap();

    let records = read_records(std::fs::File::open(&out).unwrap()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].upc, "0123456789");
    assert_eq!(records[0].price, "9.99");
    assert_eq!(records[0].quantity, "4");
    assert_eq!(records[1].upc, "9876543210");
}

#[tokio::test]
async fn soft_read_yields_none_for_missing_feed() {
    let store = MemoryStore::new();
    assert!(store.fetch_opt("integration-eng/gone.csv").await.is_none());
}
