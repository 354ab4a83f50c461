//! Wires the member crates into the end-to-end inventory pull.
//!
//! Collaborators arrive by constructor injection: [`run_with_store`] takes
//! any [`ObjectStore`], which is what the integration tests exploit with an
//! in-memory store.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use stockline_config::StocklineConfig;
use stockline_extract::{extract_object_details, to_raw_url, ObjectDetails};
use stockline_feed::{read_records, InventoryRecord};
use stockline_http::{HttpClient, RequestOpts};
use stockline_store::{normalize_key, ObjectStore, S3Store};

/// Fetch the entry page and pull the storage parameters out of its markup.
pub async fn fetch_entry_details(
    cfg: &StocklineConfig,
    url_override: Option<&str>,
) -> Result<ObjectDetails> {
    let entry_url = url_override.unwrap_or(&cfg.entry_url);
    let raw_url = to_raw_url(entry_url)?;
    tracing::info!(url = %raw_url, "pipeline.fetch_entry");

    let mut client = HttpClient::new(&raw_url)?;
    if let Some(secs) = cfg.http.timeout_secs {
        client = client.with_timeout(Duration::from_secs(secs));
    }
    if let Some(retries) = cfg.http.retries {
        client = client.with_retries(retries);
    }

    let html = client
        .get_text(
            &raw_url,
            RequestOpts {
                allow_absolute: true,
                ..Default::default()
            },
        )
        .await
        .context("fetching entry page")?;

    let details = extract_object_details(&html)?;
    Ok(details)
}

/// Full pipeline against the real store implied by the extracted details.
pub async fn run(
    cfg: &StocklineConfig,
    url_override: Option<&str>,
    out: &Path,
    limit: Option<usize>,
) -> Result<Vec<InventoryRecord>> {
    let details = fetch_entry_details(cfg, url_override).await?;

    let mut store = S3Store::new(&details.bucket, &details.region_code)?;
    if let Some(retries) = cfg.http.retries {
        store = store.with_retries(retries);
    }

    run_with_store(&store, &details.object_path, out, limit).await
}

/// Download the feed object and select the qualifying rows.
pub async fn run_with_store(
    store: &dyn ObjectStore,
    object_path: &str,
    out: &Path,
    limit: Option<usize>,
) -> Result<Vec<InventoryRecord>> {
    let key = normalize_key(object_path);
    store
        .download_to(&key, out)
        .await
        .with_context(|| format!("downloading object {key}"))?;

    let file = std::fs::File::open(out)
        .with_context(|| format!("opening downloaded feed {}", out.display()))?;
    let mut records = read_records(file)?;
    if let Some(n) = limit {
        records.truncate(n);
    }
    Ok(records)
}
