//! `s3://` URL splitting.

use url::Url;

use crate::StoreError;

/// A parsed `s3://bucket/key` locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

impl S3Location {
    /// Split an `s3://` URL into bucket and key. A query string, when
    /// present, stays attached to the key (presigned-style locators).
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let url = Url::parse(raw)
            .map_err(|e| StoreError::Locator(format!("{raw}: {e}")))?;
        if url.scheme() != "s3" {
            return Err(StoreError::Locator(format!(
                "expected s3:// scheme, got {}",
                url.scheme()
            )));
        }
        let bucket = url.host_str().unwrap_or_default().to_string();
        let mut key = url.path().trim_start_matches('/').to_string();
        if let Some(q) = url.query() {
            key.push('?');
            key.push_str(q);
        }
        Ok(Self { bucket, key })
    }
}
