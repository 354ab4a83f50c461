//! Blob-storage capability for the inventory pipeline.
//!
//! [`ObjectStore`] is the seam: the pipeline is handed a store by its
//! constructor and never reaches for a process-wide client. [`s3::S3Store`]
//! is the real implementation (unsigned S3 REST calls — the exercised
//! objects are public); [`memory::MemoryStore`] backs tests.
//!
//! Keys passed to either implementation go through [`normalize_key`] first,
//! so callers can be sloppy about leading/trailing slashes without S3
//! inventing empty-named folders.

pub mod location;
pub mod memory;
pub mod s3;

pub use location::S3Location;
pub use memory::MemoryStore;
pub use s3::S3Store;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http: {0}")]
    Http(#[from] stockline_http::HttpError),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("list response parse failed: {0}")]
    ListParse(String),
    #[error("invalid s3 locator: {0}")]
    Locator(String),
    #[error("invalid copy source: {0}")]
    CopySource(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Capabilities the pipeline needs from a blob store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's bytes by key.
    async fn fetch(&self, key: &str) -> Result<Bytes, StoreError>;

    /// List keys under a prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Delete the given keys.
    async fn delete(&self, keys: &[String]) -> Result<(), StoreError>;

    /// Server-side copy of one key to another.
    async fn copy(&self, src: &str, dst: &str) -> Result<(), StoreError>;

    /// Soft-failure read: a storage error is logged and collapsed to `None`,
    /// never propagated. Callers that must distinguish failures use
    /// [`ObjectStore::fetch`] instead.
    async fn fetch_opt(&self, key: &str) -> Option<Bytes> {
        match self.fetch(key).await {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::info!(key = %key, error = %err, "store.fetch.soft_failure");
                None
            }
        }
    }

    /// Rename = copy + delete of the source.
    async fn rename(&self, src: &str, dst: &str) -> Result<(), StoreError> {
        self.copy(src, dst).await?;
        let doomed = [src.to_string()];
        self.delete(&doomed).await
    }

    /// Fetch an object and write it to the local filesystem.
    async fn download_to(&self, key: &str, dest: &Path) -> Result<(), StoreError> {
        let bytes = self.fetch(key).await?;
        tokio::fs::write(dest, &bytes).await?;
        tracing::info!(key = %key, dest = %dest.display(), len = bytes.len(), "store.download");
        Ok(())
    }
}

/// Clean extraneous slashes from a key or prefix.
///
/// A doubled slash is a folder with an empty name to S3, and leading or
/// trailing slashes turn a relative key absolute in some call sites, so both
/// are stripped. Collapsing is logged because it usually means the key was
/// assembled wrong upstream.
pub fn normalize_key(key: &str) -> String {
    let mut key = key.trim_matches('/').to_string();
    if key.contains("//") {
        tracing::warn!(key = %key, "double slash in storage key, collapsing");
        // Deliberately loops to a fixpoint: a run of any length becomes a
        // single slash, not just pairwise (`a////b` ends up as `a/b`).
        while key.contains("//") {
            key = key.replace("//", "/");
        }
    }
    key
}
