//! In-memory [`ObjectStore`] for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{normalize_key, ObjectStore, StoreError};

/// A `BTreeMap`-backed store. Keys are normalized on every operation so its
/// behavior matches [`crate::S3Store`] with respect to slash handling.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object (test setup).
    pub fn insert(&self, key: &str, body: impl Into<Bytes>) {
        self.objects
            .lock()
            .unwrap()
            .insert(normalize_key(key), body.into());
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn fetch(&self, key: &str) -> Result<Bytes, StoreError> {
        let key = normalize_key(key);
        self.objects
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound(key))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let prefix = normalize_key(prefix);
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(&normalize_key(key));
        }
        Ok(())
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<(), StoreError> {
        let src = normalize_key(src);
        let dst = normalize_key(dst);
        let mut objects = self.objects.lock().unwrap();
        let body = objects
            .get(&src)
            .cloned()
            .ok_or(StoreError::NotFound(src))?;
        objects.insert(dst, body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_returns_seeded_bytes() {
        let store = MemoryStore::new();
        store.insert("exports/feed.csv", &b"a|b|c"[..]);

        let body = store.fetch("/exports/feed.csv").await.unwrap();
        assert_eq!(&body[..], b"a|b|c");
    }

    #[tokio::test]
    async fn fetch_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.fetch("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(k) if k == "nope"));
    }

    #[tokio::test]
    async fn fetch_opt_swallows_missing_objects() {
        let store = MemoryStore::new();
        assert!(store.fetch_opt("gone").await.is_none());

        store.insert("here", &b"x"[..]);
        assert!(store.fetch_opt("here").await.is_some());
    }

    #[tokio::test]
    async fn list_filters_by_prefix() {
        let store = MemoryStore::new();
        store.insert("exports/a.csv", &b""[..]);
        store.insert("exports/b.csv", &b""[..]);
        store.insert("archive/c.csv", &b""[..]);

        let keys = store.list("exports/").await.unwrap();
        assert_eq!(keys, vec!["exports/a.csv", "exports/b.csv"]);
    }

    #[tokio::test]
    async fn rename_moves_the_object() {
        let store = MemoryStore::new();
        store.insert("old/feed.csv", &b"data"[..]);

        store.rename("old/feed.csv", "new/feed.csv").await.unwrap();

        assert!(store.fetch("old/feed.csv").await.is_err());
        assert_eq!(&store.fetch("new/feed.csv").await.unwrap()[..], b"data");
    }

    #[tokio::test]
    async fn download_to_writes_the_file() {
        let store = MemoryStore::new();
        store.insert("exports/feed.csv", &b"1|2|3"[..]);

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("feed.csv");
        store.download_to("exports/feed.csv", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"1|2|3");
    }
}
