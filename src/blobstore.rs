//! The minimal capability the facade requires from a blob backend
//! (distilled spec §4.5, SPEC_FULL.md §4.5). Stands in for the real
//! S3-like object store, which is out of scope.

use anyhow::Error;

/// Storage keys are normalized paths (distilled spec §6 "Path conventions
/// on the wire"): forward-slash, no leading slash, lowercase datasite
/// identity as the first segment.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, Error>;

    /// Lists every key whose normalized form starts with `prefix` (segment
    /// boundary, not a raw string prefix).
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, Error>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, Error>;

    async fn put(&self, key: &str, contents: Vec<u8>) -> Result<(), Error>;

    async fn delete(&self, key: &str) -> Result<(), Error>;
}

/// An in-memory [`BlobStore`] used by tests and the demo binary; not
/// intended for production (no durability, no concurrency control beyond
/// the mutex).
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: tokio::sync::Mutex<std::collections::BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, Error> {
        Ok(self.objects.lock().await.contains_key(key))
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, Error> {
        let boundary = format!("{prefix}/");
        Ok(self
            .objects
            .lock()
            .await
            .keys()
            .filter(|key| key.as_str() == prefix || key.starts_with(&boundary))
            .cloned()
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, Error> {
        self.objects
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such object: {key}"))
    }

    async fn put(&self, key: &str, contents: Vec<u8>) -> Result<(), Error> {
        self.objects.lock().await.insert(key.to_string(), contents);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.objects.lock().await.remove(key);
        Ok(())
    }
}
