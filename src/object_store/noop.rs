use async_trait::async_trait;
use bytes::Bytes;

use super::{ObjectStore, ObjectStoreError};

/// Object store that discards uploads, for standalone runs where no blob
/// backend is configured. Metadata still records the resolved path.
pub struct NoopStore;

#[async_trait]
impl ObjectStore for NoopStore {
    async fn upload(&self, key: &str, _data: Bytes) -> Result<(), ObjectStoreError> {
        tracing::debug!(key, "Discarding upload (noop object store)");
        Ok(())
    }
}
