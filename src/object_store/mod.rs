mod local;
mod noop;

pub use local::LocalStore;
pub use noop::NoopStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Abstraction over the blob-storage backend.
///
/// The store only ever sees opaque bytes under a generated key; any upload
/// error aborts the request before metadata is persisted.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError>;
}

/// Resolve the blob-store key for a file id under the configured prefix.
///
/// Pure and total. File ids are generator-controlled, so the join cannot
/// produce traversal sequences.
pub fn object_path(prefix: &str, file_id: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return file_id.to_string();
    }
    format!("{prefix}/{file_id}")
}
