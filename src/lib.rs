//! file-depot - A metadata/content-split file store
//!
//! File bytes go to a blob-storage backend under a generated key; structured
//! metadata (scope, purpose, size, name, storage path) lives in a redb table,
//! retrievable by identifier or by cursor-paginated listing. This crate
//! provides:
//! - Prefixed, globally unique file identifiers
//! - Tenant/organization/project scoping on every lookup
//! - Stable newest-first ordering from an internal insertion sequence
//! - A REST API mirroring the OpenAI files wire shape

pub mod api;
pub mod config;
pub mod fileid;
pub mod object_store;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub object_store: Arc<dyn object_store::ObjectStore>,
}
