use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scope applied to a point lookup, selected by caller trust level.
///
/// Project scoping is what the public API uses; tenant scoping is for worker
/// callers that only know the tenant; `Unscoped` bypasses isolation entirely
/// and must stay restricted to internal collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter<'a> {
    ByProject(&'a str),
    ByTenant(&'a str),
    Unscoped,
}

impl ScopeFilter<'_> {
    /// Whether a record is visible under this scope. The file id alone
    /// determines identity; scope only constrains visibility.
    pub fn matches(&self, record: &FileRecord) -> bool {
        match self {
            ScopeFilter::ByProject(project_id) => record.project_id == *project_id,
            ScopeFilter::ByTenant(tenant_id) => record.tenant_id == *tenant_id,
            ScopeFilter::Unscoped => true,
        }
    }
}

/// Pagination direction over the internal_id ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    Asc,
    #[default]
    Desc,
}

/// A file metadata record stored in redb.
///
/// `internal_id` is assigned by the store on creation and is the single
/// source of truth for newest/oldest ordering and pagination cursors. It is
/// never exposed as the public identifier; that is `file_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub internal_id: u64,
    pub file_id: String,

    pub tenant_id: String,
    pub organization_id: String,
    pub project_id: String,

    pub filename: String,
    pub purpose: String,
    pub bytes: i64,

    pub object_store_path: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating a file record. The store assigns
/// `internal_id` and `created_at`.
#[derive(Debug, Clone)]
pub struct FileSpec {
    pub file_id: String,

    pub tenant_id: String,
    pub organization_id: String,
    pub project_id: String,

    pub filename: String,
    pub purpose: String,
    pub bytes: i64,

    pub object_store_path: String,
}
