use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::response::ApiError;
use crate::api::scope::Scope;
use crate::storage::models::ScopeFilter;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// Path lookup response for trusted callers: the blob-store key and filename,
/// never bytes or other metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilePathResponse {
    pub path: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Worker-trust lookup: the caller knows its tenant but not the project.
pub async fn get_worker_file_path(
    State(state): State<Arc<AppState>>,
    scope: Scope,
    Path(id): Path<String>,
) -> Result<Json<FilePathResponse>, ApiError> {
    file_path(&state, &id, ScopeFilter::ByTenant(&scope.tenant_id))
}

/// Full internal trust: no scoping at all. Bypasses isolation, so the route
/// must never be exposed beyond internal collaborators.
pub async fn get_internal_file_path(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FilePathResponse>, ApiError> {
    file_path(&state, &id, ScopeFilter::Unscoped)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn file_path(
    state: &AppState,
    id: &str,
    scope: ScopeFilter,
) -> Result<Json<FilePathResponse>, ApiError> {
    if id.is_empty() {
        return Err(ApiError::bad_request("id is required"));
    }

    let record = state
        .db
        .get_file(id, scope)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    Ok(Json(FilePathResponse {
        path: record.object_store_path,
        filename: record.filename,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::files::{create_file_from_object_path, CreateFileFromObjectPathRequest};
    use crate::api::response::AppJson;
    use crate::testutil::test_state;

    #[tokio::test]
    async fn test_worker_and_internal_path_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (_, Json(created)) = create_file_from_object_path(
            State(Arc::clone(&state)),
            Scope::default(),
            AppJson(CreateFileFromObjectPathRequest {
                object_path: "training/batch-1.jsonl".to_string(),
                purpose: "fine-tune".to_string(),
            }),
        )
        .await
        .unwrap();

        // Worker lookup sees the record through its tenant.
        let Json(resp) = get_worker_file_path(
            State(Arc::clone(&state)),
            Scope::default(),
            Path(created.id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(resp.path, "training/batch-1.jsonl");
        assert_eq!(resp.filename, "batch-1.jsonl");

        // A worker from another tenant does not.
        let other_tenant = Scope {
            tenant_id: "other-tenant".to_string(),
            ..Scope::default()
        };
        let err = get_worker_file_path(
            State(Arc::clone(&state)),
            other_tenant,
            Path(created.id.clone()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        // The unscoped internal lookup always sees it.
        let Json(resp) = get_internal_file_path(State(state), Path(created.id))
            .await
            .unwrap();
        assert_eq!(resp.path, "training/batch-1.jsonl");
    }
}
