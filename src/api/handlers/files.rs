use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::api::response::{ApiError, AppJson, AppQuery};
use crate::api::scope::Scope;
use crate::fileid;
use crate::object_store::object_path;
use crate::storage::models::{FileRecord, FileSpec, ListOrder, ScopeFilter};
use crate::AppState;

const PURPOSE_FINE_TUNE: &str = "fine-tune";
const PURPOSE_ASSISTANTS: &str = "assistants";

const OBJECT_FILE: &str = "file";
const OBJECT_LIST: &str = "list";

const DEFAULT_PAGE_LIMIT: u32 = 20;
const MAX_PAGE_LIMIT: u32 = 100;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: String,
    pub bytes: i64,
    pub created_at: i64,
    pub filename: String,
    pub object: String,
    pub purpose: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListFilesResponse {
    pub object: String,
    pub data: Vec<FileResponse>,
    pub has_more: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    pub id: String,
    pub object: String,
    pub deleted: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateFileFromObjectPathRequest {
    #[serde(default)]
    pub object_path: String,
    #[serde(default)]
    pub purpose: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListFilesParams {
    #[serde(default)]
    pub purpose: Option<String>,
    /// When absent (and `after` is absent too), the full listing is returned
    /// unpaginated.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Public file id of the pagination boundary record.
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub order: ListOrder,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_file(
    State(state): State<Arc<AppState>>,
    scope: Scope,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let mut purpose: Option<String> = None;
    let mut filename: Option<String> = None;
    let mut file_data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "purpose" => {
                purpose = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid purpose: {e}")))?,
                );
            }
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                file_data = Some(data);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let purpose = purpose.ok_or_else(|| ApiError::bad_request("purpose is required"))?;
    validate_purpose(&purpose)?;
    let file_data = file_data.ok_or_else(|| ApiError::bad_request("file field is required"))?;
    let filename = filename.unwrap_or_default();

    let record = create_uploaded_file(&state, &scope, &purpose, &filename, file_data).await?;

    tracing::debug!(file_id = %record.file_id, project_id = %scope.project_id, "Created file");
    Ok((StatusCode::CREATED, Json(file_to_response(&record))))
}

pub async fn create_file_from_object_path(
    State(state): State<Arc<AppState>>,
    scope: Scope,
    AppJson(req): AppJson<CreateFileFromObjectPathRequest>,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    if req.purpose.is_empty() {
        return Err(ApiError::bad_request("purpose is required"));
    }
    validate_purpose(&req.purpose)?;
    if req.object_path.is_empty() {
        return Err(ApiError::bad_request("object_path is required"));
    }

    // The bytes already live at the given path; no upload happens and the
    // size is reported as 0 since it is not measured.
    let filename = req
        .object_path
        .rsplit('/')
        .next()
        .unwrap_or(req.object_path.as_str())
        .to_string();

    let mut retried = false;
    let record = loop {
        let file_id = fileid::generate().map_err(|e| ApiError::internal(e.to_string()))?;
        match state.db.create_file(FileSpec {
            file_id,
            tenant_id: scope.tenant_id.clone(),
            organization_id: scope.organization_id.clone(),
            project_id: scope.project_id.clone(),
            filename: filename.clone(),
            purpose: req.purpose.clone(),
            bytes: 0,
            object_store_path: req.object_path.clone(),
        }) {
            Ok(record) => break record,
            Err(e) if e.is_duplicate() && !retried => {
                tracing::warn!("Generated file id collided, retrying with a fresh id");
                retried = true;
            }
            Err(e) if e.is_duplicate() => return Err(ApiError::conflict(e.to_string())),
            Err(e) => return Err(ApiError::internal(e.to_string())),
        }
    };

    tracing::debug!(
        file_id = %record.file_id,
        object_path = %req.object_path,
        "Created file from existing object path"
    );
    Ok((StatusCode::CREATED, Json(file_to_response(&record))))
}

pub async fn get_file(
    State(state): State<Arc<AppState>>,
    scope: Scope,
    Path(id): Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    if id.is_empty() {
        return Err(ApiError::bad_request("id is required"));
    }

    let record = state
        .db
        .get_file(&id, ScopeFilter::ByProject(&scope.project_id))
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    Ok(Json(file_to_response(&record)))
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    scope: Scope,
    Path(id): Path<String>,
) -> Result<Json<DeleteFileResponse>, ApiError> {
    if id.is_empty() {
        return Err(ApiError::bad_request("id is required"));
    }

    let deleted = state
        .db
        .delete_file(&id, &scope.project_id)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !deleted {
        return Err(ApiError::not_found("File not found"));
    }

    // The blob is left behind for out-of-band cleanup; the record is gone.
    tracing::debug!(file_id = %id, project_id = %scope.project_id, "Deleted file");
    Ok(Json(DeleteFileResponse {
        id,
        object: OBJECT_FILE.to_string(),
        deleted: true,
    }))
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    scope: Scope,
    AppQuery(params): AppQuery<ListFilesParams>,
) -> Result<Json<ListFilesResponse>, ApiError> {
    if let Some(ref purpose) = params.purpose {
        validate_purpose(purpose)?;
    }
    let purpose = params.purpose.as_deref();

    let (records, has_more) = if params.limit.is_none() && params.after.is_none() {
        let records = state
            .db
            .list_files_by_project(&scope.project_id, purpose)
            .map_err(|e| ApiError::internal(e.to_string()))?;
        (records, false)
    } else {
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(ApiError::bad_request(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }

        // The public cursor is a file id; resolve it to the internal
        // sequence boundary so sequence numbers never leave the process.
        let after = match params.after.as_deref() {
            Some(after_id) => {
                state
                    .db
                    .get_file(after_id, ScopeFilter::ByProject(&scope.project_id))
                    .map_err(|e| ApiError::internal(e.to_string()))?
                    .ok_or_else(|| {
                        ApiError::bad_request(format!("Invalid after: file {after_id} not found"))
                    })?
                    .internal_id
            }
            None => 0,
        };

        state
            .db
            .list_files_by_project_paginated(
                &scope.project_id,
                purpose,
                after,
                limit as usize,
                params.order,
            )
            .map_err(|e| ApiError::internal(e.to_string()))?
    };

    Ok(Json(ListFilesResponse {
        object: OBJECT_LIST.to_string(),
        data: records.iter().map(file_to_response).collect(),
        has_more,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_purpose(p: &str) -> Result<(), ApiError> {
    match p {
        PURPOSE_FINE_TUNE | PURPOSE_ASSISTANTS => Ok(()),
        _ => Err(ApiError::bad_request(format!(
            "Invalid purpose: must be one of {PURPOSE_FINE_TUNE:?}, {PURPOSE_ASSISTANTS:?}"
        ))),
    }
}

/// Upload bytes under a freshly generated id, then persist the record.
///
/// A duplicate id on create means the generator collided; the whole
/// generate/resolve/upload/create sequence runs once more with a new id (the
/// first blob becomes an orphan, accepted for out-of-band cleanup).
async fn create_uploaded_file(
    state: &AppState,
    scope: &Scope,
    purpose: &str,
    filename: &str,
    data: Bytes,
) -> Result<FileRecord, ApiError> {
    let mut retried = false;
    loop {
        let file_id = fileid::generate().map_err(|e| ApiError::internal(e.to_string()))?;
        let path = object_path(&state.config.storage.path_prefix, &file_id);

        state
            .object_store
            .upload(&path, data.clone())
            .await
            .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?;

        match state.db.create_file(FileSpec {
            file_id,
            tenant_id: scope.tenant_id.clone(),
            organization_id: scope.organization_id.clone(),
            project_id: scope.project_id.clone(),
            filename: filename.to_string(),
            purpose: purpose.to_string(),
            bytes: data.len() as i64,
            object_store_path: path,
        }) {
            Ok(record) => return Ok(record),
            Err(e) if e.is_duplicate() && !retried => {
                tracing::warn!("Generated file id collided, retrying with a fresh id");
                retried = true;
            }
            Err(e) if e.is_duplicate() => return Err(ApiError::conflict(e.to_string())),
            Err(e) => return Err(ApiError::internal(e.to_string())),
        }
    }
}

fn file_to_response(record: &FileRecord) -> FileResponse {
    FileResponse {
        id: record.file_id.clone(),
        bytes: record.bytes,
        created_at: record.created_at.timestamp(),
        filename: record.filename.clone(),
        object: OBJECT_FILE.to_string(),
        purpose: record.purpose.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_state;

    fn object_path_request(path: &str, purpose: &str) -> CreateFileFromObjectPathRequest {
        CreateFileFromObjectPathRequest {
            object_path: path.to_string(),
            purpose: purpose.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_from_object_path() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (status, Json(resp)) = create_file_from_object_path(
            State(Arc::clone(&state)),
            Scope::default(),
            AppJson(object_path_request("dir/report.csv", "fine-tune")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(resp.filename, "report.csv");
        assert_eq!(resp.bytes, 0);
        assert_eq!(resp.object, "file");
        assert_eq!(resp.purpose, "fine-tune");
        assert!(resp.id.starts_with("file-"));

        // No bytes were handed to the blob store.
        let uploads: Vec<_> = std::fs::read_dir(dir.path().join("files"))
            .unwrap()
            .collect();
        assert!(uploads.is_empty());

        // The record stores the caller-supplied path verbatim.
        let record = state
            .db
            .get_file(&resp.id, ScopeFilter::Unscoped)
            .unwrap()
            .unwrap();
        assert_eq!(record.object_store_path, "dir/report.csv");
    }

    #[tokio::test]
    async fn test_create_uploaded_file_stores_blob() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let scope = Scope::default();

        let data = Bytes::from("hello world");
        let record = create_uploaded_file(&state, &scope, "assistants", "notes.txt", data.clone())
            .await
            .unwrap();

        assert_eq!(record.bytes, 11);
        assert_eq!(record.filename, "notes.txt");
        assert_eq!(record.tenant_id, scope.tenant_id);
        assert_eq!(record.project_id, scope.project_id);
        assert_eq!(
            record.object_store_path,
            format!("files/{}", record.file_id)
        );

        // The blob landed at the resolved path.
        let blob = dir.path().join("files").join(&record.object_store_path);
        assert_eq!(std::fs::read(blob).unwrap(), data.to_vec());
    }

    #[tokio::test]
    async fn test_create_from_object_path_invalid_purpose() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let err = create_file_from_object_path(
            State(state),
            Scope::default(),
            AppJson(object_path_request("dir/report.csv", "bogus")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_from_object_path_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let err = create_file_from_object_path(
            State(Arc::clone(&state)),
            Scope::default(),
            AppJson(object_path_request("", "fine-tune")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = create_file_from_object_path(
            State(state),
            Scope::default(),
            AppJson(object_path_request("dir/report.csv", "")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_get_and_delete_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (_, Json(created)) = create_file_from_object_path(
            State(Arc::clone(&state)),
            Scope::default(),
            AppJson(object_path_request("models/weights.bin", "assistants")),
        )
        .await
        .unwrap();

        let Json(fetched) = get_file(
            State(Arc::clone(&state)),
            Scope::default(),
            Path(created.id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.filename, "weights.bin");

        let Json(deleted) = delete_file(
            State(Arc::clone(&state)),
            Scope::default(),
            Path(created.id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(deleted.id, created.id);
        assert_eq!(deleted.object, "file");
        assert!(deleted.deleted);

        // Terminal state: both a re-read and a second delete are NotFound.
        let err = get_file(
            State(Arc::clone(&state)),
            Scope::default(),
            Path(created.id.clone()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = delete_file(State(state), Scope::default(), Path(created.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_file_outside_project_scope() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (_, Json(created)) = create_file_from_object_path(
            State(Arc::clone(&state)),
            Scope::default(),
            AppJson(object_path_request("a/b.txt", "fine-tune")),
        )
        .await
        .unwrap();

        let other_project = Scope {
            project_id: "other-project".to_string(),
            ..Scope::default()
        };
        let err = get_file(State(state), other_project, Path(created.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_files_paginated_wire() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let mut ids = Vec::new();
        for i in 0..5 {
            let (_, Json(resp)) = create_file_from_object_path(
                State(Arc::clone(&state)),
                Scope::default(),
                AppJson(object_path_request(&format!("data/f{i}.jsonl"), "fine-tune")),
            )
            .await
            .unwrap();
            ids.push(resp.id);
        }

        let Json(page) = list_files(
            State(Arc::clone(&state)),
            Scope::default(),
            AppQuery(ListFilesParams {
                limit: Some(3),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(page.object, "list");
        assert!(page.has_more);
        let got: Vec<_> = page.data.iter().map(|f| f.id.clone()).collect();
        assert_eq!(got, vec![ids[4].clone(), ids[3].clone(), ids[2].clone()]);

        // Continue from the last record of the first page.
        let Json(rest) = list_files(
            State(Arc::clone(&state)),
            Scope::default(),
            AppQuery(ListFilesParams {
                limit: Some(3),
                after: Some(ids[2].clone()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert!(!rest.has_more);
        let got: Vec<_> = rest.data.iter().map(|f| f.id.clone()).collect();
        assert_eq!(got, vec![ids[1].clone(), ids[0].clone()]);

        // Unpaginated listing returns everything, newest first.
        let Json(all) = list_files(
            State(state),
            Scope::default(),
            AppQuery(ListFilesParams::default()),
        )
        .await
        .unwrap();
        assert_eq!(all.data.len(), 5);
        assert!(!all.has_more);
        assert_eq!(all.data[0].id, ids[4]);
    }

    #[tokio::test]
    async fn test_file_response_wire_shape() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (_, Json(resp)) = create_file_from_object_path(
            State(state),
            Scope::default(),
            AppJson(object_path_request("dir/report.csv", "fine-tune")),
        )
        .await
        .unwrap();

        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["object"], "file");
        assert_eq!(value["filename"], "report.csv");
        assert_eq!(value["bytes"], 0);
        assert_eq!(value["purpose"], "fine-tune");
        assert!(value["created_at"].is_i64());
        assert!(value["id"].as_str().unwrap().starts_with("file-"));
    }

    #[tokio::test]
    async fn test_list_files_invalid_after() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let err = list_files(
            State(state),
            Scope::default(),
            AppQuery(ListFilesParams {
                after: Some("file-missing".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
