use std::ops::Bound;

use chrono::Utc;
use redb::{ReadOnlyTable, ReadableTable};

use super::db::{Database, DatabaseError};
use super::models::{FileRecord, FileSpec, ListOrder, ScopeFilter};
use super::tables::*;

impl Database {
    // ========================================================================
    // File record operations
    // ========================================================================

    /// Create a file record, assigning its internal sequence number and
    /// creation timestamp. Fails with `DuplicateFileId` if the file id is
    /// already taken; the existing record is never overwritten.
    pub fn create_file(&self, spec: FileSpec) -> Result<FileRecord, DatabaseError> {
        debug_assert!(!spec.file_id.is_empty(), "file id must not be empty");
        debug_assert!(!spec.project_id.is_empty(), "project id must not be empty");

        let write_txn = self.begin_write()?;
        let record = {
            let mut files = write_txn.open_table(FILES)?;
            if files.get(spec.file_id.as_str())?.is_some() {
                return Err(DatabaseError::DuplicateFileId(spec.file_id));
            }

            // The sequence allocation and both inserts commit atomically, so
            // internal_id ordering always matches insertion order.
            let mut counters = write_txn.open_table(COUNTERS)?;
            let next = counters
                .get(FILE_SEQUENCE)?
                .map(|v| v.value())
                .unwrap_or(0)
                + 1;
            counters.insert(FILE_SEQUENCE, next)?;

            let record = FileRecord {
                internal_id: next,
                file_id: spec.file_id,
                tenant_id: spec.tenant_id,
                organization_id: spec.organization_id,
                project_id: spec.project_id,
                filename: spec.filename,
                purpose: spec.purpose,
                bytes: spec.bytes,
                object_store_path: spec.object_store_path,
                created_at: Utc::now(),
            };

            let data = rmp_serde::to_vec_named(&record)?;
            files.insert(record.file_id.as_str(), data.as_slice())?;

            let mut index = write_txn.open_table(PROJECT_FILES)?;
            index.insert(
                (record.project_id.as_str(), record.internal_id),
                record.file_id.as_str(),
            )?;

            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// Get a file by its public id, filtered by the caller's scope.
    ///
    /// A record that exists but is outside the scope reads as absent, the
    /// same as a record that was never created.
    pub fn get_file(
        &self,
        file_id: &str,
        scope: ScopeFilter,
    ) -> Result<Option<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let files = read_txn.open_table(FILES)?;

        match files.get(file_id)? {
            Some(data) => {
                let record: FileRecord = rmp_serde::from_slice(data.value())?;
                Ok(scope.matches(&record).then_some(record))
            }
            None => Ok(None),
        }
    }

    /// List a project's files, newest first, optionally filtered by purpose.
    ///
    /// Fully materializes the result; acceptable only because per-project
    /// file counts are expected to stay bounded. Large projects should use
    /// `list_files_by_project_paginated`.
    pub fn list_files_by_project(
        &self,
        project_id: &str,
        purpose: Option<&str>,
    ) -> Result<Vec<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(PROJECT_FILES)?;
        let files = read_txn.open_table(FILES)?;

        let mut records = Vec::new();
        for entry in index
            .range((project_id, 0u64)..=(project_id, u64::MAX))?
            .rev()
        {
            let (_, file_id) = entry?;
            if let Some(record) = load_visible(&files, file_id.value(), purpose)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Cursor-paginated listing over a project's files.
    ///
    /// `after` is the internal_id boundary; `0` means no boundary. Ascending
    /// pages cover `internal_id > after`, descending pages
    /// `internal_id < after`. Fetches one row past `limit` to derive
    /// `has_more` without a separate count query.
    pub fn list_files_by_project_paginated(
        &self,
        project_id: &str,
        purpose: Option<&str>,
        after: u64,
        limit: usize,
        order: ListOrder,
    ) -> Result<(Vec<FileRecord>, bool), DatabaseError> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(PROJECT_FILES)?;
        let files = read_txn.open_table(FILES)?;

        let bounds = match (order, after) {
            (_, 0) => (
                Bound::Included((project_id, 0u64)),
                Bound::Included((project_id, u64::MAX)),
            ),
            (ListOrder::Asc, after) => (
                Bound::Excluded((project_id, after)),
                Bound::Included((project_id, u64::MAX)),
            ),
            (ListOrder::Desc, after) => (
                Bound::Included((project_id, 0u64)),
                Bound::Excluded((project_id, after)),
            ),
        };
        let range = index.range(bounds)?;

        let mut records = Vec::with_capacity(limit + 1);
        match order {
            ListOrder::Asc => {
                for entry in range {
                    let (_, file_id) = entry?;
                    if let Some(record) = load_visible(&files, file_id.value(), purpose)? {
                        records.push(record);
                        if records.len() > limit {
                            break;
                        }
                    }
                }
            }
            ListOrder::Desc => {
                for entry in range.rev() {
                    let (_, file_id) = entry?;
                    if let Some(record) = load_visible(&files, file_id.value(), purpose)? {
                        records.push(record);
                        if records.len() > limit {
                            break;
                        }
                    }
                }
            }
        }

        let has_more = records.len() > limit;
        if has_more {
            records.truncate(limit);
        }
        Ok((records, has_more))
    }

    /// Count a project's files. Independent of pagination.
    pub fn count_files_by_project(&self, project_id: &str) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(PROJECT_FILES)?;

        let mut count = 0;
        for entry in index.range((project_id, 0u64)..=(project_id, u64::MAX))? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Hard-delete a file by its public id, scoped to a project.
    ///
    /// Returns `false` when no record matched, which callers must report as
    /// not-found rather than a silent no-op. Deletion is permanent; the file
    /// id is never reused.
    pub fn delete_file(&self, file_id: &str, project_id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let deleted = {
            let mut files = write_txn.open_table(FILES)?;

            let matched: Option<u64> = match files.get(file_id)? {
                Some(data) => {
                    let record: FileRecord = rmp_serde::from_slice(data.value())?;
                    (record.project_id == project_id).then_some(record.internal_id)
                }
                None => None,
            };

            match matched {
                Some(internal_id) => {
                    files.remove(file_id)?;
                    let mut index = write_txn.open_table(PROJECT_FILES)?;
                    index.remove((project_id, internal_id))?;
                    true
                }
                None => false,
            }
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}

/// Decode a record from the files table, dropping it when the purpose filter
/// does not match. Index entries without a backing record are skipped.
fn load_visible(
    files: &ReadOnlyTable<&'static str, &'static [u8]>,
    file_id: &str,
    purpose: Option<&str>,
) -> Result<Option<FileRecord>, DatabaseError> {
    let Some(data) = files.get(file_id)? else {
        return Ok(None);
    };
    let record: FileRecord = rmp_serde::from_slice(data.value())?;
    if purpose.is_some_and(|p| record.purpose != p) {
        return Ok(None);
    }
    Ok(Some(record))
}
