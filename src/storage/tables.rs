use redb::TableDefinition;

/// File records: file_id -> FileRecord (msgpack)
pub const FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("files");

/// Project ordering index: (project_id, internal_id) -> file_id.
/// Tuple keys sort component-wise, so a range scan over a single project
/// yields that project's records in insertion order.
pub const PROJECT_FILES: TableDefinition<(&str, u64), &str> =
    TableDefinition::new("project_files");

/// Sequence counters: name -> last assigned value
pub const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Counter that backs FileRecord.internal_id.
pub const FILE_SEQUENCE: &str = "file_internal_id";
