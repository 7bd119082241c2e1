pub(crate) mod files;
mod internal;

pub use files::{
    create_file, create_file_from_object_path, delete_file, get_file, list_files,
};
pub use internal::{get_internal_file_path, get_worker_file_path, health};
