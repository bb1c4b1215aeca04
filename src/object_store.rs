//! Object storage subsystem
//!
//! - `object_store_trait`: the ObjectStore trait
//! - `types`: logical folders and object references
//! - `file_store`: directory-tree implementation

pub mod file_store;
pub mod object_store_trait;
pub mod types;

pub use file_store::FileObjectStore;
pub use object_store_trait::ObjectStore;
pub use types::{Folder, ObjectRef};
