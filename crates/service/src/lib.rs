//! Service layer: the Record Store over submitted map objects.
//! - `store::RecordStore` is the seam the HTTP layer depends on.
//! - `file` persists to a JSON document, `store::memory` keeps state in process.
//! - Validation and entity definitions come from the `models` crate.

pub mod errors;
pub mod ids;
pub mod storage;
pub mod store;
pub mod file;

pub use file::request_store::JsonFileRecordStore;
pub use store::{memory::InMemoryRecordStore, RecordStore};
