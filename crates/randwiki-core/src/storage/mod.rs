//! Storage layer
//!
//! Device-local key/value storage for the anonymous mode.
//!
//! ## Layout
//!
//! One JSON file per key under `<data_dir>/local_storage/`, each holding a
//! serialized array. Writes are atomic (temp file, then rename), and every
//! value is checked against a byte quota before it is written.

pub mod error;
pub mod local;

pub use error::{StorageError, StorageResult};
pub use local::LocalStorage;
