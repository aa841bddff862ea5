//! Core primitives for the livepen playground: reactive stores and
//! URL-fragment persistence.

pub mod fragment;
pub mod session;
pub mod storage;
pub mod store;

pub use fragment::{Fragment, FragmentField, RawFragment, FIELD_DELIMITER, SEGMENT_SEPARATOR};
pub use session::{PlaygroundSession, CSS_FIELD, JS_FIELD};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};
pub use store::{Store, Subscription};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
