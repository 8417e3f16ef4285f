//! Project persistence.
//!
//! The editor never calls storage itself; it only emits debounced
//! [`DocumentChange`]s. Hosts fold those into a [`ProjectRecord`] and hand
//! it to a [`Storage`] backend.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutosaveBridge, DEFAULT_AUTOSAVE_DELAY_MS, DocumentChange};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Project not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A persisted project: the scene snapshot plus its workspace size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    /// Scene snapshot JSON.
    pub json: String,
    pub width: f64,
    pub height: f64,
}

impl ProjectRecord {
    /// Create a record from a document change.
    pub fn new(id: impl Into<String>, name: impl Into<String>, change: DocumentChange) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            json: change.json,
            width: change.width,
            height: change.height,
        }
    }

    /// Fold a newer document change into the record.
    pub fn apply_change(&mut self, change: DocumentChange) {
        self.json = change.json;
        self.width = change.width;
        self.height = change.height;
    }

    /// The `{json, width, height}` triple an editor is opened with.
    pub fn to_change(&self) -> DocumentChange {
        DocumentChange {
            json: self.json.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Trait for project storage backends.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a project under its own id.
    fn save(&self, project: &ProjectRecord) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a project.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ProjectRecord>>;

    /// Delete a project.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all project IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a project exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for project storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save a project under its own id.
    fn save(&self, project: &ProjectRecord) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a project.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ProjectRecord>>;

    /// Delete a project.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all project IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a project exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    // Simple blocking executor for tests
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tracks_changes() {
        let change = DocumentChange {
            json: "{\"objects\":[]}".to_string(),
            width: 1200.0,
            height: 1200.0,
        };
        let mut record = ProjectRecord::new("p1", "Poster", change.clone());
        assert_eq!(record.to_change(), change);

        record.apply_change(DocumentChange {
            json: "{}".to_string(),
            width: 800.0,
            height: 600.0,
        });
        assert_eq!(record.width, 800.0);
        assert_eq!(record.json, "{}");
        assert_eq!(record.name, "Poster");
    }
}
