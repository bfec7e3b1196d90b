//!
//! filehost storage module
//! ------------------------
//! This module defines the storage seam behind the HTTP API. Uploaded files are
//! opaque byte blobs addressed by a generated stored name of the form
//! `<unix_millis>-<token><ext>`. Files are immutable once written: the only
//! mutations are create and delete.
//!
//! Key responsibilities:
//! - The `FileStore` trait (store/delete/list/fetch) that request handling talks to.
//! - A directory-backed implementation (`LocalDirStore`) used by the server.
//! - An in-memory implementation (`MemoryStore`) for embedding and tests.
//! - Stored-name generation and validation (`paths`).

use std::io;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

pub mod paths;
mod local;
mod memory;

pub use local::LocalDirStore;
pub use memory::MemoryStore;
pub use paths::{extension_of, generate_stored_name, validate_stored_name, MAX_NAME_ATTEMPTS};

/// Failures surfaced by a `FileStore` backing.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The name does not resolve to a stored file (includes names that could never be valid).
    #[error("file not found: {0}")]
    NotFound(String),
    /// Every generated name collided with an existing file.
    #[error("could not allocate a unique stored name after {0} attempts")]
    NameExhausted(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A file accepted by `FileStore::store`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Generated name; unique within the store at creation time.
    pub stored_name: String,
    /// Client-supplied name, informational only.
    pub original_name: String,
}

/// An open file ready to be streamed to a client.
pub struct FileContent {
    pub stored_name: String,
    pub size: u64,
    /// MIME type inferred from the stored name's extension.
    pub content_type: String,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl std::fmt::Debug for FileContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileContent")
            .field("stored_name", &self.stored_name)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Storage backing for uploaded files.
///
/// Implementations perform no authorization; the admin gate is enforced by the
/// caller. Each method maps to a single backing operation and there are no
/// cross-call transactions (a delete racing a fetch may yield `NotFound`).
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Drain `reader` into a freshly generated name derived from `original_name`.
    /// A read error aborts the store and leaves nothing behind.
    async fn store(&self, original_name: &str, reader: &mut (dyn AsyncRead + Send + Unpin)) -> StoreResult<StoredFile>;

    /// Remove a stored file. `NotFound` if it does not exist.
    async fn delete(&self, stored_name: &str) -> StoreResult<()>;

    /// Stored names of all fetchable files, sorted ascending.
    async fn list(&self) -> StoreResult<Vec<String>>;

    /// Open a stored file for streaming. `NotFound` if it does not exist.
    async fn fetch(&self, stored_name: &str) -> StoreResult<FileContent>;
}

/// Content type for a stored name, `application/octet-stream` when unknown.
pub fn content_type_for(stored_name: &str) -> String {
    mime_guess::from_path(stored_name).first_or_octet_stream().essence_str().to_string()
}
