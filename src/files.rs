//! File hosting facade: the admin gate in front of a `FileStore`.
//!
//! Privileged operations (`store`, `delete`) check the gate first and never touch
//! the backing store while it is closed. Public operations (`list`, `fetch`) do not
//! consult the gate.

use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio::io::AsyncRead;

use crate::error::{AppError, AppResult};
use crate::identity::SessionGate;
use crate::storage::{FileContent, FileStore, StoredFile};

/// A file payload received from a client, read as it is stored.
pub struct Upload<'a> {
    pub original_name: String,
    pub reader: Pin<Box<dyn AsyncRead + Send + 'a>>,
}

impl<'a> Upload<'a> {
    pub fn new<R: AsyncRead + Send + 'a>(original_name: impl Into<String>, reader: R) -> Self {
        Self { original_name: original_name.into(), reader: Box::pin(reader) }
    }
}

impl Upload<'static> {
    /// An upload whose content is already in memory.
    pub fn from_bytes(original_name: impl Into<String>, bytes: Bytes) -> Self {
        Self::new(original_name, Cursor::new(bytes))
    }
}

/// One entry of the public listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedFile {
    pub filename: String,
    pub url: String,
}

/// Path under which `fetch` serves a stored file, percent-encoded.
pub fn file_url(stored_name: &str) -> String {
    format!("/files/{}", urlencoding::encode(stored_name))
}

#[derive(Clone)]
pub struct FileHost {
    gate: SessionGate,
    store: Arc<dyn FileStore>,
}

impl FileHost {
    pub fn new(gate: SessionGate, store: Arc<dyn FileStore>) -> Self {
        Self { gate, store }
    }

    pub fn gate(&self) -> &SessionGate { &self.gate }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.gate.is_active() {
            Ok(())
        } else {
            Err(AppError::unauthorized("admin_required", "Admin not logged in"))
        }
    }

    pub async fn store(&self, upload: Option<Upload<'_>>) -> AppResult<StoredFile> {
        self.require_admin()?;
        let Some(mut upload) = upload else {
            return Err(AppError::bad_request("no_file", "No file uploaded"));
        };
        Ok(self.store.store(&upload.original_name, &mut upload.reader).await?)
    }

    pub async fn delete(&self, stored_name: Option<&str>) -> AppResult<()> {
        self.require_admin()?;
        let name = match stored_name {
            Some(n) if !n.is_empty() => n,
            _ => return Err(AppError::bad_request("filename_required", "filename required")),
        };
        Ok(self.store.delete(name).await?)
    }

    pub async fn list(&self) -> AppResult<Vec<ListedFile>> {
        let names = self.store.list().await?;
        Ok(names
            .into_iter()
            .map(|filename| {
                let url = file_url(&filename);
                ListedFile { filename, url }
            })
            .collect())
    }

    pub async fn fetch(&self, stored_name: &str) -> AppResult<FileContent> {
        Ok(self.store.fetch(stored_name).await?)
    }
}
