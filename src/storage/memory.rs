use std::collections::BTreeMap;
use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use super::paths::{generate_stored_name, MAX_NAME_ATTEMPTS};
use super::{content_type_for, FileContent, FileStore, StoreError, StoreResult, StoredFile};

/// In-process file store. Contents live only as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.files.read().len() }

    pub fn is_empty(&self) -> bool { self.files.read().is_empty() }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn store(&self, original_name: &str, reader: &mut (dyn AsyncRead + Send + Unpin)) -> StoreResult<StoredFile> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        let bytes = Bytes::from(buf);
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = generate_stored_name(original_name, Utc::now().timestamp_millis())
                .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?;
            let mut map = self.files.write();
            if map.contains_key(&name) {
                continue;
            }
            debug!(target: "filehost::store", "memory store {} ({} bytes)", name, bytes.len());
            map.insert(name.clone(), bytes);
            return Ok(StoredFile { stored_name: name, original_name: original_name.to_string() });
        }
        Err(StoreError::NameExhausted(MAX_NAME_ATTEMPTS))
    }

    async fn delete(&self, stored_name: &str) -> StoreResult<()> {
        match self.files.write().remove(stored_name) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(stored_name.to_string())),
        }
    }

    async fn list(&self) -> StoreResult<Vec<String>> {
        Ok(self.files.read().keys().cloned().collect())
    }

    async fn fetch(&self, stored_name: &str) -> StoreResult<FileContent> {
        let bytes = self
            .files
            .read()
            .get(stored_name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(stored_name.to_string()))?;
        Ok(FileContent {
            stored_name: stored_name.to_string(),
            size: bytes.len() as u64,
            content_type: content_type_for(stored_name),
            reader: Box::new(Cursor::new(bytes)),
        })
    }
}
