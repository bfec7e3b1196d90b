use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::paths::{generate_stored_name, validate_stored_name, MAX_NAME_ATTEMPTS};
use super::{content_type_for, FileContent, FileStore, StoreError, StoreResult, StoredFile};

/// Directory-backed file store: one flat directory, one file per upload.
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    /// Open a store rooted at `root`, creating the directory if it does not exist.
    pub fn new<P: AsRef<Path>>(root: P) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root_path(&self) -> &Path { &self.root }

    /// Resolve a client-supplied name to a path inside the root, or `NotFound`.
    fn resolve(&self, stored_name: &str) -> StoreResult<PathBuf> {
        if let Err(e) = validate_stored_name(stored_name) {
            debug!(target: "filehost::store", "rejecting name {:?}: {}", stored_name, e);
            return Err(StoreError::NotFound(stored_name.to_string()));
        }
        Ok(self.root.join(stored_name))
    }
}

fn not_found_or_io(err: std::io::Error, stored_name: &str) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound(stored_name.to_string())
    } else {
        StoreError::Io(err)
    }
}

#[async_trait]
impl FileStore for LocalDirStore {
    async fn store(&self, original_name: &str, reader: &mut (dyn AsyncRead + Send + Unpin)) -> StoreResult<StoredFile> {
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let name = generate_stored_name(original_name, Utc::now().timestamp_millis())
                .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?;
            let path = self.root.join(&name);
            let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!(target: "filehost::store", attempt, "stored name collision on {}", name);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let written = async {
                let n = tokio::io::copy(&mut *reader, &mut file).await?;
                file.flush().await?;
                Ok::<u64, std::io::Error>(n)
            }
            .await;
            let size = match written {
                Ok(n) => n,
                Err(e) => {
                    // Do not leave a truncated upload behind.
                    drop(file);
                    let _ = fs::remove_file(&path).await;
                    warn!(target: "filehost::store", "upload of {} aborted: {}", name, e);
                    return Err(e.into());
                }
            };
            info!(target: "filehost::store", "stored {} ({} bytes, original={:?})", name, size, original_name);
            return Ok(StoredFile { stored_name: name, original_name: original_name.to_string() });
        }
        Err(StoreError::NameExhausted(MAX_NAME_ATTEMPTS))
    }

    async fn delete(&self, stored_name: &str) -> StoreResult<()> {
        let path = self.resolve(stored_name)?;
        let meta = fs::metadata(&path).await.map_err(|e| not_found_or_io(e, stored_name))?;
        if !meta.is_file() {
            return Err(StoreError::NotFound(stored_name.to_string()));
        }
        fs::remove_file(&path).await.map_err(|e| not_found_or_io(e, stored_name))?;
        info!(target: "filehost::store", "deleted {}", stored_name);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        let mut rd = fs::read_dir(&self.root).await?;
        while let Some(entry) = rd.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else { continue };
            if validate_stored_name(&name).is_err() {
                continue;
            }
            names.push(name);
        }
        names.sort();
        debug!(target: "filehost::store", "listed {} files under {}", names.len(), self.root.display());
        Ok(names)
    }

    async fn fetch(&self, stored_name: &str) -> StoreResult<FileContent> {
        let path = self.resolve(stored_name)?;
        let file = fs::File::open(&path).await.map_err(|e| not_found_or_io(e, stored_name))?;
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(StoreError::NotFound(stored_name.to_string()));
        }
        debug!(target: "filehost::store", "fetch {} ({} bytes)", stored_name, meta.len());
        Ok(FileContent {
            stored_name: stored_name.to_string(),
            size: meta.len(),
            content_type: content_type_for(stored_name),
            reader: Box::new(file),
        })
    }
}
