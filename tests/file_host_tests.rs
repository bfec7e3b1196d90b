//! End-to-end file hosting flow through the public library API:
//! admin gate + facade + directory-backed store.

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use tempfile::tempdir;
use tokio::io::AsyncReadExt;

use filehost::files::{FileHost, Upload};
use filehost::identity::SessionGate;
use filehost::storage::LocalDirStore;

async fn fetch_bytes(host: &FileHost, name: &str) -> Result<Vec<u8>> {
    let content = host.fetch(name).await?;
    let mut reader = content.reader;
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await?;
    Ok(out)
}

fn upload(bytes: &'static [u8], name: &str) -> Option<Upload<'static>> {
    Some(Upload::from_bytes(name, Bytes::from_static(bytes)))
}

#[tokio::test]
async fn login_store_fetch_delete_list_scenario() -> Result<()> {
    let tmp = tempdir()?;
    let gate = SessionGate::new();
    let host = FileHost::new(gate.clone(), Arc::new(LocalDirStore::new(tmp.path())?));

    gate.login();
    let saved = host.store(upload(b"abc", "a.txt")).await?;
    assert_eq!(saved.original_name, "a.txt");
    assert_eq!(fetch_bytes(&host, &saved.stored_name).await?, b"abc");

    host.delete(Some(saved.stored_name.as_str())).await?;
    let err = host.fetch(&saved.stored_name).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
    assert!(host.list().await?.iter().all(|f| f.filename != saved.stored_name));
    Ok(())
}

#[tokio::test]
async fn gate_closed_from_start_blocks_store() -> Result<()> {
    let tmp = tempdir()?;
    let host = FileHost::new(SessionGate::new(), Arc::new(LocalDirStore::new(tmp.path())?));
    let err = host.store(upload(b"abc", "a.txt")).await.unwrap_err();
    assert_eq!(err.http_status(), 401);
    assert!(host.list().await?.is_empty());
    assert_eq!(std::fs::read_dir(tmp.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn listing_tracks_stores_minus_deletes() -> Result<()> {
    let tmp = tempdir()?;
    let gate = SessionGate::new();
    let host = FileHost::new(gate.clone(), Arc::new(LocalDirStore::new(tmp.path())?));
    gate.login();

    let mut names = Vec::new();
    for name in ["one.png", "two.jpg", "three.txt", "four", "five.pdf", "six.csv"] {
        names.push(host.store(upload(b"payload", name)).await?.stored_name);
    }
    assert!(names[0].ends_with(".png"));
    assert!(!names[3].contains('.'));

    for victim in &names[..2] {
        host.delete(Some(victim.as_str())).await?;
    }
    let listed = host.list().await?;
    assert_eq!(listed.len(), names.len() - 2);
    for entry in &listed {
        assert_eq!(entry.url, format!("/files/{}", entry.filename));
        assert_eq!(fetch_bytes(&host, &entry.filename).await?, b"payload");
    }
    Ok(())
}

#[tokio::test]
async fn files_survive_a_new_host_over_the_same_directory() -> Result<()> {
    let tmp = tempdir()?;
    let gate = SessionGate::new();
    gate.login();
    let first = FileHost::new(gate.clone(), Arc::new(LocalDirStore::new(tmp.path())?));
    let saved = first.store(upload(b"persisted", "keep.txt")).await?;

    // a restarted process starts logged out but still serves existing files
    let second = FileHost::new(SessionGate::new(), Arc::new(LocalDirStore::new(tmp.path())?));
    assert!(!second.gate().is_active());
    assert_eq!(fetch_bytes(&second, &saved.stored_name).await?, b"persisted");
    assert_eq!(second.delete(Some(saved.stored_name.as_str())).await.unwrap_err().http_status(), 401);
    Ok(())
}
