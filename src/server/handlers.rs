use axum::body::{Body, Bytes};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{debug, info};

use super::AppState;
use crate::error::AppResult;
use crate::files::Upload;

#[derive(Debug, Default, Deserialize)]
pub(super) struct DeletePayload {
    #[serde(default)]
    filename: Option<String>,
}

pub(super) async fn login(State(state): State<AppState>) -> Json<Value> {
    state.files.gate().login();
    Json(json!({ "ok": true }))
}

pub(super) async fn logout(State(state): State<AppState>) -> Json<Value> {
    state.files.gate().logout();
    Json(json!({ "ok": true }))
}

pub(super) async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Value>> {
    let mut saved = None;
    // A body that is not multipart at all carries no file.
    if let Ok(mut multipart) = multipart {
        while let Some(field) = multipart.next_field().await? {
            if field.name() != Some("file") {
                continue;
            }
            // Text fields named `file`, and file inputs left empty (filename=""), carry no file.
            let Some(original_name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string) else {
                continue;
            };
            let body = StreamReader::new(field.map_err(std::io::Error::other));
            saved = Some(state.files.store(Some(Upload::new(original_name, body))).await?);
            break;
        }
    }
    let saved = match saved {
        Some(s) => s,
        None => state.files.store(None).await?,
    };
    Ok(Json(json!({ "ok": true, "filename": saved.stored_name, "original": saved.original_name })))
}

/// Accept `{filename}` as JSON or as a urlencoded form. Anything unreadable is
/// treated as if the field were missing.
fn parse_delete_payload(headers: &HeaderMap, body: &[u8]) -> DeletePayload {
    if body.is_empty() {
        return DeletePayload::default();
    }
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);
    let parsed = if is_form {
        serde_urlencoded::from_bytes::<DeletePayload>(body).ok()
    } else {
        serde_json::from_slice::<DeletePayload>(body).ok()
    };
    parsed.unwrap_or_default()
}

pub(super) async fn delete_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let payload = parse_delete_payload(&headers, &body);
    state.files.delete(payload.filename.as_deref()).await?;
    Ok(Json(json!({ "ok": true })))
}

pub(super) async fn list_files(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let files = state.files.list().await?;
    debug!(target: "filehost::http", "list -> {} files", files.len());
    Ok(Json(json!({ "files": files })))
}

pub(super) async fn serve_file(State(state): State<AppState>, Path(name): Path<String>) -> AppResult<Response> {
    let content = state.files.fetch(&name).await?;
    info!(target: "filehost::http", "serving {} ({} bytes)", content.stored_name, content.size);

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&content.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content.size));

    let body = Body::from_stream(ReaderStream::new(content.reader));
    Ok((StatusCode::OK, headers, body).into_response())
}
