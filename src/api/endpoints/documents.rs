//! Document endpoints — upload, fetch, list, stage audit, downloads.
//!
//! Upload stages the file on disk, creates the document record, and submits
//! a pipeline job without awaiting it; the client polls `GET /:id` for
//! progress.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Document, DocumentStatus, NewDocument, ProcessingStage, StageRecord};
use crate::render;

/// Upload content types that pass without a warning.
const EXPECTED_CONTENT_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/x-msvideo"];

const DEFAULT_LIST_LIMIT: usize = 10;

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub file: String,
    pub document: Document,
}

/// `POST /api/documents/upload` — multipart form with a required `video`
/// field and an optional `title`.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut title: Option<String> = None;
    let mut staged: Option<StagedUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("title") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid title field: {e}")))?;
                if !value.trim().is_empty() {
                    title = Some(value);
                }
            }
            Some("video") => {
                let original = sanitize_filename(field.file_name().unwrap_or("upload.mp4"));

                // Accept anything but log unexpected types — no hard
                // validation on upload.
                if let Some(content_type) = field.content_type() {
                    if !EXPECTED_CONTENT_TYPES.contains(&content_type) {
                        tracing::warn!(content_type, filename = %original, "unexpected upload content type");
                    }
                }

                let stored_name =
                    format!("{}-{original}", chrono::Utc::now().timestamp_millis());
                let path = ctx.config.uploads_dir.join(&stored_name);
                let size = stream_to_disk(field, &path).await?;

                staged = Some(StagedUpload {
                    stored_name,
                    original,
                    size,
                });
            }
            _ => {}
        }
    }

    let Some(staged) = staged else {
        return Err(ApiError::BadRequest("No file uploaded".into()));
    };

    let document = ctx
        .store
        .create(NewDocument {
            title: title.unwrap_or_else(|| staged.original.clone()),
            filename: staged.original,
            file_size: staged.size,
            status: DocumentStatus::Processing,
            processing_stage: ProcessingStage::AudioExtraction,
        })
        .await;

    tracing::info!(
        document_id = %document.id,
        file = %staged.stored_name,
        file_size = staged.size,
        "upload accepted, pipeline queued"
    );

    // Fire the pipeline; the response does not wait for processing.
    let source = ctx.config.uploads_dir.join(&staged.stored_name);
    ctx.workers.submit(document.id.clone(), source);

    Ok(Json(UploadResponse {
        message: "Upload successful",
        file: staged.stored_name,
        document,
    }))
}

struct StagedUpload {
    stored_name: String,
    original: String,
    size: u64,
}

/// Stream one multipart field to disk chunk by chunk, so an upload never
/// occupies more than one chunk of memory. Removes the partial file on
/// failure.
async fn stream_to_disk(mut field: Field<'_>, path: &std::path::Path) -> Result<u64, ApiError> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to stage upload: {e}")))?;

    let mut size: u64 = 0;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(path).await;
                return Err(ApiError::BadRequest(format!("Failed to read upload: {e}")));
            }
        };
        if let Err(e) = file.write_all(&chunk).await {
            drop(file);
            let _ = tokio::fs::remove_file(path).await;
            return Err(ApiError::Internal(format!("Failed to stage upload: {e}")));
        }
        size += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to stage upload: {e}")))?;
    Ok(size)
}

/// `GET /api/documents/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    ctx.store
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Document not found".into()))
}

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

/// `GET /api/documents` — most recent first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Document>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Json(ctx.store.recent(limit).await)
}

/// `GET /api/documents/:id/stages` — stage audit trail.
pub async fn stages(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StageRecord>>, ApiError> {
    if ctx.store.get(&id).await.is_none() {
        return Err(ApiError::NotFound("Document not found".into()));
    }
    Ok(Json(ctx.store.stages(&id).await))
}

/// `GET /api/documents/:id/download/pdf`
pub async fn download_pdf(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    download(ctx, &id, "pdf", "application/pdf").await
}

/// `GET /api/documents/:id/download/docx`
pub async fn download_docx(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    download(
        ctx,
        &id,
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    )
    .await
}

/// Render the BRD to a temp file, serve it as an attachment named after the
/// document title, and remove the temp file regardless of outcome.
async fn download(
    ctx: ApiContext,
    id: &str,
    ext: &str,
    content_type: &'static str,
) -> Result<Response, ApiError> {
    let not_ready = || ApiError::NotFound("Document not found or not processed".into());
    let document = ctx.store.get(id).await.ok_or_else(not_ready)?;
    let brd = document.brd_content.as_ref().ok_or_else(not_ready)?;
    let content = render::render_brd(brd);

    let temp_path = ctx.config.temp_dir.join(format!("{}.{ext}", document.id));
    tokio::fs::create_dir_all(&ctx.config.temp_dir)
        .await
        .map_err(|e| ApiError::Internal(format!("Temp directory: {e}")))?;
    tokio::fs::write(&temp_path, &content)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to write download file: {e}")))?;
    let bytes = tokio::fs::read(&temp_path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read download file: {e}")))?;
    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        tracing::warn!(path = %temp_path.display(), error = %e, "failed to remove temp download file");
    }

    let disposition = format!(
        "attachment; filename=\"{}.{ext}\"",
        attachment_filename(&document.title)
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Make a title safe to embed in a `Content-Disposition` header: quotes,
/// control characters (CR/LF included), and non-ASCII would all produce an
/// invalid header value.
fn attachment_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Strip any path components a client smuggles into the filename.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim();
    if base.is_empty() {
        "upload.mp4".to_string()
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("meeting.mp4"), "meeting.mp4");
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\x\clip.mov"), "clip.mov");
    }

    #[test]
    fn attachment_filename_strips_quotes_and_control_chars() {
        assert_eq!(attachment_filename("Plain Title"), "Plain Title");
        assert_eq!(attachment_filename("Say \"hi\""), "Say hi");
        assert_eq!(
            attachment_filename("Line\r\nInjection: attempt"),
            "LineInjection: attempt"
        );
    }

    #[test]
    fn attachment_filename_replaces_non_ascii() {
        assert_eq!(attachment_filename("Réunion Équipe"), "R_union _quipe");
    }

    #[test]
    fn attachment_filename_never_returns_empty() {
        assert_eq!(attachment_filename("\r\n"), "document");
        assert_eq!(attachment_filename("  "), "document");
    }

    #[test]
    fn sanitize_defaults_empty_names() {
        assert_eq!(sanitize_filename(""), "upload.mp4");
        assert_eq!(sanitize_filename("dir/"), "upload.mp4");
    }
}
