//! HTTP handlers for the REST API.
//!
//! Each handler validates the form, then delegates to the service layer.

use axum::{
    Json,
    extract::{State, multipart::MultipartRejection, Multipart},
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::state::AppState;
use super::upload::UploadForm;
use crate::media;
use crate::models::{ArchiveInfo, UploadedFile};

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, AppError>;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/archive/information
///
/// Expects exactly one `.zip` in the `file` field and answers with its listing.
pub async fn archive_information(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> HandlerResult<Json<ArchiveInfo>> {
    let mut form = UploadForm::read(multipart?).await?;
    let upload = single_file(
        form.take_files("file"),
        AppError::bad_request("No files uploaded", "You must upload a .zip file."),
    )?;

    if !media::has_zip_extension(&upload.file_name) {
        return Err(AppError::bad_request(
            "Invalid file type",
            "The uploaded file is not a .ZIP file.",
        ));
    }

    let info = state
        .archive
        .inspect(&upload)
        .await
        .map_err(|e| AppError::from_service("Failed to process archive", e))?;

    Ok(Json(info))
}

/// POST /api/archive/files
///
/// Bundles every `files[]` part into `archive.zip`. All parts must have an
/// allowed declared type, otherwise nothing is archived.
pub async fn archive_files(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> HandlerResult<Response> {
    let mut form = UploadForm::read(multipart?).await?;
    let uploads = form.take_files("files[]");
    if uploads.is_empty() {
        return Err(AppError::bad_request(
            "No files uploaded",
            "At least one file must be uploaded.",
        ));
    }

    let invalid: Vec<&str> = uploads
        .iter()
        .filter(|u| !media::is_allowed(&u.content_type, media::ARCHIVE_MEMBER_TYPES))
        .map(|u| u.file_name.as_str())
        .collect();
    if !invalid.is_empty() {
        return Err(AppError::bad_request(
            format!("Invalid file formats for: [{}]", invalid.join(" ")),
            "Some files have unsupported formats.",
        ));
    }

    let archive = state
        .archive
        .create(&uploads)
        .await
        .map_err(|e| AppError::from_service("Failed to create archive", e))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (header::CONTENT_DISPOSITION, "attachment; filename=archive.zip"),
        ],
        archive,
    )
        .into_response())
}

/// POST /api/mail/file
///
/// Mails the pdf/docx in `file` to the comma-separated `emails`. Only the
/// first `file` part is used.
pub async fn mail_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> HandlerResult<&'static str> {
    let mut form = UploadForm::read(multipart?).await?;
    // Extra parts under `file` are ignored
    let upload = form.take_files("file").into_iter().next().ok_or_else(|| {
        AppError::bad_request("Failed to read file", "No file was sent in the 'file' field.")
    })?;

    if !media::is_allowed(&upload.content_type, media::MAIL_ATTACHMENT_TYPES) {
        return Err(AppError::bad_request(
            "Invalid file type",
            format!("File type {} is not allowed", upload.content_type),
        ));
    }

    let emails = form.field("emails").unwrap_or_default();
    state
        .mail
        .send_file(&upload, emails)
        .await
        .map_err(|e| AppError::from_service("Failed to send email", e))?;

    Ok("Email sent successfully")
}

/// Fallback for the POST endpoints called with another method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("POST")
}

/// Fallback for `/health` called with anything but GET.
pub async fn health_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("GET")
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

fn single_file(mut files: Vec<UploadedFile>, missing: AppError) -> HandlerResult<UploadedFile> {
    match files.len() {
        0 => Err(missing),
        1 => Ok(files.remove(0)),
        _ => Err(AppError::bad_request(
            "Too many files",
            "Only one file should be uploaded.",
        )),
    }
}
