//! File Upload Handler
//!
//! Images (PNG, JPEG, WebP) are verified by decoding; documents (PDF, Word)
//! are stored as-is. Files are named by their SHA256 so identical content
//! is stored once.

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::{AppError, CurrentUser, ServerState};
use shared::ErrorCode;
use shared::error::OpResponse;

/// Supported image formats
const IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Supported document formats (resumes, contracts)
const DOCUMENT_FORMATS: &[&str] = &["pdf", "doc", "docx"];

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub content_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Images,
    Documents,
}

impl Category {
    fn dir_name(self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Documents => "documents",
        }
    }
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Lowercased extension and its storage category
fn classify(filename: &str) -> Result<(String, Category), AppError> {
    let ext = PathBuf::from(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::InvalidFileExtension,
                format!("Invalid file extension for: {}", filename),
            )
        })?;

    if IMAGE_FORMATS.contains(&ext.as_str()) {
        Ok((ext, Category::Images))
    } else if DOCUMENT_FORMATS.contains(&ext.as_str()) {
        Ok((ext, Category::Documents))
    } else {
        Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!(
                "Unsupported file format '{}'. Supported: {}, {}",
                ext,
                IMAGE_FORMATS.join(", "),
                DOCUMENT_FORMATS.join(", ")
            ),
        ))
    }
}

/// Size limit, then image decode check
fn validate_file(data: &[u8], ext: &str, category: Category, max_bytes: usize) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if data.len() > max_bytes {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large. Maximum size is {} bytes", max_bytes),
        )
        .with_detail("max_bytes", max_bytes as u64));
    }
    if category == Category::Images
        && let Err(e) = image::load_from_memory(data)
    {
        return Err(AppError::with_message(
            ErrorCode::InvalidImageFile,
            format!("Invalid image file ({}): {}", ext, e),
        ));
    }
    Ok(())
}

/// Write `<dir>/<hash>.<ext>` unless it already exists; returns whether it was reused
async fn store(dir: &Path, filename: &str, data: &[u8]) -> Result<bool, AppError> {
    let storage_failed =
        |e: std::io::Error| AppError::with_message(ErrorCode::FileStorageFailed, e.to_string());

    tokio::fs::create_dir_all(dir).await.map_err(storage_failed)?;
    let path = dir.join(filename);
    if tokio::fs::try_exists(&path).await.map_err(storage_failed)? {
        return Ok(true);
    }
    tokio::fs::write(&path, data).await.map_err(storage_failed)?;
    Ok(false)
}

/// Upload handler
pub async fn upload(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<OpResponse<UploadResponse>>, AppError> {
    let max_bytes = state.config.max_upload_bytes;

    // Find the file field
    let mut field_data: Option<Vec<u8>> = None;
    let mut original_filename = None;

    while let Some(f) = multipart.next_field().await.map_err(|e| {
        if e.status() == http::StatusCode::PAYLOAD_TOO_LARGE {
            AppError::with_message(ErrorCode::FileTooLarge, e.body_text())
        } else {
            AppError::validation(format!("Invalid multipart request: {}", e))
        }
    })? {
        let name = f.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") {
            original_filename = f.file_name().map(|s| s.to_string());
            field_data = Some(
                f.bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?
                    .to_vec(),
            );
            break;
        }
    }

    let data = field_data.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::NoFileProvided,
            "No 'file' field found. Field name must be 'file'",
        )
    })?;

    let original_name = original_filename
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::NoFilename))?;

    let (ext, category) = classify(&original_name)?;
    validate_file(&data, &ext, category, max_bytes)?;

    let file_id = calculate_hash(&data);
    let filename = format!("{}.{}", file_id, ext);
    let dir = state.config.uploads_dir().join(category.dir_name());
    let reused = store(&dir, &filename, &data).await?;

    tracing::info!(
        user_id = current_user.id,
        original_name = %original_name,
        filename = %filename,
        size = data.len(),
        reused,
        "File uploaded"
    );

    let response = UploadResponse {
        url: format!("/uploads/{}/{}", category.dir_name(), filename),
        content_type: mime_guess::from_ext(&ext).first_or_octet_stream().to_string(),
        file_id,
        filename,
        original_name,
        size: data.len(),
    };
    let message = if reused {
        "File already uploaded"
    } else {
        "File uploaded"
    };
    Ok(Json(OpResponse::new(response, message)))
}
