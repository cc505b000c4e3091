use axum::extract::Multipart;
use uuid::Uuid;

use crate::api::AppError;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// The `file` part of a multipart form plus the optional `organelle_id` field.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub organelle_id: Option<Uuid>,
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {err}"))
}

/// Read a multipart form holding a `file` part. Unknown fields are ignored.
pub async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut organelle_id = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .ok_or_else(|| AppError::BadRequest("The file part has no file name".to_string()))?;
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("organelle_id") => {
                let text = field.text().await.map_err(bad_multipart)?;
                let text = text.trim();
                if !text.is_empty() {
                    let id = Uuid::parse_str(text).map_err(|_| {
                        AppError::BadRequest(format!("organelle_id '{text}' is not a valid UUID"))
                    })?;
                    organelle_id = Some(id);
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Multipart field 'file' is required".to_string()))?;

    Ok(UploadedFile {
        filename,
        bytes,
        organelle_id,
    })
}
