//! Upload API routes
//!
//! - `POST /api/v1/uploads/prepare` - Analyse and stage a crosslink file (multipart `file`, optional `organelle_id`)
//! - `POST /api/v1/uploads/commit` - Create or append to a dataset from a staged file

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::multipart::{read_file_field, MAX_UPLOAD_BYTES};
use crate::api::{ApiResponse, ApiResult};
use crate::features::AppState;
use crate::ingest::{CommitMode, CommitRequest, PrepareRequest};
use crate::middleware::AuthUser;

pub fn uploads_routes() -> Router<AppState> {
    Router::new()
        .route("/prepare", post(prepare_upload))
        .route("/commit", post(commit_upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Analyse an upload
///
/// # Response
///
/// - `200 OK` - Detected organism/organelle, parse summary and the caller's compatible datasets
/// - `400 Bad Request` - Missing file, no valid rows or unresolvable organism/organelle
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Unknown `organelle_id`
/// - `502 Bad Gateway` - Sequence database unavailable
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.id))]
async fn prepare_upload(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<Response> {
    let upload = read_file_field(multipart).await?;
    let outcome = state
        .importer
        .prepare(PrepareRequest {
            user_id: user.id,
            filename: upload.filename,
            content: upload.bytes,
            organelle_id: upload.organelle_id,
        })
        .await?;

    Ok(ApiResponse::success(outcome).into_response())
}

/// Commit a staged upload
///
/// # Response
///
/// - `201 Created` - New dataset with its crosslinks
/// - `200 OK` - Rows appended to an existing dataset
/// - `400 Bad Request` - Invalid body, staged file missing or dataset mismatch
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Target dataset owned by another user
/// - `404 Not Found` - Unknown dataset, organism or organelle
/// - `409 Conflict` - Filename already used, or crosslinks already in the dataset
#[tracing::instrument(skip(state, request), fields(user_id = %user.id))]
async fn commit_upload(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut request): Json<CommitRequest>,
) -> ApiResult<Response> {
    request.user_id = user.id;
    let mode = request.mode;
    let outcome = state.importer.commit(request).await?;

    let status = match mode {
        CommitMode::Create => StatusCode::CREATED,
        CommitMode::Append => StatusCode::OK,
    };
    Ok((status, Json(ApiResponse::success(outcome))).into_response())
}
