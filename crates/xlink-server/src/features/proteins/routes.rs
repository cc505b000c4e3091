//! Protein API routes
//!
//! - `GET /api/v1/proteins?taxon_id=&page=&per_page=` - List proteins
//! - `GET /api/v1/proteins/:accession` - Get one protein
//! - `POST /api/v1/proteins/fasta` - Import a FASTA archive (multipart field `file`)

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::commands::{import_fasta, ImportFastaCommand};
use super::queries::{self, GetProteinQuery, ListProteinsQuery};
use crate::api::{ApiResponse, ApiResult, AppError};
use crate::features::uploads::{read_file_field, MAX_UPLOAD_BYTES};
use crate::features::AppState;
use crate::middleware::AuthUser;

pub fn proteins_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_proteins))
        .route(
            "/fasta",
            post(import_fasta_archive).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/:accession", get(get_protein))
}

/// List proteins
///
/// # Response
///
/// - `200 OK` - One page of proteins with pagination metadata
#[tracing::instrument(skip(state))]
async fn list_proteins(
    State(state): State<AppState>,
    Query(query): Query<ListProteinsQuery>,
) -> ApiResult<Response> {
    let response = queries::list::handle(state.store.as_ref(), query).await?;
    Ok(ApiResponse::success_with_meta(response.items, response.pagination.into_meta()).into_response())
}

/// Get one protein
///
/// # Response
///
/// - `200 OK` - The protein
/// - `404 Not Found` - Unknown accession
#[tracing::instrument(skip(state))]
async fn get_protein(
    State(state): State<AppState>,
    Path(accession): Path<String>,
) -> ApiResult<Response> {
    let protein = queries::get::handle(state.store.as_ref(), GetProteinQuery { accession }).await?;
    Ok(ApiResponse::success(protein).into_response())
}

/// Import a FASTA archive
///
/// # Response
///
/// - `201 Created` - Import report
/// - `400 Bad Request` - Missing file or no records
/// - `401 Unauthorized` - Missing or invalid token
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.id))]
async fn import_fasta_archive(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<Response> {
    let upload = read_file_field(multipart).await?;
    let content = String::from_utf8(upload.bytes)
        .map_err(|_| AppError::BadRequest("FASTA file is not valid UTF-8".to_string()))?;

    let report = import_fasta::handle(
        state.store.as_ref(),
        &state.fasta,
        ImportFastaCommand { content },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(report))).into_response())
}
