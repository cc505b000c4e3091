//! Dataset API routes
//!
//! - `GET /api/v1/datasets` - List datasets (filters: organism_taxon_id, organelle_id, user_id, status, q)
//! - `GET /api/v1/datasets/:id` - Get one dataset
//! - `DELETE /api/v1/datasets/:id` - Delete an owned dataset
//! - `PATCH /api/v1/datasets/:id/status` - Advance an owned dataset's status
//! - `GET /api/v1/datasets/:id/crosslinks` - Page through a dataset's crosslinks

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use super::commands::{delete, update_status, DeleteDatasetCommand, UpdateStatusCommand};
use super::queries::{self, GetDatasetQuery, ListCrosslinksQuery, ListDatasetsQuery};
use crate::api::{ApiResponse, ApiResult};
use crate::features::AppState;
use crate::middleware::AuthUser;

pub fn datasets_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_datasets))
        .route("/:id", get(get_dataset).delete(delete_dataset))
        .route("/:id/status", patch(update_dataset_status))
        .route("/:id/crosslinks", get(list_crosslinks))
}

/// List datasets
///
/// # Response
///
/// - `200 OK` - One page of datasets with pagination metadata
#[tracing::instrument(skip(state))]
async fn list_datasets(
    State(state): State<AppState>,
    Query(query): Query<ListDatasetsQuery>,
) -> ApiResult<Response> {
    let response = queries::list::handle(state.store.as_ref(), query).await?;
    Ok(ApiResponse::success_with_meta(response.items, response.pagination.into_meta()).into_response())
}

/// Get one dataset
///
/// # Response
///
/// - `200 OK` - The dataset
/// - `404 Not Found` - Unknown id
#[tracing::instrument(skip(state))]
async fn get_dataset(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Response> {
    let dataset = queries::get::handle(state.store.as_ref(), GetDatasetQuery { id }).await?;
    Ok(ApiResponse::success(dataset).into_response())
}

/// Delete a dataset and its crosslinks
///
/// # Response
///
/// - `200 OK` - Id and number of crosslinks removed
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Dataset owned by another user
/// - `404 Not Found` - Unknown id
#[tracing::instrument(skip(state), fields(user_id = %user.id))]
async fn delete_dataset(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let command = DeleteDatasetCommand {
        dataset_id: id,
        user_id: user.id,
    };
    let response = delete::handle(state.store.as_ref(), command).await?;
    Ok(ApiResponse::success(response).into_response())
}

/// Advance a dataset's status
///
/// Body: `{"status": "validated"}`
///
/// # Response
///
/// - `200 OK` - Updated dataset
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Dataset owned by another user
/// - `404 Not Found` - Unknown id
/// - `409 Conflict` - Status would move backwards
#[tracing::instrument(skip(state, command), fields(user_id = %user.id))]
async fn update_dataset_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateStatusCommand>,
) -> ApiResult<Response> {
    command.dataset_id = id;
    command.user_id = user.id;
    let dataset = update_status::handle(state.store.as_ref(), command).await?;
    Ok(ApiResponse::success(dataset).into_response())
}

/// Page through a dataset's crosslinks
///
/// # Response
///
/// - `200 OK` - One page of crosslinks with pagination metadata
/// - `404 Not Found` - Unknown dataset
#[tracing::instrument(skip(state))]
async fn list_crosslinks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(mut query): Query<ListCrosslinksQuery>,
) -> ApiResult<Response> {
    query.dataset_id = id;
    let response = queries::list_crosslinks::handle(state.store.as_ref(), query).await?;
    Ok(ApiResponse::success_with_meta(response.items, response.pagination.into_meta()).into_response())
}
