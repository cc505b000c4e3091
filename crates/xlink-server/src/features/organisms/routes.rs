//! Organism API routes
//!
//! - `GET /api/v1/organisms` - List organisms
//! - `GET /api/v1/organisms/:taxon_id` - Get one organism

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::queries::{self, GetOrganismQuery};
use crate::api::{ApiResponse, ApiResult};
use crate::features::AppState;

pub fn organisms_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_organisms))
        .route("/:taxon_id", get(get_organism))
}

/// List organisms
///
/// # Response
///
/// - `200 OK` - All organisms
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(state))]
async fn list_organisms(State(state): State<AppState>) -> ApiResult<Response> {
    let organisms = queries::list::handle(state.store.as_ref()).await?;
    Ok(ApiResponse::success(organisms).into_response())
}

/// Get one organism
///
/// # Response
///
/// - `200 OK` - The organism
/// - `404 Not Found` - Unknown taxon id
#[tracing::instrument(skip(state))]
async fn get_organism(
    State(state): State<AppState>,
    Path(taxon_id): Path<i32>,
) -> ApiResult<Response> {
    let organism = queries::get::handle(state.store.as_ref(), GetOrganismQuery { taxon_id }).await?;
    Ok(ApiResponse::success(organism).into_response())
}
