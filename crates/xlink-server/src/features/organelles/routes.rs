//! Organelle API routes
//!
//! - `GET /api/v1/organelles` - List organelles

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::api::{ApiResponse, ApiResult};
use crate::features::AppState;

pub fn organelles_routes() -> Router<AppState> {
    Router::new().route("/", get(list_organelles))
}

#[tracing::instrument(skip(state))]
async fn list_organelles(State(state): State<AppState>) -> ApiResult<Response> {
    let organelles = super::queries::list::handle(state.store.as_ref()).await?;
    Ok(ApiResponse::success(organelles).into_response())
}
