//! Feature modules implementing the Crosslink Atlas API
//!
//! Each feature is a vertical slice:
//! - `commands/` - Write operations (ensure, create, update, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions
//!
//! # Features
//!
//! - **datasets**: listing, status changes and deletion of crosslink datasets
//! - **organelles**: the organelle catalog
//! - **organisms**: organisms created from sequence-database lookups
//! - **proteins**: protein metadata, batch enrichment and FASTA import
//! - **uploads**: the prepare/commit crosslink upload flow
//! - **users**: service-account resolution for offline imports

pub mod datasets;
pub mod organelles;
pub mod organisms;
pub mod proteins;
pub mod shared;
pub mod uploads;
pub mod users;

use axum::{extract::FromRef, Router};
use std::sync::Arc;

use crate::db::SharedStore;
use crate::ingest::{CrosslinkImporter, ImporterSettings};
use crate::middleware::JwtVerifier;
use crate::parsers::fasta::FastaParser;
use crate::uniprot::ProteinLookup;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub importer: Arc<CrosslinkImporter>,
    pub fasta: Arc<FastaParser>,
    pub verifier: JwtVerifier,
}

impl AppState {
    pub fn new(
        store: SharedStore,
        lookup: Arc<dyn ProteinLookup>,
        settings: ImporterSettings,
        jwt_secret: &str,
    ) -> Result<Self, regex::Error> {
        let importer = CrosslinkImporter::new(store.clone(), lookup, settings)?;
        Ok(Self {
            store,
            importer: Arc::new(importer),
            fasta: Arc::new(FastaParser::new()?),
            verifier: JwtVerifier::new(jwt_secret),
        })
    }
}

impl FromRef<AppState> for JwtVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

/// Creates the API router with all feature routes mounted
///
/// - `/uploads` - Crosslink upload flow
/// - `/organelles` - Organelle catalog
/// - `/organisms` - Organisms
/// - `/proteins` - Proteins and FASTA import
/// - `/datasets` - Datasets and their crosslinks
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/uploads", uploads::uploads_routes())
        .nest("/organelles", organelles::organelles_routes())
        .nest("/organisms", organisms::organisms_routes())
        .nest("/proteins", proteins::proteins_routes())
        .nest("/datasets", datasets::datasets_routes())
        .with_state(state)
}
