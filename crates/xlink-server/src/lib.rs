//! Crosslink Atlas server library
//!
//! Imports protein-protein crosslink tables, enriches the proteins they
//! reference from UniProtKB and serves the result over a JSON API.
//!
//! # Layout
//!
//! - [`parsers`]: delimited tables, FASTA archives, file-name conventions
//! - [`uniprot`]: the sequence-database client behind [`uniprot::ProteinLookup`]
//! - [`db`]: repository traits with PostgreSQL and in-memory stores
//! - [`features`]: vertical slices (commands, queries, routes) per entity
//! - [`ingest`]: the prepare/commit upload pipeline and directory seeding
//! - [`api`], [`middleware`]: response envelopes, errors, CORS, tracing, auth
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use xlink_server::{config::Config, db, features, ingest::ImporterSettings, uniprot::UniProtClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let store: db::SharedStore = Arc::new(db::PgStore::new(pool));
//!     let lookup = Arc::new(UniProtClient::new(
//!         config.uniprot.base_url.clone(),
//!         std::time::Duration::from_secs(config.uniprot.timeout_secs),
//!     )?);
//!     let state = features::AppState::new(
//!         store,
//!         lookup,
//!         ImporterSettings::from_config(&config),
//!         &config.auth.jwt_secret,
//!     )?;
//!     let _app = axum::Router::new().nest("/api/v1", features::router(state));
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod db;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod parsers;
pub mod uniprot;

pub use api::{ApiResult, AppError};
