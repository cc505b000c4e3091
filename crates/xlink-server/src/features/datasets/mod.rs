//! Datasets: user-owned crosslink collections scoped to one organism and organelle

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateDatasetCommand, CreateDatasetError, DeleteDatasetCommand, DeleteDatasetError,
    UpdateStatusCommand, UpdateStatusError,
};
pub use queries::{GetDatasetError, GetDatasetQuery, ListCrosslinksQuery, ListDatasetsQuery};
pub use routes::datasets_routes;
