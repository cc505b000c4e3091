pub mod create;
pub mod delete;
pub mod update_status;

pub use create::{CreateDatasetCommand, CreateDatasetError};
pub use delete::{DeleteDatasetCommand, DeleteDatasetError};
pub use update_status::{UpdateStatusCommand, UpdateStatusError};
