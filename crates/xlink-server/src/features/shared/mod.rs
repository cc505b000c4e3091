pub mod error_helpers;
pub mod pagination;

pub use pagination::{PaginationMetadata, PaginationParams};
