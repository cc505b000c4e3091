pub mod get;
pub mod list;
pub mod list_crosslinks;

pub use get::{GetDatasetError, GetDatasetQuery};
pub use list::ListDatasetsQuery;
pub use list_crosslinks::ListCrosslinksQuery;
