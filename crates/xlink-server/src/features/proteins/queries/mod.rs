pub mod get;
pub mod list;

pub use get::{GetProteinError, GetProteinQuery};
pub use list::ListProteinsQuery;
