pub mod get;
pub mod list;

pub use get::{GetOrganismError, GetOrganismQuery};
