//! Crosslink file uploads: `prepare` analyses and stages a file, `commit`
//! turns the staged file into dataset rows.

pub mod multipart;
pub mod routes;

pub use multipart::{read_file_field, UploadedFile, MAX_UPLOAD_BYTES};
pub use routes::uploads_routes;
