//! Crosslink Atlas common library
//!
//! Pieces shared by the server and the offline importer:
//!
//! - **Logging**: one place that builds the `tracing` subscriber for every binary
//! - **Checksums**: SHA-256 content hashes used to identify uploaded files
//!
//! # Example
//!
//! ```no_run
//! use xlink_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!(digest = %xlink_common::checksum::sha256_hex(b"P1,P2"), "hashed");
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod checksum;
pub mod logging;
