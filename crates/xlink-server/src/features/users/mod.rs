//! Users are managed elsewhere; the atlas only ensures service accounts exist.

pub mod commands;

pub use commands::{EnsureUserCommand, EnsureUserError};
