pub mod ensure;

pub use ensure::{EnsureUserCommand, EnsureUserError};
