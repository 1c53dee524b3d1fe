//! REST API modules.

pub mod auth;
pub mod error;
pub mod health;
pub mod session;
pub mod state;
pub mod tasks;
#[cfg(test)]
pub mod test_utils;

pub use error::{ApiError, ApiResult};
pub use state::HttpState;
