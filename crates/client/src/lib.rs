//! Client-side task list state and HTTP adapter.
//!
//! [`store::TaskStore`] holds the cached task list and mirrors it against
//! the backend through the [`api::ServerApi`] trait; [`api::HttpServerApi`]
//! is the reqwest implementation with a cookie jar for the session.

pub mod api;
pub mod model;
pub mod store;
pub mod user;

pub use api::{ApiError, HttpServerApi, ServerApi};
pub use model::{Priority, Status, Task, sort_by_status};
pub use store::{Outcome, TaskStore};
pub use user::UserStore;
