//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Thin adapters between Diesel row structs and domain types; no business
//! logic lives here. Connections come from a `bb8` pool via `diesel-async`,
//! and every database failure is mapped to the owning port's error type
//! before it leaves this module.

mod diesel_session_repository;
mod diesel_task_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_session_repository::DieselSessionRepository;
pub use diesel_task_repository::DieselTaskRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolError};
