//! Domain primitives, ports, and services.
//!
//! Purpose: strongly typed entities shared by the API and persistence
//! layers, the hexagonal port traits, and the two services with behaviour
//! worth isolating: the session authority and the auth use-cases. Types
//! are immutable; invariants and serde contracts live on each type's
//! Rustdoc.

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod ports;
pub mod session;
pub mod session_authority;
pub mod task;
pub mod user;

pub use self::auth::{Credentials, CredentialsValidationError, PASSWORD_MIN};
pub use self::auth_service::AuthService;
pub use self::error::{Error, ErrorCode};
pub use self::session::{SESSION_TTL_DAYS, Session, SessionId};
pub use self::session_authority::{AuthenticatedSession, SessionAuthority};
pub use self::task::{Priority, Status, Task, TaskId, TaskName, TaskValidationError};
pub use self::user::{Email, PasswordHash, User, UserId, UserValidationError};
