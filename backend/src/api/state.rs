//! Shared HTTP handler state.
//!
//! Handlers accept this via `actix_web::web::Data` so they depend only on
//! domain services and ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::TaskRepository;
use crate::domain::{AuthService, SessionAuthority};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub authority: Arc<SessionAuthority>,
    pub auth: Arc<AuthService>,
    pub tasks: Arc<dyn TaskRepository>,
}

impl HttpState {
    /// Bundle the services and repositories handlers need.
    pub fn new(
        authority: Arc<SessionAuthority>,
        auth: Arc<AuthService>,
        tasks: Arc<dyn TaskRepository>,
    ) -> Self {
        Self {
            authority,
            auth,
            tasks,
        }
    }
}
