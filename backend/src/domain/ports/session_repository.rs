//! Port abstraction for session persistence adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::session::{Session, SessionId};

/// Persistence errors raised by session repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionRepositoryError {
    /// Repository connection could not be established.
    #[error("session repository connection failed: {message}")]
    Connection {
        /// Adapter-level description of the failure.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("session repository query failed: {message}")]
    Query {
        /// Adapter-level description of the failure.
        message: String,
    },
}

impl SessionRepositoryError {
    /// Connection-class failure.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query-class failure.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for session record storage.
///
/// Lookups never interpret expiry; validity is the session authority's call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a freshly issued session.
    async fn insert(&self, session: &Session) -> Result<(), SessionRepositoryError>;

    /// Fetch the session with `id`, expired or not.
    async fn find(&self, id: &SessionId) -> Result<Option<Session>, SessionRepositoryError>;

    /// Delete the session with `id`. Returns `false` when no row matched.
    async fn delete(&self, id: &SessionId) -> Result<bool, SessionRepositoryError>;
}

/// In-memory adapter backing the no-database server mode and handler tests.
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), SessionRepositoryError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id().as_str().to_owned(), session.clone());
        Ok(())
    }

    async fn find(&self, id: &SessionId) -> Result<Option<Session>, SessionRepositoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id.as_str()).cloned())
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionRepositoryError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(id.as_str()).is_some())
    }
}
