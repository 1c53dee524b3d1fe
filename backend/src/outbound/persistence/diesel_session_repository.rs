//! PostgreSQL-backed `SessionRepository` implementation using Diesel ORM.
//!
//! Stores one row per active session. Expiry interpretation belongs to the
//! session authority; this adapter returns rows exactly as stored.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{SessionRepository, SessionRepositoryError};
use crate::domain::{Session, SessionId};

use super::models::{NewSessionRow, SessionRow};
use super::pool::{DbPool, PoolError};
use super::schema::sessions;

/// Diesel-backed implementation of the `SessionRepository` port.
#[derive(Clone)]
pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SessionRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            SessionRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> SessionRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            SessionRepositoryError::connection("database connection error")
        }
        _ => SessionRepositoryError::query("database error"),
    }
}

#[async_trait]
impl SessionRepository for DieselSessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(sessions::table)
            .values(NewSessionRow::from_session(session))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find(&self, id: &SessionId) -> Result<Option<Session>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<SessionRow> = sessions::table
            .find(id.as_str())
            .select(SessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| Session::try_from(row).map_err(SessionRepositoryError::query))
            .transpose()
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(sessions::table.find(id.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }
}
