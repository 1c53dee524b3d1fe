//! Session validation and invalidation.
//!
//! The authority is the only code that interprets session records. Expired,
//! missing, and absent tokens are deliberately indistinguishable to callers:
//! all three read as "unauthenticated", so probing cannot reveal whether a
//! token ever existed.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::error::Error;
use crate::domain::ports::{
    SessionRepository, SessionRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::session::{Session, SessionId};
use crate::domain::user::{User, UserId};

/// A validated session together with the user it is bound to.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    user: User,
    session: Session,
}

impl AuthenticatedSession {
    /// The authenticated user.
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// The backing session record.
    pub const fn session(&self) -> &Session {
        &self.session
    }
}

fn map_session_error(error: SessionRepositoryError) -> Error {
    Error::internal(format!("session repository error: {error}"))
}

fn map_user_error(error: UserRepositoryError) -> Error {
    Error::internal(format!("user repository error: {error}"))
}

/// Validates inbound session tokens and manages session lifecycle.
#[derive(Clone)]
pub struct SessionAuthority {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl SessionAuthority {
    /// Build an authority over the given repositories and clock.
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            users,
            clock,
        }
    }

    /// Resolve a token to its user and session.
    ///
    /// Returns `Ok(None)`, never a distinct error, when the token is
    /// absent, the record is missing, or the record has expired. An expired
    /// record is removed on the way out, so the row does not outlive its
    /// validity. Only repository transport failures produce `Err`.
    pub async fn validate(
        &self,
        token: Option<&SessionId>,
    ) -> Result<Option<AuthenticatedSession>, Error> {
        let Some(token) = token else {
            return Ok(None);
        };

        let Some(session) = self.sessions.find(token).await.map_err(map_session_error)? else {
            return Ok(None);
        };

        if !session.is_valid(self.clock.utc()) {
            debug!(user_id = %session.user_id(), "session expired; removing record");
            self.discard(token).await;
            return Ok(None);
        }

        match self
            .users
            .find_by_id(session.user_id())
            .await
            .map_err(map_user_error)?
        {
            Some(user) => Ok(Some(AuthenticatedSession { user, session })),
            None => {
                // Orphaned session: the owning account is gone.
                warn!(user_id = %session.user_id(), "session bound to unknown user; removing");
                self.discard(token).await;
                Ok(None)
            }
        }
    }

    /// Invalidate the session behind `token`.
    ///
    /// Fails with `unauthorized` when no valid session was presented. On
    /// success the record is gone and the caller must clear the client-held
    /// token (blank cookie).
    pub async fn invalidate(&self, token: Option<&SessionId>) -> Result<(), Error> {
        let authenticated = self
            .validate(token)
            .await?
            .ok_or_else(|| Error::unauthorized("not authorised"))?;

        self.sessions
            .delete(authenticated.session().id())
            .await
            .map_err(map_session_error)?;
        Ok(())
    }

    /// Issue and persist a fresh session for `user_id`.
    ///
    /// Expiry is a fixed offset from now; there is no sliding renewal.
    pub async fn open_session(&self, user_id: UserId) -> Result<Session, Error> {
        let session = Session::issue(user_id, self.clock.utc());
        self.sessions
            .insert(&session)
            .await
            .map_err(map_session_error)?;
        Ok(session)
    }

    /// Best-effort removal used while already reporting "unauthenticated".
    async fn discard(&self, token: &SessionId) {
        if let Err(error) = self.sessions.delete(token).await {
            warn!(%error, "failed to remove stale session record");
        }
    }
}
