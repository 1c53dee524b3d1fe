//! Session data model.
//!
//! A session is an opaque token bound to a user with an absolute expiry. The
//! client only ever holds the token; the record itself is exclusively owned
//! by the session authority and its repository.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Length of generated session tokens.
pub const SESSION_TOKEN_LEN: usize = 40;
/// Fixed session lifetime in days; there is no sliding renewal.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Validation error raised by [`SessionId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("session token must be a non-empty string without whitespace")]
pub struct InvalidSessionToken;

/// Opaque session token.
///
/// Forged and well-formed tokens are deliberately indistinguishable here;
/// only the repository lookup decides whether a token means anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validate and construct a [`SessionId`] from string input.
    pub fn new(token: impl Into<String>) -> Result<Self, InvalidSessionToken> {
        let token = token.into();
        if token.is_empty() || token.len() > 255 || token.contains(char::is_whitespace) {
            return Err(InvalidSessionToken);
        }
        Ok(Self(token))
    }

    /// Generate a fresh random token of [`SESSION_TOKEN_LEN`] characters.
    pub fn random() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_TOKEN_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Token as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = InvalidSessionToken;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A login session record.
///
/// ## Invariants
/// - Valid iff the record exists and `now < expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Rebuild a session from stored fields.
    pub const fn new(id: SessionId, user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            expires_at,
        }
    }

    /// Issue a fresh session for `user_id` expiring [`SESSION_TTL_DAYS`]
    /// from `now`.
    pub fn issue(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::random(),
            user_id,
            expires_at: now + TimeDelta::days(SESSION_TTL_DAYS),
        }
    }

    /// Opaque token identifying this session.
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Owning user.
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Absolute expiry timestamp fixed at creation.
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the session is still valid at `now`.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn issued_sessions_expire_after_the_fixed_ttl() {
        let now = Utc::now();
        let session = Session::issue(UserId::random(), now);
        assert_eq!(session.expires_at(), now + TimeDelta::days(SESSION_TTL_DAYS));
        assert!(session.is_valid(now));
    }

    #[test]
    fn sessions_are_invalid_at_and_after_expiry() {
        let now = Utc::now();
        let session = Session::issue(UserId::random(), now);
        assert!(!session.is_valid(session.expires_at()));
        assert!(!session.is_valid(session.expires_at() + TimeDelta::seconds(1)));
    }

    #[test]
    fn random_tokens_are_long_and_distinct() {
        let a = SessionId::random();
        let b = SessionId::random();
        assert_eq!(a.as_str().len(), SESSION_TOKEN_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn tokens_with_whitespace_are_rejected() {
        assert!(SessionId::new("abc def").is_err());
        assert!(SessionId::new("").is_err());
    }
}
