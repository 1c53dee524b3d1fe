//! Port abstraction for user persistence adapters.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::{Email, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-level description of the failure.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-level description of the failure.
        message: String,
    },
    /// An account with this email already exists.
    #[error("email is already registered")]
    DuplicateEmail,
}

impl UserRepositoryError {
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

/// Port for user account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Email uniqueness violations surface as
    /// [`UserRepositoryError::DuplicateEmail`].
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch a user by email, compared case-insensitively.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;
}

/// In-memory adapter backing the no-database server mode and handler tests.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|existing| existing.email().normalized() == user.email().normalized())
        {
            return Err(UserRepositoryError::DuplicateEmail);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|user| user.email().normalized() == email.normalized())
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id() == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::PasswordHash;

    fn user_with_email(address: &str) -> User {
        User::new(
            UserId::random(),
            Email::new(address).expect("valid email"),
            PasswordHash::new("$argon2id$v=19$fixture").expect("valid hash"),
        )
    }

    #[tokio::test]
    async fn duplicate_emails_are_rejected_case_insensitively() {
        let repo = MemoryUserRepository::default();
        repo.insert(&user_with_email("ada@example.com"))
            .await
            .expect("first insert");

        let duplicate = repo.insert(&user_with_email("Ada@Example.com")).await;
        assert_eq!(duplicate, Err(UserRepositoryError::DuplicateEmail));
    }

    #[tokio::test]
    async fn lookup_by_email_ignores_case() {
        let repo = MemoryUserRepository::default();
        let user = user_with_email("ada@example.com");
        repo.insert(&user).await.expect("insert");

        let found = repo
            .find_by_email(&Email::new("ADA@EXAMPLE.COM").expect("valid email"))
            .await
            .expect("find");
        assert_eq!(found.map(|u| *u.id()), Some(*user.id()));
    }
}
