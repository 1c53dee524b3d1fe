//! Signup and signin use-cases.
//!
//! Password hashing uses Argon2id in PHC string format. Unknown email and
//! wrong password produce the same error so signin cannot be used to probe
//! which addresses are registered.

use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use serde_json::json;
use tracing::debug;

use crate::domain::auth::Credentials;
use crate::domain::error::Error;
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{PasswordHash, User, UserId};

const BAD_CREDENTIALS: &str = "invalid email or password";

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::DuplicateEmail => duplicate_email_error(),
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn duplicate_email_error() -> Error {
    Error::invalid_request("email is already registered")
        .with_details(json!({ "field": "email", "code": "duplicate_email" }))
}

/// Registration and credential verification over a user repository.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    /// Build the service over a user repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new account.
    ///
    /// Rejects duplicate emails with `invalid_request` before hashing; the
    /// repository's unique constraint backstops the read-then-write race.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<User, Error> {
        if self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?
            .is_some()
        {
            return Err(duplicate_email_error());
        }

        let hash = hash_password(credentials.password())?;
        let user = User::new(UserId::random(), credentials.email().clone(), hash);
        self.users.insert(&user).await.map_err(map_repository_error)?;
        Ok(user)
    }

    /// Verify credentials and return the matching user.
    pub async fn verify(&self, credentials: &Credentials) -> Result<User, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?
        else {
            debug!("signin with unknown email");
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };

        if !verify_password(credentials.password(), user.password_hash())? {
            debug!(user_id = %user.id(), "signin with wrong password");
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }
        Ok(user)
    }
}

fn hash_password(raw: &str) -> Result<PasswordHash, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let encoded = Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map_err(|error| Error::internal(format!("password hashing failed: {error}")))?;
    PasswordHash::new(encoded.to_string())
        .map_err(|error| Error::internal(format!("invalid generated hash: {error}")))
}

fn verify_password(raw: &str, stored: &PasswordHash) -> Result<bool, Error> {
    let parsed = argon2::password_hash::PasswordHash::new(stored.as_str())
        .map_err(|error| Error::internal(format!("stored hash is malformed: {error}")))?;
    Ok(Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::MemoryUserRepository;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryUserRepository::default()))
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials::try_from_parts(email, password).expect("valid credentials")
    }

    #[tokio::test]
    async fn sign_up_then_verify_round_trips() {
        let auth = service();
        let creds = credentials("ada@example.com", "correct horse");
        let created = auth.sign_up(&creds).await.expect("sign up");

        let verified = auth.verify(&creds).await.expect("verify");
        assert_eq!(verified.id(), created.id());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_before_insert() {
        let auth = service();
        let creds = credentials("ada@example.com", "correct horse");
        auth.sign_up(&creds).await.expect("first sign up");

        let again = credentials("Ada@example.com", "another pass");
        let error = auth.sign_up(&again).await.expect_err("should reject");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let auth = service();
        auth.sign_up(&credentials("ada@example.com", "correct horse"))
            .await
            .expect("sign up");

        let unknown = auth
            .verify(&credentials("nobody@example.com", "whatever pass"))
            .await
            .expect_err("unknown email");
        let wrong = auth
            .verify(&credentials("ada@example.com", "wrong password"))
            .await
            .expect_err("wrong password");

        assert_eq!(unknown.code(), ErrorCode::Unauthorized);
        assert_eq!(unknown.message(), wrong.message());
    }

    #[test]
    fn stored_hashes_are_phc_argon2id_strings() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).expect("verify"));
        assert!(!verify_password("wrong", &hash).expect("verify"));
    }
}
