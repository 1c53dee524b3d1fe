//! User data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised by the user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty or not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The email address was empty once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// The email address did not look like `local@domain.tld`.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// The password hash was empty.
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() || raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique email address identifying a user at registration.
///
/// Validation is deliberately shallow: a non-empty local part, a single `@`,
/// and a domain containing a dot. Anything stricter belongs to the mail
/// system, not this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`] from owned input.
    pub fn new(address: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(address.into())
    }

    fn from_owned(address: String) -> Result<Self, UserValidationError> {
        if address.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if address.trim() != address || address.contains(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        let mut parts = address.split('@');
        let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => (local, domain),
            _ => return Err(UserValidationError::InvalidEmail),
        };
        let domain_ok = domain.split('.').count() >= 2
            && domain.split('.').all(|label| !label.is_empty());
        if local.is_empty() || !domain_ok {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(address))
    }

    /// Case-normalised form used for uniqueness comparisons.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Opaque Argon2 password hash.
///
/// Never serialised; the `Debug` impl redacts the content so hashes cannot
/// leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash string.
    pub fn new(encoded: impl Into<String>) -> Result<Self, UserValidationError> {
        let encoded = encoded.into();
        if encoded.trim().is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self(encoded))
    }

    /// Encoded hash in PHC string format.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Application user.
///
/// ## Invariants
/// - `email` is unique across users (enforced at registration).
/// - Immutable after creation; there is no profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    password_hash: PasswordHash,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub const fn new(id: UserId, email: Email, password_hash: PasswordHash) -> Self {
        Self {
            id,
            email,
            password_hash,
        }
    }

    /// Stable user identifier.
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Registered email address.
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Stored password hash.
    pub const fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }
}
