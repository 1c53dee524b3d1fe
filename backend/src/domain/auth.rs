//! Login credentials.
//!
//! Mirrors the authoring form's constraints so invalid submissions are
//! rejected before they reach a use-case.

use crate::domain::user::{Email, UserValidationError};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;

/// Validation errors raised by [`Credentials::try_from_parts`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// The email address failed validation.
    #[error(transparent)]
    Email(#[from] UserValidationError),
    /// The password was shorter than [`PASSWORD_MIN`] characters.
    #[error("password must be at least {PASSWORD_MIN} characters")]
    PasswordTooShort,
}

impl CredentialsValidationError {
    /// Name of the form field the error applies to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::PasswordTooShort => "password",
        }
    }
}

/// Email and raw password presented at signup or signin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: Email,
    password: String,
}

impl Credentials {
    /// Validate and construct credentials from raw form input.
    pub fn try_from_parts(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email.into())?;
        let password = password.into();
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort);
        }
        Ok(Self { email, password })
    }

    /// Submitted email address.
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Submitted raw password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.com", "secret", true)]
    #[case("ada@example.com", "short", false)]
    #[case("not-an-email", "long enough", false)]
    fn validates_both_parts(#[case] email: &str, #[case] password: &str, #[case] ok: bool) {
        assert_eq!(Credentials::try_from_parts(email, password).is_ok(), ok);
    }

    #[test]
    fn password_minimum_counts_characters_not_bytes() {
        assert!(Credentials::try_from_parts("a@b.co", "señora").is_ok());
    }
}
