//! Client-held authentication state.

use std::sync::Arc;

use tracing::warn;

use crate::api::ServerApi;
use crate::model::User;
use crate::store::Outcome;

/// Cached view of the signed-in user.
///
/// `is_loading` follows the same discipline as the task store: raised at
/// the start of every operation and released on every exit path.
pub struct UserStore {
    api: Arc<dyn ServerApi>,
    user: Option<User>,
    is_loading: bool,
}

impl UserStore {
    /// Build an unauthenticated store over the given API.
    pub fn new(api: Arc<dyn ServerApi>) -> Self {
        Self {
            api,
            user: None,
            is_loading: false,
        }
    }

    /// The signed-in user, if the last validation succeeded.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Register a new account. Does not sign in.
    pub async fn sign_up(&mut self, email: &str, password: &str) -> Outcome {
        self.is_loading = true;
        let outcome = match self.api.sign_up(email, password).await {
            Ok(response) if response.success => Outcome {
                success: true,
                message: response.message,
            },
            Ok(response) => Outcome {
                success: false,
                message: response.message,
            },
            Err(error) => Outcome {
                success: false,
                message: error.to_string(),
            },
        };
        self.is_loading = false;
        outcome
    }

    /// Sign in; on success the session cookie is held by the API adapter
    /// and the user is populated from a follow-up validation.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Outcome {
        self.is_loading = true;
        let outcome = self.sign_in_inner(email, password).await;
        self.is_loading = false;
        outcome
    }

    async fn sign_in_inner(&mut self, email: &str, password: &str) -> Outcome {
        match self.api.sign_in(email, password).await {
            Ok(response) if response.success => {
                self.refresh_user().await;
                Outcome {
                    success: true,
                    message: response.message,
                }
            }
            Ok(response) => Outcome {
                success: false,
                message: response.message,
            },
            Err(error) => Outcome {
                success: false,
                message: error.to_string(),
            },
        }
    }

    /// Ask the server whether the held session is still valid.
    ///
    /// Any failure reads as unauthenticated; the cached user is cleared.
    pub async fn validate(&mut self) -> bool {
        self.is_loading = true;
        self.refresh_user().await;
        self.is_loading = false;
        self.user.is_some()
    }

    async fn refresh_user(&mut self) {
        match self.api.validate_user().await {
            Ok(response) if response.is_authenticated => {
                self.user = response.user;
            }
            Ok(_) => {
                self.user = None;
            }
            Err(error) => {
                warn!(%error, "session validation failed");
                self.user = None;
            }
        }
    }

    /// Close the session and clear the cached user.
    pub async fn logout(&mut self) -> Outcome {
        self.is_loading = true;
        let outcome = match self.api.logout().await {
            Ok(response) if response.success => {
                self.user = None;
                Outcome {
                    success: true,
                    message: "Logged out".to_owned(),
                }
            }
            Ok(response) => Outcome {
                success: false,
                message: response
                    .error
                    .unwrap_or_else(|| "Error logging out".to_owned()),
            },
            Err(error) => Outcome {
                success: false,
                message: error.to_string(),
            },
        };
        self.is_loading = false;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        AuthResponse, LogoutResponse, MockServerApi, ValidateUserResponse,
    };

    fn user() -> User {
        User {
            id: "user-1".to_owned(),
            email: "ada@example.com".to_owned(),
        }
    }

    #[tokio::test]
    async fn sign_in_populates_the_user_on_success() {
        let mut api = MockServerApi::new();
        api.expect_sign_in().returning(|_, _| {
            Ok(AuthResponse {
                success: true,
                message: "Login successful".to_owned(),
            })
        });
        api.expect_validate_user().returning(|| {
            Ok(ValidateUserResponse {
                is_authenticated: true,
                user: Some(User {
                    id: "user-1".to_owned(),
                    email: "ada@example.com".to_owned(),
                }),
            })
        });
        let mut store = UserStore::new(Arc::new(api));

        let outcome = store.sign_in("ada@example.com", "correct horse").await;

        assert!(outcome.success);
        assert_eq!(store.user(), Some(&user()));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn failed_validation_clears_the_user() {
        let mut api = MockServerApi::new();
        api.expect_validate_user().returning(|| {
            Ok(ValidateUserResponse {
                is_authenticated: false,
                user: None,
            })
        });
        let mut store = UserStore::new(Arc::new(api));
        store.user = Some(user());

        assert!(!store.validate().await);
        assert!(store.user().is_none());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn logout_clears_the_user_on_success() {
        let mut api = MockServerApi::new();
        api.expect_logout().returning(|| {
            Ok(LogoutResponse {
                success: true,
                error: None,
            })
        });
        let mut store = UserStore::new(Arc::new(api));
        store.user = Some(user());

        let outcome = store.logout().await;

        assert!(outcome.success);
        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn rejected_logout_keeps_the_user() {
        let mut api = MockServerApi::new();
        api.expect_logout().returning(|| {
            Ok(LogoutResponse {
                success: false,
                error: Some("Not authorised".to_owned()),
            })
        });
        let mut store = UserStore::new(Arc::new(api));
        store.user = Some(user());

        let outcome = store.logout().await;

        assert!(!outcome.success);
        assert_eq!(outcome.message, "Not authorised");
    }
}
