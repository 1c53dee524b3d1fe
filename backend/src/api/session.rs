//! Session cookie helpers keeping handlers free of framework specifics.
//!
//! The cookie holds exactly one value: the opaque session token. All
//! interpretation of that token happens in the domain session authority;
//! this wrapper only moves it in and out of the Actix session.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, SessionId};

pub(crate) const SESSION_ID_KEY: &str = "session_id";

/// Newtype wrapper exposing higher-level session cookie operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the opaque session token in the cookie.
    pub fn persist_token(&self, token: &SessionId) -> Result<(), Error> {
        self.0
            .insert(SESSION_ID_KEY, token.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the session token from the cookie, if present.
    ///
    /// A token that fails shape validation is treated the same as an absent
    /// one; a tampered cookie must read as unauthenticated, not as an error.
    pub fn token(&self) -> Result<Option<SessionId>, Error> {
        let raw = self
            .0
            .get::<String>(SESSION_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match raw {
            Some(raw) => match SessionId::new(raw) {
                Ok(token) => Ok(Some(token)),
                Err(error) => {
                    tracing::warn!("malformed session token in cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Drop all session state, blanking the cookie on the next response.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::api::error::ApiError;
    use crate::api::test_utils::test_session_middleware;

    #[actix_web::test]
    async fn round_trips_the_session_token() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let token = SessionId::new("a".repeat(40)).expect("fixture token");
                        session.persist_token(&token)?;
                        Ok::<_, ApiError>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let token = session.token()?;
                        Ok::<_, ApiError>(
                            HttpResponse::Ok()
                                .body(token.map(|t| t.as_str().to_owned()).unwrap_or_default()),
                        )
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let get_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, "a".repeat(40).as_bytes());
    }

    #[actix_web::test]
    async fn tampered_token_reads_as_absent() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(SESSION_ID_KEY, "has whitespace")
                            .expect("set invalid token");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let token = session.token()?;
                        Ok::<_, ApiError>(HttpResponse::Ok().body(if token.is_some() {
                            "present"
                        } else {
                            "absent"
                        }))
                    }),
                ),
        )
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        let body = test::read_body(res).await;
        assert_eq!(body, "absent".as_bytes());
    }
}
