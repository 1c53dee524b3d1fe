//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::api::auth::{logout, sign_in, sign_up, validate_user};
use crate::api::health::{HealthState, live, ready};
use crate::api::state::HttpState;
use crate::api::tasks::{create_task, delete_tasks, list_tasks, update_task};
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    MemorySessionRepository, MemoryTaskRepository, MemoryUserRepository, SessionRepository,
    TaskRepository, UserRepository,
};
use crate::domain::{AuthService, SESSION_TTL_DAYS, SessionAuthority};
use crate::middleware::Trace;
use crate::outbound::persistence::{
    DieselSessionRepository, DieselTaskRepository, DieselUserRepository,
};

/// Build handler state from configuration.
///
/// A configured pool selects the Diesel adapters; otherwise everything runs
/// against in-memory repositories.
fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let (users, sessions, tasks): (
        Arc<dyn UserRepository>,
        Arc<dyn SessionRepository>,
        Arc<dyn TaskRepository>,
    ) = match &config.db_pool {
        Some(pool) => (
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselSessionRepository::new(pool.clone())),
            Arc::new(DieselTaskRepository::new(pool.clone())),
        ),
        None => (
            Arc::new(MemoryUserRepository::default()),
            Arc::new(MemorySessionRepository::default()),
            Arc::new(MemoryTaskRepository::default()),
        ),
    };

    let authority = Arc::new(SessionAuthority::new(
        sessions,
        users.clone(),
        Arc::new(DefaultClock),
    ));
    let auth = Arc::new(AuthService::new(users));
    web::Data::new(HttpState::new(authority, auth, tasks))
}

/// Dependency bundle threaded through the app factory closure.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Assemble the Actix application: session middleware, trace ids, and all
/// REST endpoints.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            // Cookie lifetime tracks the server-side session TTL.
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::days(SESSION_TTL_DAYS)),
        )
        .build();

    let api = web::scope("/api")
        .wrap(session)
        .service(sign_up)
        .service(sign_in)
        .service(logout)
        .service(validate_user)
        .service(list_tasks)
        .service(create_task)
        .service(update_task)
        .service(delete_tasks);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
