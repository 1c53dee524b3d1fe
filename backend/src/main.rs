//! Backend entry-point: wires REST endpoints, persistence, and OpenAPI docs.

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroize;

use backend::api::health::HealthState;
use backend::outbound::persistence::DbPool;
use backend::server::{ServerConfig, create_server};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Load the session signing key from `SESSION_KEY_FILE`.
///
/// Falls back to an ephemeral key in debug builds or when
/// `SESSION_ALLOW_EPHEMERAL=1`; release builds without a key file refuse to
/// start rather than silently invalidating sessions on every restart.
fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(mut bytes) => {
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn bind_addr() -> std::io::Result<SocketAddr> {
    let raw = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
    raw.parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR {raw}: {e}")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let mut config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr()?);
    match env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = DbPool::new(&url)
                .await
                .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
            config = config.with_db_pool(pool);
        }
        Err(_) => {
            warn!("DATABASE_URL not set; using in-memory repositories");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!("server started");
    server.await
}
