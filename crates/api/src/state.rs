//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::{
    auth::{AuthService, AuthState, PgRefreshTokenStore, PgUserStore},
    config::Config,
    projects::{PgProjectRepository, ProjectService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: PgPool,
    pub auth: Arc<AuthService>,
    pub projects: Arc<ProjectService>,
}

impl AppState {
    /// Wire the Postgres-backed stores behind the auth and project services
    pub fn new(config: Config, pool: PgPool) -> Self {
        let auth = AuthService::new(
            &config.auth(),
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgRefreshTokenStore::new(pool.clone())),
        );
        let projects = ProjectService::new(
            Arc::new(PgProjectRepository::new(pool.clone())),
            Duration::from_secs(config.project_cache_ttl_secs),
        );

        Self {
            config: Arc::new(config),
            pool,
            auth: Arc::new(auth),
            projects: Arc::new(projects),
        }
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState {
            auth: self.auth.clone(),
        }
    }
}

/// State over in-memory stores, for router tests
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    test_state_with_tokens(Arc::new(
        crate::auth::memory::MemoryRefreshTokenStore::default(),
    ))
}

/// Test state over a caller-held refresh token store
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn test_state_with_tokens(
    tokens: Arc<crate::auth::memory::MemoryRefreshTokenStore>,
) -> AppState {
    use crate::auth::memory::MemoryUserStore;
    use crate::auth::PasswordScheme;
    use crate::config::{LogFormat, RefreshCookieConfig};
    use crate::projects::memory::MemoryProjectRepository;

    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        request_timeout_secs: 10,
        log_format: LogFormat::Pretty,
        database_url: "postgres://localhost/unused".to_string(),
        database_max_connections: 1,
        jwt_secret: "test-jwt-secret-must-be-at-least-32-characters-long".to_string(),
        password_salt: "pepper".to_string(),
        password_scheme: PasswordScheme::SaltedSha256,
        access_token_ttl_secs: 3600,
        refresh_token_ttl_secs: 7200,
        refresh_cookie: RefreshCookieConfig {
            name: "refresh-token".to_string(),
            path: "/api/v1/auth".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            max_age_secs: 7200,
        },
        project_cache_ttl_secs: 3600,
    };

    // Never connects unless a handler touches the database
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .unwrap();

    let auth = AuthService::new(
        &config.auth(),
        Arc::new(MemoryUserStore::default()),
        tokens,
    );
    let projects = ProjectService::new(
        Arc::new(MemoryProjectRepository::default()),
        Duration::from_secs(config.project_cache_ttl_secs),
    );

    AppState {
        config: Arc::new(config),
        pool,
        auth: Arc::new(auth),
        projects: Arc::new(projects),
    }
}
