//! Application state - shared across all handlers.

use std::sync::Arc;

use tollgate_core::auth::{SessionPorts, SessionService};
use tollgate_core::domain::{ADMIN_ROLE, USER_ROLE};
use tollgate_core::error::RepoError;
use tollgate_core::ports::{
    Notifier, RecoveryTokenRepository, RoleRepository, SystemClock, UserRepository,
};
use tollgate_infra::{Argon2PasswordService, InMemoryStore, JwtTokenCodec, LogNotifier};

use crate::config::{AppConfig, CookieConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub cookies: CookieConfig,
}

/// The three stores the session service needs, backed by one database or one in-memory store.
struct Stores {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    recovery_tokens: Arc<dyn RecoveryTokenRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            roles: store.clone(),
            recovery_tokens: store,
        }
    }

    #[cfg(feature = "postgres")]
    async fn postgres(config: &tollgate_infra::DatabaseConfig) -> Result<Self, RepoError> {
        use tollgate_infra::database::{connect, schema};
        use tollgate_infra::{
            PostgresRecoveryTokenRepository, PostgresRoleRepository, PostgresUserRepository,
        };

        let db = connect(config)
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;
        schema::create_tables(&db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            roles: Arc::new(PostgresRoleRepository::new(db.clone())),
            recovery_tokens: Arc::new(PostgresRecoveryTokenRepository::new(db)),
        })
    }

    async fn from_config(config: &AppConfig) -> Result<Self, RepoError> {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                return Self::postgres(db_config).await;
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            if config.database.is_some() {
                tracing::warn!("DATABASE_URL is set but the postgres feature is disabled");
            }
        }

        tracing::warn!("Running without database (in-memory mode). Data is lost on restart.");
        Ok(Self::in_memory())
    }
}

fn notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    match &config.notifier_webhook_url {
        #[cfg(feature = "webhook")]
        Some(url) => {
            tracing::info!("Webhook notifier configured");
            Arc::new(tollgate_infra::WebhookNotifier::new(url.clone()))
        }
        #[cfg(not(feature = "webhook"))]
        Some(_) => {
            tracing::warn!("NOTIFIER_WEBHOOK_URL is set but the webhook feature is disabled");
            Arc::new(LogNotifier)
        }
        None => Arc::new(LogNotifier),
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, RepoError> {
        let stores = Stores::from_config(config).await?;

        for role in [ADMIN_ROLE, USER_ROLE] {
            stores.roles.ensure(role).await?;
        }

        let clock = Arc::new(SystemClock);
        let sessions = SessionService::new(
            SessionPorts {
                users: stores.users,
                roles: stores.roles,
                recovery_tokens: stores.recovery_tokens,
                codec: Arc::new(JwtTokenCodec::new(&config.jwt, clock.clone())),
                passwords: Arc::new(Argon2PasswordService::new()),
                notifier: notifier(config),
                clock,
            },
            config.auth.clone(),
        );

        tracing::info!("Application state initialized");

        Ok(Self {
            sessions: Arc::new(sessions),
            cookies: config.cookie.clone(),
        })
    }
}
