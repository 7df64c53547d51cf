//! Application state over the in-memory store, for handler tests.

use std::sync::Arc;

use tollgate_core::auth::{AuthConfig, SessionPorts, SessionService};
use tollgate_core::domain::{ADMIN_ROLE, NewUser, USER_ROLE, User};
use tollgate_core::ports::{PasswordService, RoleRepository, SystemClock, UserRepository};
use tollgate_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenCodec, LogNotifier};

use crate::config::CookieConfig;
use crate::state::AppState;

pub const ADMIN_PASSWORD: &str = "correct-pw";
pub const USER_PASSWORD: &str = "bea-password";

pub struct TestApp {
    pub state: AppState,
    pub admin: User,
    pub regular: User,
}

pub async fn test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let passwords = Arc::new(Argon2PasswordService::new());
    let clock = Arc::new(SystemClock);

    let admin_role = store.ensure(ADMIN_ROLE).await.unwrap();
    let user_role = store.ensure(USER_ROLE).await.unwrap();

    let admin = seed(&store, passwords.as_ref(), "admin", ADMIN_PASSWORD, admin_role.id).await;
    let regular = seed(&store, passwords.as_ref(), "bea", USER_PASSWORD, user_role.id).await;

    let auth = AuthConfig::default();
    let cookies = CookieConfig {
        name: "refresh_token".to_string(),
        domain: None,
        secure: true,
        max_age_seconds: auth.refresh_token_ttl_seconds(),
    };

    let sessions = SessionService::new(
        SessionPorts {
            users: store.clone(),
            roles: store.clone(),
            recovery_tokens: store,
            codec: Arc::new(JwtTokenCodec::new(
                &JwtConfig::new("handler-test-secret", "HS256").unwrap(),
                clock.clone(),
            )),
            passwords,
            notifier: Arc::new(LogNotifier),
            clock,
        },
        auth,
    );

    TestApp {
        state: AppState {
            sessions: Arc::new(sessions),
            cookies,
        },
        admin,
        regular,
    }
}

async fn seed(
    store: &InMemoryStore,
    passwords: &dyn PasswordService,
    username: &str,
    password: &str,
    role_id: i64,
) -> User {
    let user = UserRepository::create(
        store,
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: passwords.hash(password).unwrap(),
        },
    )
    .await
    .unwrap();
    store.assign_role(user.id, role_id).await.unwrap()
}
