//! Authentication stub service
//!
//! Hardcoded demo accounts with an artificial login delay, persisting the
//! session token (one-hour TTL) and user profile through the storage
//! facade. Constructed explicitly and passed where needed; there is no
//! module-level singleton, so tests get isolated instances.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;

use crate::domain::{AuthUser, Credentials, DomainError, SessionToken, UserRole};

use super::facade::AppStorage;

/// One hardcoded demo account
#[derive(Debug, Clone)]
struct DemoAccount {
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: UserRole,
}

const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        email: "amara@asante.app",
        password: "ubuntu123",
        name: "Amara Okafor",
        role: UserRole::Member,
    },
    DemoAccount {
        email: "admin@asante.app",
        password: "admin123",
        name: "Asante Admin",
        role: UserRole::Admin,
    },
];

/// Authentication service stub
#[derive(Debug)]
pub struct AuthService {
    storage: Arc<AppStorage>,
    /// Simulated network latency; zero it in tests
    login_delay: Duration,
}

impl AuthService {
    pub fn new(storage: Arc<AppStorage>) -> Self {
        Self {
            storage,
            login_delay: Duration::from_millis(800),
        }
    }

    /// Overrides the simulated latency
    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    /// Checks credentials against the demo accounts and, on success,
    /// persists the session token and profile
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthUser, DomainError> {
        sleep(self.login_delay).await;

        let account = DEMO_ACCOUNTS
            .iter()
            .find(|a| a.email == credentials.email && a.password == credentials.password)
            .ok_or_else(|| DomainError::auth("invalid email or password"))?;

        let user = AuthUser {
            id: format!("user-{}", account.email.split('@').next().unwrap_or("demo")),
            email: account.email.to_string(),
            name: account.name.to_string(),
            role: account.role,
        };

        let token = SessionToken(Uuid::new_v4().to_string());

        self.storage.set_auth_token(&token).await;
        self.storage.set_user_profile(&user).await;

        info!(email = %user.email, "user signed in");
        Ok(user)
    }

    /// Clears the stored token and profile
    pub async fn logout(&self) {
        self.storage.clear_auth_token().await;
        self.storage.clear_user_profile().await;
        info!("user signed out");
    }

    /// The signed-in user, while the session token is still live
    ///
    /// A token past its TTL reads back as absent, so the profile is not
    /// returned even though it may still be stored.
    pub async fn current_user(&self) -> Option<AuthUser> {
        self.storage.auth_token().await?;
        self.storage.user_profile().await
    }

    /// Whether a live session token exists
    pub async fn is_authenticated(&self) -> bool {
        self.storage.auth_token().await.is_some()
    }
}
