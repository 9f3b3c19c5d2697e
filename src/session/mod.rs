//! Signed-in state: restoring a cached session, login/register/logout, and
//! the access checks applied before agent-only commands run.

mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiResult, AuthApi};
use crate::models::{LoginCredentials, RegisterData, User};
use crate::notify::{Notice, Notifier};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Cached credentials have not been checked yet
    Loading,
    Anonymous,
    Authenticated(User),
}

/// What a screen or command requires of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    /// Agent or admin
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Session still loading; nothing to decide yet
    Wait,
    RedirectToLogin,
    RedirectHome,
}

pub struct AuthSession {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    state: AuthState,
}

impl AuthSession {
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            state: AuthState::Loading,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn is_agent(&self) -> bool {
        self.user().map(User::is_agent).unwrap_or(false)
    }

    /// Restore the cached session. The cached token is checked against the
    /// server; a rejected token leaves no cached credentials behind.
    pub async fn bootstrap(&mut self) -> &AuthState {
        let cached = self.store.user().zip(self.store.token());
        if cached.is_none() {
            debug!("No cached session");
            self.state = AuthState::Anonymous;
            return &self.state;
        }

        let result = self.api.current_user().await;
        match result {
            Ok(user) => {
                if let Err(e) = self.store.save_user(&user) {
                    warn!("Failed to refresh cached user: {:#}", e);
                }
                info!("Restored session for {}", user.email);
                self.state = AuthState::Authenticated(user);
            }
            Err(e) => {
                info!("Cached session is no longer valid: {}", e);
                self.clear_cache();
                self.state = AuthState::Anonymous;
            }
        }
        &self.state
    }

    pub async fn login(&mut self, credentials: &LoginCredentials) -> ApiResult<User> {
        let result = self.api.login(credentials).await;
        match result {
            Ok(response) => {
                let user = response.user;
                self.persist(response.token.as_deref(), &user);
                self.notifier.notify(Notice::success(
                    "Welcome back!",
                    format!("Logged in as {}", user.full_name()),
                ));
                self.state = AuthState::Authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                self.notifier.notify(Notice::failure(
                    "Login failed",
                    &e,
                    "Invalid email or password",
                ));
                Err(e)
            }
        }
    }

    pub async fn register(&mut self, data: &RegisterData) -> ApiResult<User> {
        let result = self.api.register(data).await;
        match result {
            Ok(response) => {
                let user = response.user;
                self.persist(response.token.as_deref(), &user);
                self.notifier.notify(Notice::success(
                    "Account created!",
                    format!("Welcome, {}!", user.first_name),
                ));
                self.state = AuthState::Authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                self.notifier.notify(Notice::failure(
                    "Registration failed",
                    &e,
                    "An error occurred during registration",
                ));
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        self.clear_cache();
        self.state = AuthState::Anonymous;
        self.notifier.notify(Notice::success(
            "Logged out",
            "You have been successfully logged out",
        ));
    }

    pub fn guard(&self, access: Access) -> GuardDecision {
        match (access, &self.state) {
            (Access::Public, _) => GuardDecision::Allow,
            (_, AuthState::Loading) => GuardDecision::Wait,
            (_, AuthState::Anonymous) => GuardDecision::RedirectToLogin,
            (Access::Authenticated, AuthState::Authenticated(_)) => GuardDecision::Allow,
            (Access::Agent, AuthState::Authenticated(user)) if user.is_agent() => {
                GuardDecision::Allow
            }
            (Access::Agent, AuthState::Authenticated(_)) => GuardDecision::RedirectHome,
        }
    }

    fn persist(&self, token: Option<&str>, user: &User) {
        let Some(token) = token else {
            return;
        };
        if let Err(e) = self.store.save(token, user) {
            warn!("Failed to cache session: {:#}", e);
        }
    }

    fn clear_cache(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear cached session: {:#}", e);
        }
    }
}

#[cfg(test)]
pub(crate) fn test_user(role: &str) -> User {
    use chrono::TimeZone;

    User {
        id: format!("u-{role}"),
        email: format!("{role}@example.com"),
        first_name: "Alex".into(),
        last_name: "Morgan".into(),
        phone: None,
        role: role.parse().unwrap(),
        avatar_url: None,
        created_at: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}
