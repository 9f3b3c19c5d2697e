use async_trait::async_trait;

use super::ApiResult;
use crate::models::{AuthResponse, LoginCredentials, RegisterData, User};

/// Authentication endpoints the session depends on.
/// Kept behind a trait so the session state machine can run against a fake.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthResponse>;

    async fn register(&self, data: &RegisterData) -> ApiResult<AuthResponse>;

    /// Validate the cached token by fetching the profile it belongs to
    async fn current_user(&self) -> ApiResult<User>;
}
