use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use super::{ApiClient, ApiResult, AuthApi};
use crate::models::{AuthResponse, LoginCredentials, RegisterData, User};

#[derive(Deserialize)]
struct MeResponse {
    user: User,
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthResponse> {
        let request = self.request(Method::POST, "/auth/login").json(credentials);
        let response: AuthResponse = self.send(request).await?;
        info!("{} ({})", response.message, response.user.email);
        Ok(response)
    }

    async fn register(&self, data: &RegisterData) -> ApiResult<AuthResponse> {
        let request = self.request(Method::POST, "/auth/register").json(data);
        let response: AuthResponse = self.send(request).await?;
        info!("{}: {} ({})", response.message, response.user.email, response.user.role);
        Ok(response)
    }

    async fn current_user(&self) -> ApiResult<User> {
        let request = self.request(Method::GET, "/auth/me");
        let response: MeResponse = self.send(request).await?;
        Ok(response.user)
    }
}
