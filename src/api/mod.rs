//! Typed client for the brokerage REST API

mod appointments;
mod auth;
mod error;
mod inquiries;
mod properties;
mod traits;

pub use error::{ApiError, ApiResult};
pub use properties::ImageFile;
pub use traits::AuthApi;

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::session::SessionStore;

/// HTTP client wrapper. Attaches the cached bearer token to every request
/// and drops the cached session when the server answers 401.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    asset_origin: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<dyn SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("estate-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            asset_origin: config.asset_origin().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Resolve a stored image path against the server origin.
    pub fn image_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.asset_origin, path)
        } else {
            format!("{}/{}", self.asset_origin, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON reply.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send_raw(request).await?;
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Unexpected(format!("Failed to decode response: {e}")))
    }

    /// Send and discard whatever the server replies with.
    async fn send_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        self.send_raw(request).await.map(|_| ())
    }

    async fn send_raw(&self, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        warn!("API returned status: {}", status);
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
        }
        Err(ApiError::from_body(status.as_u16(), &body))
    }

    fn expire_session(&self) {
        warn!("Session rejected by the server; log in again to continue");
        if let Err(e) = self.session.clear() {
            warn!("Failed to clear cached session: {:#}", e);
        }
    }
}

/// In-process stub of the REST API used by the client tests.
#[cfg(test)]
pub(crate) mod stub {
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use tokio::net::TcpListener;

    use super::ApiClient;
    use crate::config::Config;
    use crate::session::{MemorySessionStore, SessionStore};

    /// Headers and bodies the stub saw, for assertions
    #[derive(Clone, Default)]
    pub struct Seen(pub Arc<Mutex<Vec<String>>>);

    impl Seen {
        pub fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        pub fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    /// Serve `router` under `/api` on an ephemeral port and return a client
    /// pointed at it.
    pub async fn serve(router: Router, store: Arc<MemorySessionStore>) -> ApiClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().nest("/api", router);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = Config {
            api_url: format!("http://{addr}/api"),
            ..Config::default()
        };
        let store: Arc<dyn SessionStore> = store;
        ApiClient::new(&config, store).unwrap()
    }
}
