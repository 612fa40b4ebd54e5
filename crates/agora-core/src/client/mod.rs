//! Authenticated HTTP client for the platform API.
//!
//! Every outbound call goes through [`ApiClient::send`], which attaches the
//! session's bearer token and recovers from an expired access token:
//!
//! 1. A 401 on a request that has not been retried joins the refresh cycle.
//! 2. The first such request leads the cycle and calls `auth/token/refresh/`;
//!    later ones queue behind it.
//! 3. On success every request is resent once with the new token. On
//!    failure they all fail with the same error and the session is cleared.
//!
//! A request is resent at most once, so a second 401 is returned as-is.

mod error;
pub mod refresh;
mod request;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use refresh::RefreshCoordinator;
pub use request::{ApiRequest, ApiResponse, RequestBody, join_url, path_segment};

use self::refresh::{RefreshLease, Ticket};
use crate::api::types::RefreshedToken;
use crate::auth::AuthState;
use crate::config::Config;

/// Standard User-Agent header for agora API requests.
pub const AGORA_USER_AGENT: &str = concat!("agora/", env!("CARGO_PKG_VERSION"));

/// Path of the token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "auth/token/refresh/";

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Option<Duration>,
    pub refresh_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: None,
            refresh_timeout: None,
        }
    }

    /// Builds client settings from the loaded config (env overrides applied).
    ///
    /// # Errors
    /// Returns an error if the effective base URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: config.effective_api_url()?,
            request_timeout: config.request_timeout(),
            refresh_timeout: config.refresh_timeout(),
        })
    }
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    refresh_timeout: Option<Duration>,
    auth: Arc<AuthState>,
    refresh: RefreshCoordinator,
}

/// Cheap to clone; clones share the session and the refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Creates a client bound to `auth`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, auth: Arc<AuthState>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(AGORA_USER_AGENT);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.base_url,
                refresh_timeout: config.refresh_timeout,
                auth,
                refresh: RefreshCoordinator::new(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn auth(&self) -> &Arc<AuthState> {
        &self.inner.auth
    }

    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.inner.refresh
    }

    /// Sends `request`, refreshing the access token and resending once on 401.
    ///
    /// # Errors
    /// Transport failures and non-2xx responses are returned unchanged;
    /// a failed refresh yields [`ApiErrorKind::RefreshFailed`].
    pub async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let sent_with = self.bearer_for(&request);
        let response = self.dispatch(&request, sent_with.as_deref()).await?;
        if response.status != 401 || request.retried || request.anonymous {
            return response.into_result();
        }
        self.recover(request, sent_with, response).await
    }

    /// Sends `request` and decodes a JSON response body.
    ///
    /// # Errors
    /// See [`ApiClient::send`]; also fails if the body does not decode.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        self.send(request).await?.json()
    }

    async fn recover(
        &self,
        mut request: ApiRequest,
        sent_with: Option<String>,
        unauthorized: ApiResponse,
    ) -> ApiResult<ApiResponse> {
        request.retried = true;

        // A cycle that finished after this request went out already
        // produced a newer token; resend with it instead of refreshing again.
        if let Some(current) = self.inner.auth.access_token()
            && sent_with.as_deref() != Some(current.as_str())
            && !self.inner.refresh.is_refreshing()
        {
            debug!(path = %request.path, "token changed since send, resending");
            return self.dispatch(&request, Some(&current)).await?.into_result();
        }

        let token = match self.inner.refresh.join() {
            Ticket::Wait(waiter) => {
                debug!(path = %request.path, "refresh in flight, queueing request");
                waiter.wait().await?
            }
            Ticket::Lead(lease) => self.run_refresh(lease, unauthorized).await?,
        };

        self.dispatch(&request, Some(&token)).await?.into_result()
    }

    async fn run_refresh(
        &self,
        lease: RefreshLease<'_>,
        unauthorized: ApiResponse,
    ) -> ApiResult<String> {
        let Some(refresh_token) = self.inner.auth.refresh_token() else {
            let err = unauthorized.into_error();
            let released = lease.release(Err(err.clone()));
            warn!(released, "access token rejected and no refresh token; clearing session");
            self.clear_session();
            return Err(err);
        };

        info!("access token rejected; refreshing");
        match self.request_new_access_token(&refresh_token).await {
            Ok(access) => {
                if let Err(e) = self.inner.auth.set_access_token(&access) {
                    warn!(error = %format!("{e:#}"), "failed to persist refreshed access token");
                }
                let released = lease.release(Ok(access.clone()));
                info!(released, "token refresh succeeded");
                Ok(access)
            }
            Err(cause) => {
                let err = ApiError::refresh_failed(&cause);
                let released = lease.release(Err(err.clone()));
                warn!(released, error = %err, "token refresh failed; clearing session");
                self.clear_session();
                Err(err)
            }
        }
    }

    /// Calls the refresh endpoint directly, bypassing 401 handling.
    async fn request_new_access_token(&self, refresh_token: &str) -> ApiResult<String> {
        let url = join_url(&self.inner.base_url, REFRESH_PATH);
        let mut builder = self
            .inner
            .http
            .post(&url)
            .json(&serde_json::json!({ "refresh": refresh_token }));
        if let Some(timeout) = self.inner.refresh_timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| ApiError::transport(&e))?;
        let response = buffer(response).await?.into_result()?;
        let refreshed: RefreshedToken = response.json()?;
        Ok(refreshed.access)
    }

    fn bearer_for(&self, request: &ApiRequest) -> Option<String> {
        if request.anonymous {
            return None;
        }
        self.inner.auth.access_token()
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<ApiResponse> {
        let url = join_url(&self.inner.base_url, &request.path);
        let mut builder = self.inner.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::File {
                field,
                file_name,
                mime,
                bytes,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(|e| ApiError::parse(format!("Invalid upload mime type: {e}")))?;
                builder.multipart(reqwest::multipart::Form::new().part(field.clone(), part))
            }
        };

        let response = builder.send().await.map_err(|e| {
            debug!(method = %request.method, path = %request.path, error = %e, "request failed");
            ApiError::transport(&e)
        })?;
        let response = buffer(response).await?;
        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            retried = request.retried,
            "request completed"
        );
        Ok(response)
    }

    fn clear_session(&self) {
        if let Err(e) = self.inner.auth.logout() {
            warn!(error = %format!("{e:#}"), "failed to clear persisted session");
        }
    }
}

async fn buffer(response: reqwest::Response) -> ApiResult<ApiResponse> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::transport(&e))?
        .to_vec();
    Ok(ApiResponse { status, body })
}
