//! Typed wrappers over the platform REST endpoints.
//!
//! Each method builds an [`ApiRequest`] and sends it through the shared
//! [`ApiClient`], so every call gets the same token handling.

mod account;
mod communities;
mod posts;
mod social;
pub mod types;

use std::sync::Arc;

use crate::auth::AuthState;
use crate::client::{ApiClient, ApiRequest, ApiResult};

pub use account::image_mime_for;
pub use posts::{FeedKind, PostQuery};

/// Endpoint facade over an [`ApiClient`].
#[derive(Clone)]
pub struct Api {
    client: ApiClient,
}

impl Api {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &Arc<AuthState> {
        self.client.auth()
    }

    /// Sends a request whose response body is irrelevant.
    async fn send_unit(&self, request: ApiRequest) -> ApiResult<()> {
        self.client.send(request).await.map(|_| ())
    }
}
