//! Login, registration, profile and image upload.

use std::path::Path;

use serde_json::json;
use tracing::warn;

use super::Api;
use super::types::{AuthTokens, Profile, ProfileUpdate, UploadedImage, User};
use crate::client::{ApiError, ApiRequest, ApiResult};

impl Api {
    /// Exchanges credentials for a token pair and starts a session.
    ///
    /// # Errors
    /// Returns the API error; a 401 here means bad credentials. Fails with
    /// [`ApiErrorKind::Storage`](crate::client::ApiErrorKind::Storage) if the
    /// tokens cannot be saved.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthTokens> {
        let request = ApiRequest::post("auth/token/")
            .anonymous()
            .json(&json!({ "username": username, "password": password }))?;
        let tokens: AuthTokens = self.client.send_json(request).await?;
        self.store_session(&tokens)?;
        Ok(tokens)
    }

    /// Creates an account and starts a session with the returned tokens.
    ///
    /// # Errors
    /// Returns a validation error when the username or email is taken, or a
    /// storage error if the tokens cannot be saved.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<AuthTokens> {
        let request = ApiRequest::post("auth/register/").anonymous().json(&json!({
            "username": username,
            "email": email,
            "password": password,
        }))?;
        let tokens: AuthTokens = self.client.send_json(request).await?;
        self.store_session(&tokens)?;
        Ok(tokens)
    }

    /// Fetches the signed-in user and caches it in the session.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn current_user(&self) -> ApiResult<User> {
        let user: User = self
            .client
            .send_json(ApiRequest::get("auth/profile/"))
            .await?;
        self.auth().set_user(Some(user.clone()));
        Ok(user)
    }

    /// Fetches the editable profile of the signed-in user.
    ///
    /// The endpoint returns the user record; the profile fields are taken
    /// from its `profile` object, or from the top level if it is flat.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn profile(&self) -> ApiResult<Profile> {
        let value: serde_json::Value = self
            .client
            .send_json(ApiRequest::get("auth/profile/"))
            .await?;
        profile_from_value(value)
    }

    /// Updates bio and/or avatar and mirrors the change into the session.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Profile> {
        let request = ApiRequest::patch("auth/profile/").json(update)?;
        let value: serde_json::Value = self.client.send_json(request).await?;
        let profile = profile_from_value(value)?;
        self.auth().update_user_profile(profile.clone());
        Ok(profile)
    }

    /// Uploads an image and returns its public URL.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn upload_image(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<UploadedImage> {
        let request = ApiRequest::post("upload-image/").file("file", file_name, mime, bytes);
        self.client.send_json(request).await
    }

    fn store_session(&self, tokens: &AuthTokens) -> ApiResult<()> {
        self.auth()
            .set_auth(&tokens.access, &tokens.refresh, tokens.user.clone())
            .map_err(|e| {
                warn!(error = %format!("{e:#}"), "failed to persist session tokens");
                ApiError::storage(&e)
            })
    }
}

fn profile_from_value(value: serde_json::Value) -> ApiResult<Profile> {
    let source = match value.get("profile") {
        Some(profile) if profile.is_object() => profile.clone(),
        _ => value,
    };
    serde_json::from_value(source)
        .map_err(|e| ApiError::parse(format!("Failed to parse profile: {e}")))
}

/// Guesses an upload mime type from the file extension.
pub fn image_mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
