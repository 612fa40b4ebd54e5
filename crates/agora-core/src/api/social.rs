//! Users, following, notifications and search.

use super::Api;
use super::types::{Notification, Page, Suggestions, UserDetails};
use crate::client::{ApiRequest, ApiResult, path_segment};

impl Api {
    /// # Errors
    /// Returns the API error.
    pub async fn user(&self, username: &str) -> ApiResult<UserDetails> {
        self.client
            .send_json(ApiRequest::get(format!("users/{}/", path_segment(username))))
            .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn follow(&self, username: &str) -> ApiResult<()> {
        self.send_unit(ApiRequest::post(format!("users/{}/follow/", path_segment(username))))
            .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn unfollow(&self, username: &str) -> ApiResult<()> {
        self.send_unit(ApiRequest::post(format!("users/{}/unfollow/", path_segment(username))))
            .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn notifications(&self) -> ApiResult<Page<Notification>> {
        self.client
            .send_json(ApiRequest::get("notifications/"))
            .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn mark_all_read(&self) -> ApiResult<()> {
        self.send_unit(ApiRequest::post("notifications/mark_all_as_read/"))
            .await
    }

    /// Search-as-you-type suggestions for posts, communities and users.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn suggestions(&self, query: &str) -> ApiResult<Suggestions> {
        self.client
            .send_json(ApiRequest::get("search/suggestions/").query("q", query))
            .await
    }
}
