//! Communities and membership.

use super::Api;
use super::types::{Community, Member, NewCommunity, Page};
use crate::client::{ApiRequest, ApiResult, path_segment};

impl Api {
    /// Lists communities; `joined_only` restricts to the caller's memberships.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn communities(&self, joined_only: bool) -> ApiResult<Page<Community>> {
        let request =
            ApiRequest::get("communities/").query_opt("joined", joined_only.then_some("true"));
        self.client.send_json(request).await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn community(&self, name: &str) -> ApiResult<Community> {
        self.client
            .send_json(ApiRequest::get(format!("communities/{}/", path_segment(name))))
            .await
    }

    /// # Errors
    /// Returns a validation error when the name is taken.
    pub async fn create_community(&self, community: &NewCommunity) -> ApiResult<Community> {
        let request = ApiRequest::post("communities/").json(community)?;
        self.client.send_json(request).await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn join_community(&self, name: &str) -> ApiResult<()> {
        self.send_unit(ApiRequest::post(format!("communities/{}/join/", path_segment(name))))
            .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn leave_community(&self, name: &str) -> ApiResult<()> {
        self.send_unit(ApiRequest::post(format!("communities/{}/leave/", path_segment(name))))
            .await
    }

    /// Mute settings are keyed by community id, not name.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn toggle_mute(&self, community_id: u64) -> ApiResult<()> {
        self.send_unit(ApiRequest::post(format!(
            "communities/{community_id}/toggle_mute/"
        )))
        .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn toggle_notifications(&self, community_id: u64) -> ApiResult<()> {
        self.send_unit(ApiRequest::post(format!(
            "communities/{community_id}/toggle_notifications/"
        )))
        .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn members(&self, name: &str) -> ApiResult<Page<Member>> {
        self.client
            .send_json(ApiRequest::get(format!("communities/{}/members/", path_segment(name))))
            .await
    }
}
