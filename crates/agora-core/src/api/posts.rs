//! Posts, feeds, votes and comments.

use serde_json::json;

use super::Api;
use super::types::{Comment, NewPost, Page, Post, PostUpdate, VoteAction};
use crate::client::{ApiRequest, ApiResult};

/// Which listing endpoint a feed comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedKind {
    /// `posts/`: everything, optionally filtered
    #[default]
    All,
    /// `posts/home_feed/`: posts from joined communities and followed users
    Home,
    /// `posts/saved/`
    Saved,
}

impl FeedKind {
    fn path(self) -> &'static str {
        match self {
            FeedKind::All => "posts/",
            FeedKind::Home => "posts/home_feed/",
            FeedKind::Saved => "posts/saved/",
        }
    }
}

/// Filters for a feed listing.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub feed: FeedKind,
    pub page: Option<u32>,
    pub community: Option<String>,
    pub author: Option<String>,
    pub search: Option<String>,
}

impl PostQuery {
    fn into_request(self) -> ApiRequest {
        ApiRequest::get(self.feed.path())
            .query_opt("page", self.page)
            .query_opt("search", self.search)
            .query_opt("community__name", self.community)
            .query_opt("author__username", self.author)
    }
}

impl Api {
    /// Lists posts for a feed.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn posts(&self, query: PostQuery) -> ApiResult<Page<Post>> {
        self.client.send_json(query.into_request()).await
    }

    /// Posts from joined communities and followed users.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn home_feed(&self, page: Option<u32>) -> ApiResult<Page<Post>> {
        self.posts(PostQuery {
            feed: FeedKind::Home,
            page,
            ..PostQuery::default()
        })
        .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn saved(&self, page: Option<u32>) -> ApiResult<Page<Post>> {
        self.posts(PostQuery {
            feed: FeedKind::Saved,
            page,
            ..PostQuery::default()
        })
        .await
    }

    /// Full-text post search over titles and bodies.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn search_posts(&self, query: &str, page: Option<u32>) -> ApiResult<Page<Post>> {
        self.posts(PostQuery {
            page,
            search: Some(query.to_string()),
            ..PostQuery::default()
        })
        .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn post(&self, id: u64) -> ApiResult<Post> {
        self.client
            .send_json(ApiRequest::get(format!("posts/{id}/")))
            .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn create_post(&self, post: &NewPost) -> ApiResult<Post> {
        let request = ApiRequest::post("posts/").json(post)?;
        self.client.send_json(request).await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn update_post(&self, id: u64, update: &PostUpdate) -> ApiResult<Post> {
        let request = ApiRequest::patch(format!("posts/{id}/")).json(update)?;
        self.client.send_json(request).await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn delete_post(&self, id: u64) -> ApiResult<()> {
        self.send_unit(ApiRequest::delete(format!("posts/{id}/")))
            .await
    }

    /// Casts (or toggles off) a vote.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn vote(&self, id: u64, action: VoteAction) -> ApiResult<()> {
        self.send_unit(ApiRequest::post(format!(
            "posts/{id}/{}/",
            action.as_str()
        )))
        .await
    }

    /// Toggles the saved flag on a post.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn toggle_save(&self, id: u64) -> ApiResult<()> {
        self.send_unit(ApiRequest::post(format!("posts/{id}/save/")))
            .await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn comments(&self, post_id: u64, page: Option<u32>) -> ApiResult<Page<Comment>> {
        let request = ApiRequest::get(format!("posts/{post_id}/comments/")).query_opt("page", page);
        self.client.send_json(request).await
    }

    /// # Errors
    /// Returns the API error.
    pub async fn create_comment(&self, post_id: u64, content: &str) -> ApiResult<Comment> {
        let request = ApiRequest::post(format!("posts/{post_id}/comments/"))
            .json(&json!({ "content": content }))?;
        self.client.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_paths() {
        assert_eq!(FeedKind::All.path(), "posts/");
        assert_eq!(FeedKind::Home.path(), "posts/home_feed/");
        assert_eq!(FeedKind::Saved.path(), "posts/saved/");
    }

    #[test]
    fn test_query_uses_backend_filter_names() {
        let request = PostQuery {
            feed: FeedKind::All,
            page: Some(2),
            community: Some("rust".into()),
            author: None,
            search: None,
        }
        .into_request();

        assert_eq!(request.path(), "posts/");
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("community__name".to_string(), "rust".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_is_sent_as_query_param() {
        let request = PostQuery {
            search: Some("borrow".into()),
            ..PostQuery::default()
        }
        .into_request();

        assert_eq!(
            request.query,
            vec![("search".to_string(), "borrow".to_string())]
        );
    }
}
