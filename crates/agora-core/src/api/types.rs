//! Wire types for the platform REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile fields attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile: Profile,
}

/// Token pair returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Body returned by the refresh endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedToken {
    pub access: String,
}

/// Minimal avatar payload embedded in authors and members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarRef {
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Author of a post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub profile: Option<AvatarRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub is_member: Option<bool>,
    #[serde(default)]
    pub is_muted: Option<bool>,
}

/// The caller's vote on a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<i8>", into = "Option<i8>")]
pub enum Vote {
    Up,
    Down,
    #[default]
    None,
}

impl From<Option<i8>> for Vote {
    fn from(value: Option<i8>) -> Self {
        match value {
            Some(v) if v > 0 => Vote::Up,
            Some(v) if v < 0 => Vote::Down,
            _ => Vote::None,
        }
    }
}

impl From<Vote> for Option<i8> {
    fn from(value: Vote) -> Self {
        match value {
            Vote::Up => Some(1),
            Vote::Down => Some(-1),
            Vote::None => None,
        }
    }
}

/// Vote action sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Upvote,
    Downvote,
}

impl VoteAction {
    /// Path segment of the vote endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            VoteAction::Upvote => "upvote",
            VoteAction::Downvote => "downvote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub author: Author,
    pub community: Community,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub user_vote: Vote,
    #[serde(default)]
    pub is_saved: bool,
}

impl Post {
    /// Applies a vote action locally, mirroring what the server does.
    ///
    /// Repeating the current vote removes it, the opposite vote flips it
    /// (score moves by two) and a fresh vote moves the score by one.
    pub fn apply_vote(&mut self, action: VoteAction) {
        let (score, vote) = match (action, self.user_vote) {
            (VoteAction::Upvote, Vote::Up) => (self.score - 1, Vote::None),
            (VoteAction::Upvote, Vote::Down) => (self.score + 2, Vote::Up),
            (VoteAction::Upvote, Vote::None) => (self.score + 1, Vote::Up),
            (VoteAction::Downvote, Vote::Down) => (self.score + 1, Vote::None),
            (VoteAction::Downvote, Vote::Up) => (self.score - 2, Vote::Down),
            (VoteAction::Downvote, Vote::None) => (self.score - 1, Vote::Down),
        };
        self.score = score;
        self.user_vote = vote;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

/// Community member listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub profile: AvatarRef,
}

/// Public view of another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub is_following: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub actor: Actor,
    pub verb: String,
    #[serde(default)]
    pub target_id: Option<u64>,
    #[serde(default)]
    pub is_read: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSuggestion {
    pub id: u64,
    pub title: String,
    pub community_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunitySuggestion {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSuggestion {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Search-as-you-type suggestions grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    #[serde(default)]
    pub posts: Vec<PostSuggestion>,
    #[serde(default)]
    pub communities: Vec<CommunitySuggestion>,
    #[serde(default)]
    pub users: Vec<UserSuggestion>,
}

/// Result of an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Page number encoded in the `next` link, if there is one.
    pub fn next_page(&self) -> Option<u32> {
        let next = self.next.as_deref()?;
        let url = url::Url::parse(next).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    }
}

// Some endpoints paginate and some return a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Paginated {
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match PageRepr::deserialize(deserializer)? {
            PageRepr::Paginated {
                next,
                previous,
                results,
            } => Page {
                next,
                previous,
                results,
            },
            PageRepr::Bare(results) => Page {
                next: None,
                previous: None,
                results,
            },
        })
    }
}

/// Fields accepted by `PATCH auth/profile/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub community_id: u64,
}

/// Fields accepted by `PATCH posts/{id}/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCommunity {
    pub name: String,
    pub description: String,
}
