//! Endpoint wrappers against a mock backend.

use std::sync::Arc;

use agora_core::api::types::{NewCommunity, VoteAction};
use agora_core::api::{Api, FeedKind, PostQuery};
use agora_core::auth::{AuthState, TokenStore};
use agora_core::client::{ApiClient, ApiErrorKind, ClientConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer, auth: AuthState) -> Api {
    let config = ClientConfig::new(format!("{}/api", server.uri()));
    Api::new(ApiClient::new(config, Arc::new(auth)).unwrap())
}

fn signed_in(server: &MockServer) -> Api {
    let auth = AuthState::in_memory();
    auth.set_auth("T1", "R1", None).unwrap();
    api_for(server, auth)
}

fn post_json(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("post {id}"),
        "content": "body",
        "image_url": null,
        "author": {"id": 1, "username": "ana", "profile": {"avatar": null}},
        "community": {"id": 2, "name": "rust"},
        "created_at": "2024-05-01T10:00:00Z",
        "score": 4,
        "comment_count": 1,
        "user_vote": 1,
        "is_saved": false
    })
}

#[tokio::test]
async fn test_login_stores_tokens_without_auth_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/token/"))
        .and(body_json(json!({"username": "ana", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1",
            "user": {"id": 1, "username": "ana", "email": "ana@example.com", "profile": {"bio": null, "avatar": null}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // A stale token from a previous session must not leak into login.
    let auth = AuthState::in_memory();
    auth.set_access_token("stale").unwrap();
    let api = api_for(&server, auth);

    let tokens = api.login("ana", "pw").await.unwrap();
    assert_eq!(tokens.access, "A1");
    assert_eq!(api.auth().access_token().as_deref(), Some("A1"));
    assert_eq!(api.auth().refresh_token().as_deref(), Some("R1"));
    assert_eq!(api.auth().user().unwrap().username, "ana");

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_login_fails_when_tokens_cannot_be_saved() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1"
        })))
        .mount(&server)
        .await;

    // The token file's parent is a regular file, so every save fails.
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("home");
    std::fs::write(&blocker, "").unwrap();
    let store = TokenStore::open(blocker.join("auth-storage.json")).unwrap();
    let api = api_for(&server, AuthState::new(store));

    let err = api.login("ana", "pw").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Storage);
    assert!(!err.requires_login());
    assert!(!blocker.join("auth-storage.json").exists());
}

#[tokio::test]
async fn test_bad_credentials_do_not_trigger_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "X"})))
        .expect(0)
        .mount(&server)
        .await;

    let api = api_for(&server, AuthState::in_memory());
    let err = api.login("ana", "wrong").await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    assert!(err.message.contains("No active account"));
    assert!(!api.auth().is_authenticated());
}

#[tokio::test]
async fn test_home_feed_with_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts/home_feed/"))
        .and(query_param("page", "2"))
        .and(query_param("author__username", "ana"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": format!("{}/api/posts/home_feed/?page=3", server.uri()),
            "previous": null,
            "results": [post_json(1), post_json(2)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = signed_in(&server);
    let page = api
        .posts(PostQuery {
            feed: FeedKind::Home,
            page: Some(2),
            author: Some("ana".into()),
            ..PostQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(page.results.len(), 2);
    assert_eq!(page.next_page(), Some(3));
}

#[tokio::test]
async fn test_not_found_passes_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let api = signed_in(&server);
    let err = api.post(99).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::NotFound);
    assert_eq!(err.message, "HTTP 404: Not found.");
    assert_eq!(api.client().refresh_coordinator().cycles(), 0);
}

#[tokio::test]
async fn test_validation_errors_carry_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/communities/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": ["community with this name already exists."]
        })))
        .mount(&server)
        .await;

    let api = signed_in(&server);
    let err = api
        .create_community(&NewCommunity {
            name: "rust".into(),
            description: String::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Validation);
    assert_eq!(
        err.fields.get("name").unwrap(),
        &vec!["community with this name already exists.".to_string()]
    );
}

#[tokio::test]
async fn test_vote_and_save_hit_action_endpoints() {
    let server = MockServer::start().await;

    for action in ["downvote", "save"] {
        Mock::given(method("POST"))
            .and(path(format!("/api/posts/7/{action}/")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    let api = signed_in(&server);
    api.vote(7, VoteAction::Downvote).await.unwrap();
    api.toggle_save(7).await.unwrap();
}

#[tokio::test]
async fn test_joined_communities_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/communities/"))
        .and(query_param("joined", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "name": "rust", "description": "", "member_count": 10, "is_member": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = signed_in(&server);
    let page = api.communities(true).await.unwrap();
    assert_eq!(page.results[0].name, "rust");
}

#[tokio::test]
async fn test_names_are_escaped_in_paths() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/communities/rust%2Fjoin%3Fx%3D1/join/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/users/ana%20b/follow/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = signed_in(&server);
    api.join_community("rust/join?x=1").await.unwrap();
    api.follow("ana b").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.query().is_none()));
}

#[tokio::test]
async fn test_update_profile_mirrors_into_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "ana", "email": "a@x", "profile": {"bio": null, "avatar": null}
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/auth/profile/"))
        .and(body_json(json!({"bio": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "ana", "email": "a@x", "profile": {"bio": "hello", "avatar": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = signed_in(&server);
    api.current_user().await.unwrap();
    let profile = api
        .update_profile(&agora_core::api::types::ProfileUpdate {
            bio: Some("hello".into()),
            avatar: None,
        })
        .await
        .unwrap();

    assert_eq!(profile.bio.as_deref(), Some("hello"));
    assert_eq!(
        api.auth().user().unwrap().profile.bio.as_deref(),
        Some("hello")
    );
}

#[tokio::test]
async fn test_suggestions_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/suggestions/"))
        .and(query_param("q", "ru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [{"id": 1, "title": "rust tips", "community_name": "rust"}],
            "communities": [{"id": 2, "name": "rust", "avatar": null}],
            "users": []
        })))
        .mount(&server)
        .await;

    let api = signed_in(&server);
    let suggestions = api.suggestions("ru").await.unwrap();
    assert_eq!(suggestions.posts.len(), 1);
    assert_eq!(suggestions.communities[0].name, "rust");
    assert!(suggestions.users.is_empty());
}

#[tokio::test]
async fn test_search_posts_sends_search_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts/"))
        .and(query_param("search", "async rust"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": null,
            "previous": format!("{}/api/posts/?search=async+rust", server.uri()),
            "results": [post_json(8)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = signed_in(&server);
    let page = api.search_posts("async rust", Some(2)).await.unwrap();
    assert_eq!(page.results[0].id, 8);
}

#[tokio::test]
async fn test_saved_feed_accepts_bare_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts/saved/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(5)])))
        .expect(1)
        .mount(&server)
        .await;

    let api = signed_in(&server);
    let page = api.saved(None).await.unwrap();
    assert_eq!(page.results[0].id, 5);
    assert!(page.next_page().is_none());
}

#[tokio::test]
async fn test_mark_all_read_posts_to_action() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/notifications/mark_all_as_read/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    signed_in(&server).mark_all_read().await.unwrap();
}
