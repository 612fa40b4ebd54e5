//! Post search through `agora search` and `agora feed --search`.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seed_session(home: &Path) {
    fs::write(
        home.join("auth-storage.json"),
        r#"{"accessToken": "T1", "refreshToken": "R1"}"#,
    )
    .unwrap();
}

fn post(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": "",
        "author": {"id": 1, "username": "ana"},
        "community": {"id": 2, "name": "rust"},
        "created_at": "2024-05-01T10:00:00Z",
        "score": 3,
        "comment_count": 0,
        "user_vote": null,
        "is_saved": false
    })
}

#[tokio::test]
async fn test_search_lists_matching_posts_and_suggestions() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_session(home.path());

    Mock::given(method("GET"))
        .and(path("/api/posts/"))
        .and(query_param("search", "borrow checker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": null,
            "previous": null,
            "results": [post(4, "Fighting the borrow checker"), post(9, "Borrow checker wins")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/search/suggestions/"))
        .and(query_param("q", "borrow checker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [],
            "communities": [{"id": 2, "name": "rust", "avatar": null}],
            "users": [{"id": 5, "username": "borrowck", "avatar": null}]
        })))
        .mount(&server)
        .await;

    cargo_bin_cmd!("agora")
        .env("AGORA_HOME", home.path())
        .env("AGORA_API_URL", format!("{}/api/", server.uri()))
        .args(["search", "borrow checker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fighting the borrow checker"))
        .stdout(predicate::str::contains("Borrow checker wins"))
        .stdout(predicate::str::contains("c/rust"))
        .stdout(predicate::str::contains("borrowck"));
}

#[tokio::test]
async fn test_feed_search_flag_filters_posts() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_session(home.path());

    Mock::given(method("GET"))
        .and(path("/api/posts/"))
        .and(query_param("search", "lifetimes"))
        .and(query_param("community__name", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": null,
            "previous": null,
            "results": [post(3, "Lifetimes in practice")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("agora")
        .env("AGORA_HOME", home.path())
        .env("AGORA_API_URL", format!("{}/api/", server.uri()))
        .args(["feed", "--community", "rust", "--search", "lifetimes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lifetimes in practice"));
}
