//! Integration tests for login/logout commands.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::tempdir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn read_tokens(home: &Path) -> Value {
    let raw = fs::read_to_string(home.join("auth-storage.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_login_reads_password_from_stdin_and_stores_tokens() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/auth/token/"))
        .and(body_json(json!({"username": "ana", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("agora")
        .env("AGORA_HOME", home.path())
        .env("AGORA_API_URL", format!("{}/api/", server.uri()))
        .env_remove("AGORA_PASSWORD")
        .args(["login", "ana"])
        .write_stdin("secret\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as ana"));

    let tokens = read_tokens(home.path());
    assert_eq!(tokens["accessToken"], "A1");
    assert_eq!(tokens["refreshToken"], "R1");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(home.path().join("auth-storage.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[tokio::test]
async fn test_login_with_bad_credentials_fails() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/auth/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    cargo_bin_cmd!("agora")
        .env("AGORA_HOME", home.path())
        .env("AGORA_API_URL", format!("{}/api/", server.uri()))
        .args(["login", "ana", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active account"));

    assert!(!home.path().join("auth-storage.json").exists());
}

#[tokio::test]
async fn test_login_fails_when_home_is_not_writable() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let home = blocker.join("home");

    Mock::given(method("POST"))
        .and(path("/api/auth/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("agora")
        .env("AGORA_HOME", &home)
        .env("AGORA_API_URL", format!("{}/api/", server.uri()))
        .args(["login", "ana", "--password", "pw"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Logged in").not())
        .stderr(predicate::str::contains("login failed"))
        .stderr(predicate::str::contains("Failed to save session tokens"));

    assert!(!home.join("auth-storage.json").exists());
}

#[test]
fn test_logout_when_not_logged_in() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("agora")
        .env("AGORA_HOME", home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_logout_clears_stored_tokens() {
    let home = tempdir().unwrap();
    fs::write(
        home.path().join("auth-storage.json"),
        r#"{"accessToken": "A1", "refreshToken": "R1"}"#,
    )
    .unwrap();

    cargo_bin_cmd!("agora")
        .env("AGORA_HOME", home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    let tokens = read_tokens(home.path());
    assert!(tokens["accessToken"].is_null());
    assert!(tokens["refreshToken"].is_null());
}

#[test]
fn test_whoami_when_not_logged_in() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("agora")
        .env("AGORA_HOME", home.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}
