//! Session, profile and upload command handlers.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use agora_core::api::types::{ProfileUpdate, UploadedImage};
use agora_core::api::{Api, image_mime_for};
use agora_core::auth::mask_token;
use anyhow::{Context, Result, bail};

pub async fn login(api: &Api, username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let tokens = api
        .login(username, &password)
        .await
        .context("login failed")?;
    tracing::debug!(access = %mask_token(&tokens.access), "signed in");
    println!("Logged in as {username}.");
    Ok(())
}

pub async fn register(
    api: &Api,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = resolve_password(password)?;
    api.register(username, email, &password)
        .await
        .context("registration failed")?;
    println!("Account created. Logged in as {username}.");
    Ok(())
}

pub fn logout(api: &Api) -> Result<()> {
    if api.auth().logout().context("clear session")? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub async fn whoami(api: &Api) -> Result<()> {
    if !api.auth().is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }
    let user = api.current_user().await?;
    println!("{} <{}>", user.username, user.email);
    if let Some(bio) = user.profile.bio.as_deref().filter(|b| !b.is_empty()) {
        println!("{bio}");
    }
    Ok(())
}

pub async fn show_profile(api: &Api) -> Result<()> {
    let profile = api.profile().await?;
    println!("bio:    {}", profile.bio.as_deref().unwrap_or("-"));
    println!("avatar: {}", profile.avatar.as_deref().unwrap_or("-"));
    Ok(())
}

pub async fn update_profile(api: &Api, bio: Option<String>, avatar: Option<&Path>) -> Result<()> {
    if bio.is_none() && avatar.is_none() {
        bail!("Nothing to update: pass --bio and/or --avatar");
    }

    let avatar = match avatar {
        Some(path) => Some(upload_file(api, path).await?.url),
        None => None,
    };
    let profile = api.update_profile(&ProfileUpdate { bio, avatar }).await?;
    println!("Profile updated.");
    if let Some(avatar) = profile.avatar {
        println!("avatar: {avatar}");
    }
    Ok(())
}

pub async fn upload(api: &Api, path: &Path) -> Result<()> {
    let uploaded = upload_file(api, path).await?;
    println!("{}", uploaded.url);
    Ok(())
}

async fn upload_file(api: &Api, path: &Path) -> Result<UploadedImage> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let uploaded = api
        .upload_image(file_name, image_mime_for(path), bytes)
        .await
        .with_context(|| format!("upload {}", path.display()))?;
    Ok(uploaded)
}

/// Uses the flag/env value, or reads one line from stdin.
fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Password: ");
        io::stderr().flush().ok();
    }
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("No password provided");
    }
    Ok(password)
}
