//! Community command handlers.

use agora_core::api::Api;
use agora_core::api::types::NewCommunity;
use anyhow::Result;

pub async fn list(api: &Api, joined: bool) -> Result<()> {
    let page = api.communities(joined).await?;
    if page.results.is_empty() {
        println!("No communities.");
    }
    for community in &page.results {
        let members = community
            .member_count
            .map(|n| format!("{n} members"))
            .unwrap_or_default();
        let flag = if community.is_member == Some(true) {
            " (joined)"
        } else {
            ""
        };
        println!("c/{}  {members}{flag}", community.name);
    }
    Ok(())
}

pub async fn show(api: &Api, name: &str) -> Result<()> {
    let community = api.community(name).await?;
    println!("c/{}", community.name);
    if let Some(description) = community.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{description}");
    }
    if let Some(count) = community.member_count {
        println!("members: {count}");
    }
    if community.is_member == Some(true) {
        println!("You are a member.");
    }
    if community.is_muted == Some(true) {
        println!("Muted.");
    }
    Ok(())
}

pub async fn create(api: &Api, name: String, description: String) -> Result<()> {
    let community = api
        .create_community(&NewCommunity { name, description })
        .await?;
    println!("Created c/{}.", community.name);
    Ok(())
}

pub async fn join(api: &Api, name: &str) -> Result<()> {
    api.join_community(name).await?;
    println!("Joined c/{name}.");
    Ok(())
}

pub async fn leave(api: &Api, name: &str) -> Result<()> {
    api.leave_community(name).await?;
    println!("Left c/{name}.");
    Ok(())
}

pub async fn mute(api: &Api, name: &str) -> Result<()> {
    let community = api.community(name).await?;
    api.toggle_mute(community.id).await?;
    if community.is_muted == Some(true) {
        println!("Unmuted c/{name}.");
    } else {
        println!("Muted c/{name}.");
    }
    Ok(())
}

pub async fn notify(api: &Api, name: &str) -> Result<()> {
    let community = api.community(name).await?;
    api.toggle_notifications(community.id).await?;
    println!("Toggled notifications for c/{name}.");
    Ok(())
}

pub async fn members(api: &Api, name: &str) -> Result<()> {
    let page = api.members(name).await?;
    for member in &page.results {
        println!("{}", member.username);
    }
    Ok(())
}
