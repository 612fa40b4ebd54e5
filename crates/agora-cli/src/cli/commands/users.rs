//! User, notification and search command handlers.

use agora_core::api::Api;
use agora_core::hidden::HiddenPosts;
use anyhow::{Context, Result};

use super::posts::summary_line;
use super::when;

pub async fn show(api: &Api, username: &str) -> Result<()> {
    let user = api.user(username).await?;
    println!("{}", user.username);
    if let Some(bio) = user.profile.bio.as_deref().filter(|b| !b.is_empty()) {
        println!("{bio}");
    }
    println!(
        "followers: {}  following: {}{}",
        user.followers_count,
        user.following_count,
        if user.is_following { "  (you follow)" } else { "" }
    );
    Ok(())
}

pub async fn follow(api: &Api, username: &str, follow: bool) -> Result<()> {
    if follow {
        api.follow(username).await?;
        println!("Following {username}.");
    } else {
        api.unfollow(username).await?;
        println!("Unfollowed {username}.");
    }
    Ok(())
}

pub async fn notifications(api: &Api) -> Result<()> {
    let page = api.notifications().await?;
    if page.results.is_empty() {
        println!("No notifications.");
    }
    for n in &page.results {
        let unread = if n.is_read { ' ' } else { '*' };
        println!(
            "{unread} {}  {} {}",
            when(&n.timestamp),
            n.actor.username,
            n.verb
        );
    }
    Ok(())
}

pub async fn mark_all_read(api: &Api) -> Result<()> {
    api.mark_all_read().await?;
    println!("All notifications marked as read.");
    Ok(())
}

pub async fn search(api: &Api, query: &str, page: Option<u32>) -> Result<()> {
    let posts = api.search_posts(query, page).await?;
    let suggestions = api.suggestions(query).await?;
    let next = posts.next_page();

    let hidden = HiddenPosts::open_default().context("load hidden posts")?;
    let posts = hidden.filter(posts.results);
    if posts.is_empty() && suggestions.communities.is_empty() && suggestions.users.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for post in &posts {
        println!("{}", summary_line(post));
    }
    if let Some(next) = next {
        println!("More posts: --page {next}");
    }
    for community in &suggestions.communities {
        println!("comm   c/{}", community.name);
    }
    for user in &suggestions.users {
        println!("user   {}", user.username);
    }
    Ok(())
}
