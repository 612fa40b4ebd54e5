//! Feed, post and comment command handlers.

use agora_core::api::types::{Comment, NewPost, Post, PostUpdate, Vote, VoteAction};
use agora_core::api::{Api, FeedKind, PostQuery};
use agora_core::hidden::HiddenPosts;
use anyhow::{Context, Result, bail};

use super::when;
use crate::cli::FeedArgs;

pub async fn feed(api: &Api, args: FeedArgs) -> Result<()> {
    let feed = match (args.home, args.saved, args.all) {
        (true, _, _) => FeedKind::Home,
        (_, true, _) => FeedKind::Saved,
        _ => FeedKind::All,
    };

    let page = api
        .posts(PostQuery {
            feed,
            page: args.page,
            community: args.community,
            author: args.author,
            search: args.search,
        })
        .await?;
    let next = page.next_page();

    let hidden = HiddenPosts::open_default().context("load hidden posts")?;
    let posts = hidden.filter(page.results);
    if posts.is_empty() {
        println!("No posts.");
    }
    for post in &posts {
        println!("{}", summary_line(post));
    }
    if let Some(next) = next {
        println!("More: --page {next}");
    }
    Ok(())
}

pub async fn show(api: &Api, id: u64) -> Result<()> {
    let post = api.post(id).await?;
    println!("{}", post.title);
    println!(
        "c/{} · {} · {} · score {} · {} comments{}",
        post.community.name,
        post.author.username,
        when(&post.created_at),
        post.score,
        post.comment_count,
        if post.is_saved { " · saved" } else { "" }
    );
    if let Some(image) = &post.image_url {
        println!("{image}");
    }
    if !post.content.is_empty() {
        println!();
        println!("{}", post.content);
    }
    Ok(())
}

pub async fn submit(api: &Api, community: &str, title: String, content: String) -> Result<()> {
    let community = api
        .community(community)
        .await
        .with_context(|| format!("look up community '{community}'"))?;
    let post = api
        .create_post(&NewPost {
            title,
            content,
            community_id: community.id,
        })
        .await?;
    println!("Created post {} in c/{}.", post.id, community.name);
    Ok(())
}

pub async fn edit(
    api: &Api,
    id: u64,
    title: Option<String>,
    content: Option<String>,
) -> Result<()> {
    if title.is_none() && content.is_none() {
        bail!("Nothing to update: pass --title and/or --content");
    }
    let post = api.update_post(id, &PostUpdate { title, content }).await?;
    println!("Updated post {}: {}", post.id, post.title);
    Ok(())
}

pub async fn delete(api: &Api, id: u64) -> Result<()> {
    api.delete_post(id).await?;
    println!("Deleted post {id}.");
    Ok(())
}

pub async fn vote(api: &Api, id: u64, action: VoteAction) -> Result<()> {
    let mut post = api.post(id).await?;
    api.vote(id, action).await?;
    post.apply_vote(action);

    let state = match post.user_vote {
        Vote::Up => "upvoted",
        Vote::Down => "downvoted",
        Vote::None => "vote removed",
    };
    println!("Post {id} {state}; score {}.", post.score);
    Ok(())
}

pub async fn save(api: &Api, id: u64) -> Result<()> {
    let post = api.post(id).await?;
    api.toggle_save(id).await?;
    if post.is_saved {
        println!("Removed post {id} from saved.");
    } else {
        println!("Saved post {id}.");
    }
    Ok(())
}

pub fn hide(id: u64) -> Result<()> {
    let mut hidden = HiddenPosts::open_default().context("load hidden posts")?;
    if hidden.hide(id)? {
        println!("Post {id} hidden.");
    } else {
        println!("Post {id} was already hidden.");
    }
    Ok(())
}

pub async fn comments(api: &Api, post_id: u64, page: Option<u32>) -> Result<()> {
    let page = api.comments(post_id, page).await?;
    if page.results.is_empty() {
        println!("No comments.");
    }
    for comment in &page.results {
        print_comment(comment, 0);
    }
    if let Some(next) = page.next_page() {
        println!("More: --page {next}");
    }
    Ok(())
}

pub async fn add_comment(api: &Api, post_id: u64, content: &str) -> Result<()> {
    let comment = api.create_comment(post_id, content).await?;
    println!("Added comment {} on post {post_id}.", comment.id);
    Ok(())
}

pub(super) fn summary_line(post: &Post) -> String {
    let marker = match post.user_vote {
        Vote::Up => '+',
        Vote::Down => '-',
        Vote::None => ' ',
    };
    format!(
        "{:>6} {marker}{:>5}  {}  (c/{}, {}, {} comments)",
        post.id, post.score, post.title, post.community.name, post.author.username, post.comment_count
    )
}

fn print_comment(comment: &Comment, depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{indent}{} · {}",
        comment.author.username,
        when(&comment.created_at)
    );
    for line in comment.content.lines() {
        println!("{indent}  {line}");
    }
    for reply in &comment.replies {
        print_comment(reply, depth + 1);
    }
}
