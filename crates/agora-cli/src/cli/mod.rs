//! CLI entry and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use agora_core::api::Api;
use agora_core::api::types::VoteAction;
use agora_core::auth::AuthState;
use agora_core::client::{ApiClient, ClientConfig};
use agora_core::{config, logging};
use anyhow::{Context, Result};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "agora")]
#[command(version)]
#[command(about = "Terminal client for the agora discussion platform")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in and store the session tokens
    Login {
        username: String,
        /// Password (read from stdin when omitted)
        #[arg(long, env = "AGORA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        username: String,
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long, env = "AGORA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// List posts
    Feed {
        #[command(flatten)]
        args: FeedArgs,
    },
    /// Act on a single post
    Post {
        #[command(subcommand)]
        command: PostCommands,
    },
    /// Submit a new post to a community
    Submit {
        /// Community name
        #[arg(long, short)]
        community: String,
        #[arg(long, short)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Read or write comments on a post
    Comments {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// Browse and manage communities
    Communities {
        #[command(subcommand)]
        command: CommunityCommands,
    },
    /// View and follow users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Read notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },
    /// Search posts, communities and users
    Search {
        query: String,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Upload an image and print its URL
    Upload {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct FeedArgs {
    /// Posts from joined communities and followed users
    #[arg(long, conflicts_with_all = ["saved", "all"])]
    pub home: bool,
    /// Posts you saved
    #[arg(long, conflicts_with = "all")]
    pub saved: bool,
    /// Every post (default)
    #[arg(long)]
    pub all: bool,
    /// Only posts from this community
    #[arg(long)]
    pub community: Option<String>,
    /// Only posts by this user
    #[arg(long)]
    pub author: Option<String>,
    /// Only posts whose title or body matches
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
}

#[derive(clap::Subcommand)]
enum ProfileCommands {
    Show,
    Update {
        #[arg(long)]
        bio: Option<String>,
        /// Image file to upload as the new avatar
        #[arg(long, value_name = "FILE")]
        avatar: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand)]
enum PostCommands {
    Show { id: u64 },
    Delete { id: u64 },
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Upvote { id: u64 },
    Downvote { id: u64 },
    /// Toggle the saved flag
    Save { id: u64 },
    /// Hide a post from your feeds (local only)
    Hide { id: u64 },
}

#[derive(clap::Subcommand)]
enum CommentCommands {
    List {
        post_id: u64,
        #[arg(long)]
        page: Option<u32>,
    },
    Add { post_id: u64, content: String },
}

#[derive(clap::Subcommand)]
enum CommunityCommands {
    List {
        /// Only communities you belong to
        #[arg(long)]
        joined: bool,
    },
    Show { name: String },
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Join { name: String },
    Leave { name: String },
    /// Toggle muting a community
    Mute { name: String },
    /// Toggle notifications from a community
    Notify { name: String },
    Members { name: String },
}

#[derive(clap::Subcommand)]
enum UserCommands {
    Show { username: String },
    Follow { username: String },
    Unfollow { username: String },
}

#[derive(clap::Subcommand)]
enum NotificationCommands {
    List,
    /// Mark every notification as read
    ReadAll,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

/// Builds an API facade over the persisted session.
fn connect(config: &config::Config) -> Result<Api> {
    let auth = AuthState::load_default().context("load session")?;
    let client = ApiClient::new(ClientConfig::from_config(config)?, Arc::new(auth))?;
    Ok(Api::new(client))
}

async fn dispatch(cli: Cli) -> Result<()> {
    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let config = config::Config::load().context("load config")?;
    let api = connect(&config)?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::account::login(&api, &username, password).await
        }
        Commands::Register {
            username,
            email,
            password,
        } => commands::account::register(&api, &username, &email, password).await,
        Commands::Logout => commands::account::logout(&api),
        Commands::Whoami => commands::account::whoami(&api).await,
        Commands::Profile { command } => match command {
            ProfileCommands::Show => commands::account::show_profile(&api).await,
            ProfileCommands::Update { bio, avatar } => {
                commands::account::update_profile(&api, bio, avatar.as_deref()).await
            }
        },

        Commands::Feed { args } => commands::posts::feed(&api, args).await,
        Commands::Post { command } => match command {
            PostCommands::Show { id } => commands::posts::show(&api, id).await,
            PostCommands::Delete { id } => commands::posts::delete(&api, id).await,
            PostCommands::Edit { id, title, content } => {
                commands::posts::edit(&api, id, title, content).await
            }
            PostCommands::Upvote { id } => {
                commands::posts::vote(&api, id, VoteAction::Upvote).await
            }
            PostCommands::Downvote { id } => {
                commands::posts::vote(&api, id, VoteAction::Downvote).await
            }
            PostCommands::Save { id } => commands::posts::save(&api, id).await,
            PostCommands::Hide { id } => commands::posts::hide(id),
        },
        Commands::Submit {
            community,
            title,
            content,
        } => commands::posts::submit(&api, &community, title, content).await,
        Commands::Comments { command } => match command {
            CommentCommands::List { post_id, page } => {
                commands::posts::comments(&api, post_id, page).await
            }
            CommentCommands::Add { post_id, content } => {
                commands::posts::add_comment(&api, post_id, &content).await
            }
        },

        Commands::Communities { command } => match command {
            CommunityCommands::List { joined } => commands::communities::list(&api, joined).await,
            CommunityCommands::Show { name } => commands::communities::show(&api, &name).await,
            CommunityCommands::Create { name, description } => {
                commands::communities::create(&api, name, description).await
            }
            CommunityCommands::Join { name } => commands::communities::join(&api, &name).await,
            CommunityCommands::Leave { name } => commands::communities::leave(&api, &name).await,
            CommunityCommands::Mute { name } => commands::communities::mute(&api, &name).await,
            CommunityCommands::Notify { name } => {
                commands::communities::notify(&api, &name).await
            }
            CommunityCommands::Members { name } => {
                commands::communities::members(&api, &name).await
            }
        },

        Commands::User { command } => match command {
            UserCommands::Show { username } => commands::users::show(&api, &username).await,
            UserCommands::Follow { username } => {
                commands::users::follow(&api, &username, true).await
            }
            UserCommands::Unfollow { username } => {
                commands::users::follow(&api, &username, false).await
            }
        },
        Commands::Notifications { command } => match command {
            NotificationCommands::List => commands::users::notifications(&api).await,
            NotificationCommands::ReadAll => commands::users::mark_all_read(&api).await,
        },
        Commands::Search { query, page } => commands::users::search(&api, &query, page).await,
        Commands::Upload { path } => commands::account::upload(&api, &path).await,

        // handled before the session is loaded
        Commands::Config { .. } => Ok(()),
    }
}
