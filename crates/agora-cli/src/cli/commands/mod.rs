//! CLI command handlers.

pub mod account;
pub mod communities;
pub mod config;
pub mod posts;
pub mod users;

use chrono::{DateTime, Utc};

/// Short timestamp used in listings.
fn when(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}
