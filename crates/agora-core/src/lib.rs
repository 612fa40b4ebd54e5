//! Core agora library (session state, authenticated API client, endpoints, config, logging).

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod hidden;
pub mod logging;
