//! Session state: persisted tokens plus the in-memory current user.
//!
//! The two halves have different lifecycles. Tokens survive restarts via
//! [`TokenStore`]; the user lives only in [`UserStore`] and is fetched
//! again from `auth/profile/` when needed.

mod storage;

use std::sync::{PoisonError, RwLock};

use anyhow::Result;

pub use storage::{StoredTokens, TokenStore, mask_token};

use crate::api::types::{Profile, User};

/// In-memory holder for the signed-in user.
#[derive(Debug, Default)]
pub struct UserStore {
    user: Option<User>,
}

impl UserStore {
    pub fn get(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn set(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Replaces the profile of the current user; no-op when signed out.
    pub fn update_profile(&mut self, profile: Profile) {
        if let Some(user) = self.user.as_mut() {
            user.profile = profile;
        }
    }
}

/// Shared session state read by the API client and mutated on
/// login, refresh, profile update and logout.
#[derive(Debug, Default)]
pub struct AuthState {
    tokens: RwLock<TokenStore>,
    user: RwLock<UserStore>,
}

impl AuthState {
    pub fn new(tokens: TokenStore) -> Self {
        Self {
            tokens: RwLock::new(tokens),
            user: RwLock::new(UserStore::default()),
        }
    }

    /// Session that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Session backed by the default token file.
    ///
    /// # Errors
    /// Returns an error if the token file exists but cannot be parsed.
    pub fn load_default() -> Result<Self> {
        Ok(Self::new(TokenStore::open_default()?))
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_tokens(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_tokens(|t| t.refresh_token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get()
            .cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_tokens(|t| t.access_token.is_some())
    }

    /// Starts a session after login or registration.
    ///
    /// # Errors
    /// Returns an error if the tokens cannot be persisted; the in-memory
    /// session is updated regardless.
    pub fn set_auth(&self, access: &str, refresh: &str, user: Option<User>) -> Result<()> {
        self.set_user(user);
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(StoredTokens {
                access_token: Some(access.to_string()),
                refresh_token: Some(refresh.to_string()),
            })
    }

    /// Swaps in a refreshed access token. The refresh token is unchanged.
    ///
    /// # Errors
    /// Returns an error if the tokens cannot be persisted.
    pub fn set_access_token(&self, access: &str) -> Result<()> {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_access_token(access)
    }

    pub fn set_user(&self, user: Option<User>) {
        self.user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(user);
    }

    pub fn update_user_profile(&self, profile: Profile) {
        self.user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .update_profile(profile);
    }

    /// Destroys the session. Returns whether tokens were present.
    ///
    /// # Errors
    /// Returns an error if the token file cannot be rewritten; memory is
    /// cleared regardless.
    pub fn logout(&self) -> Result<bool> {
        self.set_user(None);
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear()
    }

    fn read_tokens<T>(&self, f: impl FnOnce(&StoredTokens) -> T) -> T {
        f(self
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens())
    }
}
