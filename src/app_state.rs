//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, FinanceStore, auth::DEFAULT_COOKIE_DURATION};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// Access to users and their records.
    pub store: FinanceStore,
}

impl AppState {
    /// Create a new [AppState] over a SQLite database connection.
    ///
    /// The tables for users and records are created if they do not exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, cookie_secret: &str) -> Result<Self, Error> {
        let store = FinanceStore::new(Arc::new(Mutex::new(db_connection)))?;

        Ok(Self::with_store(store, cookie_secret))
    }

    /// Create a new [AppState] around an existing store.
    pub fn with_store(store: FinanceStore, cookie_secret: &str) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            store,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<AppState> for FinanceStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
