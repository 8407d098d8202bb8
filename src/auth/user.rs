//! Code for creating the user table, registering users and checking their credentials.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{PasswordHash, ValidatedPassword},
};

/// A newtype wrapper for integer user IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The unique name the user logs in with.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns:
/// - [Error::UsernameAlreadyExists] if `username` is taken,
/// - [Error::BadRequest] if some other SQL error occurred.
pub fn create_user(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .execute(
            "INSERT INTO user (username, password) VALUES (?1, ?2)",
            (username, password_hash.as_ref()),
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::UsernameAlreadyExists(username.to_owned())
            }
            error => error.into(),
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: username.to_owned(),
        password_hash,
    })
}

/// Get the user from the database with the name `username`.
///
/// # Errors
///
/// This function will return an error if:
/// - `username` does not belong to a registered user ([Error::KeyNotFound]),
/// - there was an error trying to access the database.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password FROM user WHERE username = :username")?
        .query_row(&[(":username", username)], |row| {
            let raw_id = row.get(0)?;
            let username = row.get(1)?;
            let raw_password_hash: String = row.get(2)?;

            Ok(User {
                id: UserID::new(raw_id),
                username,
                password_hash: PasswordHash::new_unchecked(&raw_password_hash),
            })
        })
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::KeyNotFound(format!("the user \"{username}\""))
            }
            error => error.into(),
        })
}

/// Register a new user, storing a salted hash of `password` with `insert`.
///
/// Surrounding whitespace is removed from `username`. The password is hashed
/// before `insert` is called, so `insert` is the only step that needs the
/// database, e.g. `|username, hash| create_user(username, hash, &connection)`.
///
/// # Errors
///
/// Returns:
/// - [Error::BadRequest] if `username` or `password` is empty,
/// - [Error::UsernameAlreadyExists] if `username` is taken,
/// - [Error::BadRequest] if the password could not be hashed or stored.
pub fn add_user(
    username: &str,
    password: &str,
    cost: u32,
    insert: impl FnOnce(&str, PasswordHash) -> Result<User, Error>,
) -> Result<User, Error> {
    let username = validate_username(username)?;
    let password = ValidatedPassword::new(password)?;
    let password_hash = PasswordHash::new(password, cost)?;

    insert(username, password_hash)
}

/// Check `password` against the stored hash of the user that `lookup` finds.
///
/// `lookup` receives the trimmed username, e.g.
/// `|username| get_user_by_username(username, &connection)`. The hash is
/// checked after `lookup` returns.
///
/// Returns `false` for an unknown username as well as for a wrong password.
///
/// # Errors
///
/// Returns an [Error::BadRequest] if `username` or `password` is empty, or if
/// the stored hash could not be read or checked.
pub fn validate_user(
    username: &str,
    password: &str,
    lookup: impl FnOnce(&str) -> Result<User, Error>,
) -> Result<bool, Error> {
    let username = validate_username(username)?;

    if password.is_empty() {
        return Err(Error::bad_request("password cannot be empty"));
    }

    let user = match lookup(username) {
        Ok(user) => user,
        Err(Error::KeyNotFound(_)) => {
            tracing::debug!("log-in attempt for unknown user {username}");
            return Ok(false);
        }
        Err(error) => return Err(error),
    };

    user.password_hash.verify(password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::bad_request("could not verify the password")
    })
}

fn validate_username(username: &str) -> Result<&str, Error> {
    let username = username.trim();

    if username.is_empty() {
        return Err(Error::bad_request("username cannot be empty"));
    }

    Ok(username)
}
