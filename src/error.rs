//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, not_found::NotFoundError};

/// The errors that may be returned by the data access layer.
///
/// Every failure inside the crate is reported as one of these three variants.
/// Storage errors are logged where they are converted and their details are
/// not included in the error message.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The input was malformed or missing, or a storage operation failed.
    ///
    /// The message describes the problem in terms that can be shown to the
    /// user, e.g. "amount must be a non-negative number".
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Tried to register a username that is already taken.
    #[error("the username \"{0}\" already exists")]
    UsernameAlreadyExists(String),

    /// A keyed lookup did not match any row.
    ///
    /// The string describes what was being looked up.
    #[error("could not find {0}")]
    KeyNotFound(String),
}

impl Error {
    /// Shorthand for creating an [Error::BadRequest] from anything string-like.
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::KeyNotFound("the requested row".to_owned())
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
                tracing::warn!("rejected a row that references a missing user: {sql_error}");
                Error::bad_request("the record does not belong to a registered user")
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::bad_request("a storage operation failed")
            }
        }
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        let line = value.position().map(|position| position.line());

        match line {
            Some(line) => Error::BadRequest(format!("could not parse CSV line {line}: {value}")),
            None => Error::BadRequest(format!("could not parse CSV: {value}")),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::KeyNotFound(_) => NotFoundError.into_response(),
            error => error.into_alert_response(),
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Alert {
                    message: "Something went wrong".to_owned(),
                    details: format!("{message}. Make sure the form input is correct."),
                },
            ),
            Error::UsernameAlreadyExists(username) => (
                StatusCode::CONFLICT,
                Alert {
                    message: "Username already exists".to_owned(),
                    details: format!("The username {username} is taken. Try a different one."),
                },
            ),
            Error::KeyNotFound(what) => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Not found".to_owned(),
                    details: format!("Could not find {what}."),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
