//! Functions for storing the logged in user's session in encrypted cookies.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::Error;

pub(crate) const COOKIE_USERNAME: &str = "username";
pub(crate) const COOKIE_EXPIRY: &str = "expiry";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Date time format for the cookie expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
///
/// Used with `format` instead of `to_string` since the latter prints midnight
/// with a single digit hour, which the parser then rejects.
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

fn session_cookie<'a>(name: &'a str, value: String, expiry: OffsetDateTime) -> Cookie<'a> {
    Cookie::build((name, value))
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add the session cookies for `username` to the cookie jar, marking them as
/// logged in until `duration` from now.
///
/// # Errors
///
/// Returns an [Error::BadRequest] if the expiry time cannot be formatted.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    username: &str,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry = OffsetDateTime::now_utc() + duration;
    let expiry_string = format_expiry(expiry)?;

    Ok(jar
        .add(session_cookie(COOKIE_USERNAME, username.to_owned(), expiry))
        .add(session_cookie(COOKIE_EXPIRY, expiry_string, expiry)))
}

/// Overwrite the session cookies with expired ones, which removes them on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let expired = |name| {
        let mut cookie = session_cookie(name, "deleted".to_owned(), OffsetDateTime::UNIX_EPOCH);
        cookie.set_max_age(Duration::ZERO);
        cookie
    };

    jar.add(expired(COOKIE_USERNAME)).add(expired(COOKIE_EXPIRY))
}

/// Push the expiry of the session cookies in `jar` out to `duration` from
/// now, unless they already expire later than that.
///
/// # Errors
///
/// Returns an [Error::BadRequest] if the session cookies are missing or their
/// expiry cannot be read. The cookie jar is not modified in that case.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry_cookie = jar
        .get(COOKIE_EXPIRY)
        .ok_or_else(|| Error::bad_request("the session expiry cookie is missing"))?;
    let current_expiry = OffsetDateTime::parse(expiry_cookie.value_trimmed(), DATE_TIME_FORMAT)
        .map_err(|_| Error::bad_request("the session expiry is not a valid date"))?;
    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::bad_request("the session expiry is out of range"))?;

    let expiry = max(current_expiry, new_expiry);
    let username = jar
        .get(COOKIE_USERNAME)
        .ok_or_else(|| Error::bad_request("the session cookie is missing"))?;

    Ok(jar
        .add(session_cookie(
            COOKIE_USERNAME,
            username.value().to_owned(),
            expiry,
        ))
        .add(session_cookie(COOKIE_EXPIRY, format_expiry(expiry)?, expiry)))
}

/// Get the username of the logged in user, if the session cookies are present
/// and have not expired.
pub(crate) fn get_username_from_auth_cookie(jar: &PrivateCookieJar) -> Option<String> {
    let username = jar.get(COOKIE_USERNAME)?;
    let expiry_cookie = jar.get(COOKIE_EXPIRY)?;
    let expiry = OffsetDateTime::parse(expiry_cookie.value_trimmed(), DATE_TIME_FORMAT).ok()?;

    if expiry <= OffsetDateTime::now_utc() || username.value().is_empty() {
        return None;
    }

    Some(username.value().to_owned())
}

fn format_expiry(expiry: OffsetDateTime) -> Result<String, Error> {
    expiry.format(DATE_TIME_FORMAT).map_err(|error| {
        tracing::error!("could not format cookie expiry {expiry}: {error}");
        Error::bad_request("could not set the session cookie")
    })
}
