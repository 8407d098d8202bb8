//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/records/{domain}', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the default page.
pub const ROOT: &str = "/";
/// The page a user lands on after logging in, when they were not on another page.
pub const DEFAULT_VIEW: &str = "/records/expense";
/// The page for listing, adding and importing one kind of record.
pub const RECORDS_VIEW: &str = "/records/{domain}";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/log_out";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/internal_server_error";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for registering users.
pub const USERS: &str = "/api/users";
/// The route to add a record.
pub const RECORDS_API: &str = "/api/records/{domain}";
/// The route to import records from CSV text.
pub const IMPORT: &str = "/api/import";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter starts with a left brace and ends with a right brace,
/// e.g. '{domain}' in '/records/{domain}'.
///
/// Only the first parameter is replaced. If no parameter is found, the
/// original `endpoint_path` is returned.
pub fn format_endpoint(endpoint_path: &str, value: impl Display) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map(|offset| start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..start],
        value,
        &endpoint_path[end..]
    )
}
