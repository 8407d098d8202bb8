//! User accounts, credentials and the cookie-based session.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{Username, auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{get_register_page, register_user};
pub use user::{
    User, UserID, add_user, create_user, create_user_table, get_user_by_username, validate_user,
};

#[cfg(test)]
pub(crate) use cookie::{COOKIE_EXPIRY, COOKIE_USERNAME};
