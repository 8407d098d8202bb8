//! Authentication middleware that checks the session cookie, extends the
//! session and redirects to the log-in page when there is no session.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_username_from_auth_cookie},
        redirect::log_in_redirect_url,
    },
};

/// The name of the logged in user.
///
/// Inserted into the request extensions by [auth_guard] and [auth_guard_hx],
/// route handlers receive it with `Extension(username): Extension<Username>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(pub String);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How far into the future each authenticated request pushes the session expiry.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(String) -> Response,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            let request = Request::from_parts(parts, body);
            return get_redirect(log_in_redirect_url(&request));
        }
    };

    let Some(username) = get_username_from_auth_cookie(&jar) else {
        let request = Request::from_parts(parts, body);
        return get_redirect(log_in_redirect_url(&request));
    };

    parts.extensions.insert(Username(username));
    let response = next.run(Request::from_parts(parts, body)).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error}. Keeping the old cookies.");
            jar
        }
    };

    // Handlers may set cookies of their own, so append rather than replace.
    for (key, value) in jar.into_response().headers().iter() {
        if key == SET_COOKIE {
            parts.headers.append(key, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid session cookie.
///
/// If the session is valid, the [Username] is placed into the request
/// extensions and the request is run normally. Otherwise the client is
/// redirected to the log-in page.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(&redirect_url).into_response()
    })
    .await
}

/// Same as [auth_guard], but redirects with the `HX-Redirect` header so that
/// the redirect works for requests made by HTMX.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url), StatusCode::OK).into_response()
    })
    .await
}
