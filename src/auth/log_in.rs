//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The cookie and middleware modules handle the session once the user is logged in.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{invalidate_auth_cookie, redirect::safe_redirect_url, set_auth_cookie},
    endpoints,
    html::{base, link, log_in_register, password_input, submit_button, username_input},
    internal_server_error::get_internal_server_error_redirect,
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

fn log_in_form(username: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (username_input(username, None))
            (password_input(error_message))
            (submit_button("Log in"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                (link(endpoints::REGISTER_VIEW, "Register here"))
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = safe_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Ignoring invalid redirect URL: {raw_url}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref());
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &log_in_form);

    base("Log In", &content).into_response()
}

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is
/// redirected to the page they were on, or to the default page. Otherwise,
/// the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref());
    let redirect_url = redirect_url.as_deref();
    let username = user_data.username.trim();

    match state.store.authenticate(username, &user_data.password) {
        Ok(true) => {}
        Ok(false) => {
            return log_in_form(username, Some(INVALID_CREDENTIALS_ERROR_MSG), redirect_url)
                .into_response();
        }
        Err(Error::BadRequest(message)) => {
            return log_in_form(username, Some(message.as_str()), redirect_url).into_response();
        }
        Err(error) => return error.into_alert_response(),
    }

    let redirect_url = redirect_url.unwrap_or(endpoints::DEFAULT_VIEW);

    match set_auth_cookie(jar.clone(), username, state.cookie_duration) {
        Ok(jar) => {
            tracing::info!("{username} logged in");
            (StatusCode::SEE_OTHER, HxRedirect(redirect_url.to_owned()), jar).into_response()
        }
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                invalidate_auth_cookie(jar),
                get_internal_server_error_redirect(),
            )
                .into_response()
        }
    }
}


#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        AppState, FinanceStore,
        auth::COOKIE_USERNAME,
        endpoints,
        test_utils::{assert_form_error_message, assert_valid_html},
    };

    use super::{INVALID_CREDENTIALS_ERROR_MSG, post_log_in};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let store = FinanceStore::new(Arc::new(Mutex::new(connection)))
            .unwrap()
            .with_hash_cost(4);
        store.register("alice", "hunter2").unwrap();

        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(AppState::with_store(store, "foobar"));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[track_caller]
    fn assert_form_error(text: &str, want: &str) {
        let html = scraper::Html::parse_fragment(text);
        assert_valid_html(&html);
        let form = html
            .select(&Selector::parse("form").unwrap())
            .next()
            .expect("want a form");

        assert_form_error_message(&form, want);
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("username", "alice"), ("password", "hunter2")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::DEFAULT_VIEW);
        assert_eq!(response.cookie(COOKIE_USERNAME).secure(), Some(true));
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[
                ("username", "alice"),
                ("password", "hunter2"),
                ("redirect_url", "/records/goal"),
            ])
            .await;

        assert_eq!(response.header("hx-redirect"), "/records/goal");
    }

    #[tokio::test]
    async fn log_in_falls_back_on_invalid_redirect_url() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[
                ("username", "alice"),
                ("password", "hunter2"),
                ("redirect_url", "https://example.com"),
            ])
            .await;

        assert_eq!(response.header("hx-redirect"), endpoints::DEFAULT_VIEW);
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("username", "alice"), ("password", "wrong")])
            .await;

        response.assert_status_ok();
        assert!(response.maybe_cookie(COOKIE_USERNAME).is_none());
        assert_form_error(&response.text(), INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_user() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("username", "bob"), ("password", "hunter2")])
            .await;

        response.assert_status_ok();
        assert_form_error(&response.text(), INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_password() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("username", "alice")])
            .await;

        response.assert_status_ok();
        assert_form_error(&response.text(), "password cannot be empty");
    }
}
