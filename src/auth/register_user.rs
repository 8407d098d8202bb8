//! The registration page for creating an account.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::set_auth_cookie,
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link, log_in_register, password_input,
        submit_button, username_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

pub const USERNAME_TAKEN_ERROR_MSG: &str = "Username already exists. Try a different one.";

/// The error messages to show next to each input of the registration form.
#[derive(Default)]
struct FormErrors<'a> {
    username: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn registration_form(username: &str, errors: FormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (username_input(username, errors.username))
            (password_input(errors.password))
            (confirm_password_input(errors.confirm_password))
            (submit_button("Create Account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", FormErrors::default());
    let content = log_in_register("Create Account", &registration_form);

    base("Register", &content).into_response()
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Handler for registering a new user.
///
/// On success the user is logged in and redirected to the default page,
/// otherwise the form is returned with an error message next to the input
/// that caused the problem.
pub async fn register_user(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let username = user_data.username.trim();

    if user_data.password != user_data.confirm_password {
        return registration_form(
            username,
            FormErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let user = match state.store.register(username, &user_data.password) {
        Ok(user) => user,
        Err(Error::UsernameAlreadyExists(_)) => {
            return registration_form(
                username,
                FormErrors {
                    username: Some(USERNAME_TAKEN_ERROR_MSG),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(Error::BadRequest(message)) => {
            let errors = if message.starts_with("username") {
                FormErrors {
                    username: Some(message.as_str()),
                    ..Default::default()
                }
            } else {
                FormErrors {
                    password: Some(message.as_str()),
                    ..Default::default()
                }
            };

            return registration_form(username, errors).into_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    match set_auth_cookie(jar, &user.username, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DEFAULT_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod get_register_page_tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::get_register_page;

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let title = document
            .select(&Selector::parse("h1").unwrap())
            .next()
            .expect("want a h1")
            .text()
            .collect::<String>();
        assert_eq!(title.trim(), "Create Account");

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::USERS, "hx-post");
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
        assert_form_submit_button_with_text(&form, "Create Account");

        let links = form
            .select(&Selector::parse("a[href]").unwrap())
            .map(|link| link.value().attr("href").unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(links, vec![endpoints::LOG_IN_VIEW]);
    }
}
