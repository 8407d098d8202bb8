//! Alert messages for reporting the outcome of form submissions.

use axum::response::Html;
use maud::{Markup, html};

const ALERT_STYLE: &str = "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
    dark:bg-gray-800 dark:text-red-400";

/// An error message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// A short summary, shown in bold.
    pub message: String,
    /// What went wrong and how to fix it. Omitted when empty.
    pub details: String,
}

impl Alert {
    pub fn into_markup(self) -> Markup {
        html! {
            div class=(ALERT_STYLE) role="alert"
            {
                span class="font-medium" { (self.message) }

                @if !self.details.is_empty() {
                    p { (self.details) }
                }
            }
        }
    }

    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}
