//! The form and route handler for importing records from CSV text.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    FinanceStore,
    auth::Username,
    endpoints::{self, format_endpoint},
    html::{ALERT_CONTAINER_ID, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, submit_button},
    record::Domain,
};

/// Render the form for pasting CSV rows of `domain` records.
pub fn import_form(domain: Domain) -> Markup {
    let columns = domain.fields().join(",");

    html! {
        form
            hx-post=(endpoints::IMPORT)
            hx-swap="none"
            hx-target-error=(format!("#{ALERT_CONTAINER_ID}"))
            hx-disabled-elt="#csv_text"
            class="space-y-4 md:space-y-6 w-full max-w-md"
        {
            input type="hidden" name="domain" value=(domain);

            div
            {
                label for="csv_text" class=(FORM_LABEL_STYLE) { "Import from CSV" }

                textarea
                    id="csv_text"
                    name="csv_text"
                    rows="6"
                    placeholder=(columns)
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {}

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "One record per line with the columns " code { (columns) } ". "
                    "Start with a header row to use a different column order. "
                    "Nothing is imported if any line is invalid."
                }
            }

            (submit_button("Import"))
        }
    }
}

/// The form data for importing records.
#[derive(Debug, Deserialize)]
pub struct ImportForm {
    /// The kind of record each row holds, e.g. "expense".
    pub domain: String,
    /// The rows to import.
    #[serde(default)]
    pub csv_text: String,
}

/// A route handler for importing CSV rows as records for the logged in user.
///
/// Redirects to the list of the imported records on success, otherwise
/// responds with an alert describing the first bad row.
pub async fn import_csv_endpoint(
    State(store): State<FinanceStore>,
    Extension(Username(username)): Extension<Username>,
    Form(form): Form<ImportForm>,
) -> Response {
    let domain: Domain = match form.domain.parse() {
        Ok(domain) => domain,
        Err(error) => return error.into_alert_response(),
    };

    match store.import_csv(&username, domain, &form.csv_text) {
        Ok(count) => {
            tracing::debug!("CSV import of {count} {domain} rows succeeded");
            (
                HxRedirect(format_endpoint(endpoints::RECORDS_VIEW, domain)),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::warn!("CSV import for {username} failed: {error}");
            error.into_alert_response()
        }
    }
}


#[cfg(test)]
mod import_csv_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{FinanceStore, auth::Username, endpoints, record::Domain};

    use super::import_csv_endpoint;

    fn get_test_server() -> (TestServer, FinanceStore) {
        let connection = Connection::open_in_memory().unwrap();
        let store = FinanceStore::new(Arc::new(Mutex::new(connection)))
            .unwrap()
            .with_hash_cost(4);
        store.register("alice", "hunter2").unwrap();

        let app = Router::new()
            .route(endpoints::IMPORT, post(import_csv_endpoint))
            .layer(Extension(Username("alice".to_owned())))
            .with_state(store.clone());

        (TestServer::try_new(app).unwrap(), store)
    }

    #[tokio::test]
    async fn import_redirects_to_records_page() {
        let (server, store) = get_test_server();

        let response = server
            .post(endpoints::IMPORT)
            .form(&[("domain", "expense"), ("csv_text", "50,food\n20,transport")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), "/records/expense");
        assert_eq!(store.list_records("alice", Domain::Expense).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_row_responds_with_alert() {
        let (server, store) = get_test_server();

        let response = server
            .post(endpoints::IMPORT)
            .form(&[("domain", "expense"), ("csv_text", "50,food\nabc,transport")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("line 2"));
        assert_eq!(store.list_records("alice", Domain::Expense), Ok(vec![]));
    }

    #[tokio::test]
    async fn unknown_domain_responds_with_alert() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::IMPORT)
            .form(&[("domain", "savings"), ("csv_text", "50,food")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
