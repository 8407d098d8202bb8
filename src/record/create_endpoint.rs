//! Defines the endpoint for adding a record.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// axum_extra's Form, unlike axum's, deserializes the empty strings sent by
// blank inputs without complaint.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    FinanceStore,
    auth::Username,
    endpoints::{self, format_endpoint},
    record::{Domain, FormFields},
};

/// A route handler for adding a record for the logged in user, redirects to
/// the list of that domain's records on success.
pub async fn create_record_endpoint(
    State(store): State<FinanceStore>,
    Extension(Username(username)): Extension<Username>,
    Path(domain): Path<String>,
    Form(fields): Form<FormFields>,
) -> Response {
    let domain: Domain = match domain.parse() {
        Ok(domain) => domain,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = store.add_record(&username, domain, &fields) {
        tracing::debug!("could not add {domain} record for {username}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(format_endpoint(endpoints::RECORDS_VIEW, domain)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
