//! Works out where to send a user after they log in.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Parse `raw_url` and keep its path and query if it points back into this
/// application, i.e. it is a relative path and not the log-in page itself.
pub(crate) fn safe_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return None;
    }

    (uri.path() != endpoints::LOG_IN_VIEW).then(|| path_and_query.to_owned())
}

/// Build the log-in page URL for a request that was refused for lack of a
/// session, remembering the page the user was on.
///
/// For HTMX requests to the API the page is taken from the `HX-Current-URL`
/// header, otherwise from the request URI. Falls back to the default page.
pub(crate) fn log_in_redirect_url(request: &Request) -> String {
    let target = if request.uri().path().starts_with("/api") {
        hx_current_url(request)
    } else {
        request
            .uri()
            .path_and_query()
            .and_then(|path_and_query| safe_redirect_url(path_and_query.as_str()))
    };

    let target = target.unwrap_or_else(|| {
        tracing::debug!(
            "no usable redirect target for {}, using the default page",
            request.uri()
        );
        endpoints::DEFAULT_VIEW.to_owned()
    });

    match serde_urlencoded::to_string([("redirect_url", target.as_str())]) {
        Ok(query) => format!("{}?{query}", endpoints::LOG_IN_VIEW),
        Err(error) => {
            tracing::error!("could not encode redirect URL {target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

fn hx_current_url(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_htmx = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_htmx {
        tracing::warn!("API request without the HX-Request header: {}", request.uri());
        return None;
    }

    // HTMX sends the full URL, so drop the scheme and host before checking it.
    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?
        .parse::<Uri>()
        .ok()?;

    safe_redirect_url(current_url.path_and_query()?.as_str())
}
