use axum::{body::Body, response::Response};
use scraper::Html;

/// Read the body of `response` and parse it as a full HTML document.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    Html::parse_document(&String::from_utf8_lossy(&body))
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}
