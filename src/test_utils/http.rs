use axum::{body::Body, response::Response};

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = response
        .headers()
        .get("content-type")
        .expect("content-type header missing");

    assert_eq!(content_type_header, content_type);
}
