//! Assertions shared by the HTML and route handler tests.

mod form;
mod html;
mod http;

pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_submit_button,
    assert_form_submit_button_with_text, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::assert_content_type;
