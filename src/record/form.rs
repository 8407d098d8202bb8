//! The form for adding a record of one domain.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{ALERT_CONTAINER_ID, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, submit_button},
    record::Domain,
};

/// A human readable label for a form field name, e.g. "Due date" for "due_date".
pub(super) fn field_label(field: &str) -> String {
    let words = field.replace('_', " ");
    let mut chars = words.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn field_input(domain: Domain, field: &str) -> Markup {
    let (input_type, step) = match field {
        "amount" | "interest_rate" => ("number", Some("0.01")),
        field if field.ends_with("date") => ("date", None),
        _ => ("text", None),
    };
    let id = format!("{domain}-{field}");

    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (field_label(field)) }

            input
                type=(input_type)
                name=(field)
                id=(id)
                step=[step]
                min=[step.map(|_| "0")]
                required[domain.is_required(field)]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// Render the form for adding a `domain` record.
///
/// Errors are shown in the alert container, on success the page is reloaded.
pub fn record_form(domain: Domain) -> Markup {
    html! {
        form
            hx-post=(format_endpoint(endpoints::RECORDS_API, domain))
            hx-swap="none"
            hx-target-error=(format!("#{ALERT_CONTAINER_ID}"))
            hx-indicator="#indicator"
            class="space-y-4 md:space-y-6 w-full max-w-md"
        {
            @for field in domain.fields() {
                (field_input(domain, field))
            }

            (submit_button("Add"))
        }
    }
}
