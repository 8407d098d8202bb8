//! Defines the route handler for the page that lists one kind of record.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    FinanceStore,
    auth::Username,
    csv_import::import_form,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::nav_bar,
    not_found::NotFoundError,
    record::{Domain, Record, form::field_label, form::record_form},
};

fn records_table(domain: Domain, records: &[Record]) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg w-full max-w-screen-lg"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        @for field in domain.fields() {
                            th scope="col" class=(TABLE_CELL_STYLE) { (field_label(field)) }
                        }
                    }
                }

                tbody
                {
                    @for record in records {
                        tr class=(TABLE_ROW_STYLE) data-record-id=(record.id)
                        {
                            @for value in record.entry.display_values() {
                                td class=(TABLE_CELL_STYLE) { (value) }
                            }
                        }
                    }

                    @if records.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan=(domain.fields().len()) class=(TABLE_CELL_STYLE)
                            {
                                "Nothing here yet. Add a record below or import some from CSV."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn records_view(domain: Domain, records: &[Record]) -> Markup {
    let content = html! {
        (nav_bar(Some(domain)))

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-2xl font-bold" { (domain.title()) }

            (records_table(domain, records))

            div class="flex flex-col lg:flex-row gap-8 mt-8 w-full justify-center"
            {
                (record_form(domain))
                (import_form(domain))
            }
        }
    };

    base(domain.title(), &content)
}

/// Route handler for the page that lists the logged in user's records of one domain.
///
/// Responds with the 404 page for an unknown domain.
pub async fn get_records_page(
    State(store): State<FinanceStore>,
    Extension(Username(username)): Extension<Username>,
    Path(domain): Path<String>,
) -> Response {
    let Ok(domain) = domain.parse::<Domain>() else {
        return NotFoundError.into_response();
    };

    match store.list_records(&username, domain) {
        Ok(records) => records_view(domain, &records).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod records_page_tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        FinanceStore,
        auth::Username,
        record::Domain,
        test_utils::{assert_content_type, assert_valid_html, parse_html_document},
    };

    use super::get_records_page;

    fn get_store() -> FinanceStore {
        let connection = Connection::open_in_memory().unwrap();
        let store = FinanceStore::new(Arc::new(Mutex::new(connection)))
            .unwrap()
            .with_hash_cost(4);
        store.register("alice", "hunter2").unwrap();
        store.register("bob", "hunter2").unwrap();

        store
    }

    fn table_rows(document: &Html) -> Vec<Vec<String>> {
        document
            .select(&Selector::parse("tbody tr[data-record-id]").unwrap())
            .map(|row| {
                row.select(&Selector::parse("td").unwrap())
                    .map(|cell| cell.text().collect::<String>())
                    .collect()
            })
            .collect()
    }

    async fn get_page(store: FinanceStore, username: &str, domain: &str) -> Html {
        let response = get_records_page(
            State(store),
            Extension(Username(username.to_owned())),
            Path(domain.to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        document
    }

    #[tokio::test]
    async fn lists_only_the_users_records() {
        let store = get_store();
        let fields = |amount: &str, creditor: &str| {
            HashMap::from([
                ("amount".to_owned(), amount.to_owned()),
                ("creditor".to_owned(), creditor.to_owned()),
                ("interest_rate".to_owned(), "4.5".to_owned()),
            ])
        };
        store
            .add_record("alice", Domain::Debt, &fields("1200", "bank"))
            .unwrap();
        store
            .add_record("bob", Domain::Debt, &fields("5", "friend"))
            .unwrap();

        let document = get_page(store, "alice", "debt").await;

        assert_eq!(
            table_rows(&document),
            vec![vec!["1200.00", "bank", "4.5%", ""]]
        );
    }

    #[tokio::test]
    async fn page_has_add_and_import_forms() {
        let document = get_page(get_store(), "alice", "income").await;

        assert_eq!(document.select(&Selector::parse("form").unwrap()).count(), 2);
        assert_eq!(table_rows(&document), Vec::<Vec<String>>::new());
    }

    #[tokio::test]
    async fn unknown_domain_is_not_found() {
        let response = get_records_page(
            State(get_store()),
            Extension(Username("alice".to_owned())),
            Path("savings".to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
