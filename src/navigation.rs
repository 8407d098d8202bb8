//! The navigation bar shown at the top of every page for logged in users.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    record::Domain,
};

/// A link in the navigation bar.
///
/// It will change appearance if `is_current` is set to `true`.
struct Link {
    url: String,
    title: &'static str,
    is_current: bool,
}

impl Link {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
        lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
        dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

/// Render the navigation bar with a link to each kind of record, marking
/// the link for `active` as the current page.
pub fn nav_bar(active: Option<Domain>) -> Markup {
    let links = Domain::ALL
        .into_iter()
        .map(|domain| Link {
            url: format_endpoint(endpoints::RECORDS_VIEW, domain),
            title: domain.title(),
            is_current: active == Some(domain),
        })
        .chain([Link {
            url: endpoints::LOG_OUT.to_owned(),
            title: "Log out",
            is_current: false,
        }]);

    // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
    html!(
        nav class="bg-white border-gray-200 dark:bg-gray-900"
        {
            div
                class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
            {
                a href=(endpoints::ROOT) class="flex items-center space-x-3 rtl:space-x-reverse"
                {
                    span
                        class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Pocketbook"
                    }
                }

                ul
                    class="font-medium flex flex-col p-4 lg:p-0 mt-4
                    border border-gray-100 rounded bg-gray-50
                    lg:flex-row lg:space-x-8 rtl:space-x-reverse lg:mt-0
                    lg:border-0 lg:bg-white dark:bg-gray-800
                    lg:dark:bg-gray-900 dark:border-gray-700"
                {
                    @for link in links {
                        li { (link.into_html()) }
                    }
                }
            }
        }
    )
}
