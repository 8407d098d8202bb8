//! Bulk import of financial records from CSV text.

mod import;
mod import_endpoint;

pub use import::import_csv;
pub use import_endpoint::{import_csv_endpoint, import_form};
