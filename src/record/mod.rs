//! Financial records: validation, storage and the pages for viewing and adding them.

mod core;
mod create_endpoint;
mod db;
mod domain;
mod form;
mod records_page;

pub use core::{Debt, Entry, Expense, FormFields, Goal, Income, Record, RecordId, Spending};
pub use create_endpoint::create_record_endpoint;
pub use db::{create_record_tables, get_record, get_records, insert_record};
pub use domain::Domain;
pub use records_page::get_records_page;
