//! Imports financial records from comma separated text.

use csv::{ReaderBuilder, StringRecord, Trim};
use rusqlite::Connection;

use crate::{
    Error,
    record::{Domain, Entry, FormFields, insert_record},
};

/// A row of CSV data mapped onto form field names.
struct CsvRow {
    /// The 1-based line the row starts on, for error messages.
    line: u64,
    fields: FormFields,
}

/// Import every row in `text` as a `domain` record owned by `owner`.
///
/// Rows are comma separated values, one record per line. If the first field
/// of the first row is "amount", that row is treated as a header and columns
/// are matched to fields by name. Otherwise the columns are read in the order
/// given by [Domain::fields], e.g. `50,food` for an expense. Blank lines are
/// skipped.
///
/// The import is all-or-nothing: either every row is stored or none are.
///
/// Returns the number of records imported.
///
/// # Errors
///
/// Returns an [Error::BadRequest] if:
/// - `text` has no rows,
/// - any row cannot be parsed, has too many columns or fails validation
///   (the message includes the line number),
/// - or a storage operation fails.
pub fn import_csv(
    owner: &str,
    domain: Domain,
    text: &str,
    connection: &Connection,
) -> Result<usize, Error> {
    if text.trim().is_empty() {
        return Err(Error::bad_request("the CSV data is empty"));
    }

    let rows = parse_rows(domain, text)?;

    if rows.is_empty() {
        return Err(Error::bad_request("the CSV data contains no records"));
    }

    let entries = rows
        .into_iter()
        .map(|row| {
            Entry::validate(domain, &row.fields)
                .map(|entry| (row.line, entry))
                .map_err(|error| at_line(row.line, error))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    // Dropping the transaction without committing rolls back every insert.
    let transaction = connection.unchecked_transaction()?;

    for (line, entry) in entries.iter().cloned() {
        insert_record(owner, entry, &transaction).map_err(|error| at_line(line, error))?;
    }

    transaction.commit()?;

    tracing::info!("Imported {} {domain} records for {owner}", entries.len());

    Ok(entries.len())
}

fn parse_rows(domain: Domain, text: &str) -> Result<Vec<CsvRow>, Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut header: Option<Vec<String>> = None;
    let mut seen_first_row = false;
    let mut rows = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(index as u64 + 1);

        if record.iter().all(str::is_empty) {
            continue;
        }

        let is_first_row = !seen_first_row;
        seen_first_row = true;

        if is_first_row && is_header(&record) {
            header = Some(
                record
                    .iter()
                    .map(|column| column.to_ascii_lowercase())
                    .collect(),
            );
            continue;
        }

        let columns: Vec<&str> = match &header {
            Some(header) => header.iter().map(String::as_str).collect(),
            None => domain.fields().to_vec(),
        };

        if record.len() > columns.len() {
            return Err(Error::BadRequest(format!(
                "line {line}: expected at most {} columns ({}), got {}",
                columns.len(),
                columns.join(", "),
                record.len()
            )));
        }

        let fields = columns
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_owned()))
            .collect();

        rows.push(CsvRow { line, fields });
    }

    Ok(rows)
}

fn is_header(record: &StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|first| first.eq_ignore_ascii_case("amount"))
}

fn at_line(line: u64, error: Error) -> Error {
    match error {
        Error::BadRequest(message) => Error::BadRequest(format!("line {line}: {message}")),
        error => error,
    }
}
