//! Database operations for financial records.
//!
//! Each [Domain] is stored in its own table. Every table has an `owner` column
//! that references the username of a registered user.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    record::{Debt, Domain, Entry, Expense, Goal, Income, Record, RecordId, Spending},
};

/// Create the tables for every record domain if they do not exist.
pub fn create_record_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS spending (
            id INTEGER PRIMARY KEY,
            owner TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            category TEXT NOT NULL,
            date TEXT,
            description TEXT,
            FOREIGN KEY(owner) REFERENCES user(username) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            owner TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            description TEXT NOT NULL,
            due_date TEXT,
            FOREIGN KEY(owner) REFERENCES user(username) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            owner TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            description TEXT NOT NULL,
            target_date TEXT,
            FOREIGN KEY(owner) REFERENCES user(username) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS debt (
            id INTEGER PRIMARY KEY,
            owner TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            creditor TEXT NOT NULL,
            interest_rate REAL CHECK (interest_rate IS NULL OR interest_rate >= 0),
            due_date TEXT,
            FOREIGN KEY(owner) REFERENCES user(username) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS income (
            id INTEGER PRIMARY KEY,
            owner TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            source TEXT NOT NULL,
            date TEXT,
            FOREIGN KEY(owner) REFERENCES user(username) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_spending_owner ON spending(owner);
        CREATE INDEX IF NOT EXISTS idx_expense_owner ON expense(owner);
        CREATE INDEX IF NOT EXISTS idx_goal_owner ON goal(owner);
        CREATE INDEX IF NOT EXISTS idx_debt_owner ON debt(owner);
        CREATE INDEX IF NOT EXISTS idx_income_owner ON income(owner);",
    )?;

    Ok(())
}

/// Insert `entry` into the table for its domain and return the stored record.
///
/// # Errors
///
/// Returns an [Error::BadRequest] if `owner` is not a registered user or
/// there is some other SQL error.
pub fn insert_record(owner: &str, entry: Entry, connection: &Connection) -> Result<Record, Error> {
    match &entry {
        Entry::Spending(spending) => connection.execute(
            "INSERT INTO spending (owner, amount, category, date, description)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                owner,
                spending.amount,
                &spending.category,
                spending.date,
                &spending.description,
            ),
        )?,
        Entry::Expense(expense) => connection.execute(
            "INSERT INTO expense (owner, amount, description, due_date) VALUES (?1, ?2, ?3, ?4)",
            (owner, expense.amount, &expense.description, expense.due_date),
        )?,
        Entry::Goal(goal) => connection.execute(
            "INSERT INTO goal (owner, amount, description, target_date) VALUES (?1, ?2, ?3, ?4)",
            (owner, goal.amount, &goal.description, goal.target_date),
        )?,
        Entry::Debt(debt) => connection.execute(
            "INSERT INTO debt (owner, amount, creditor, interest_rate, due_date)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                owner,
                debt.amount,
                &debt.creditor,
                debt.interest_rate,
                debt.due_date,
            ),
        )?,
        Entry::Income(income) => connection.execute(
            "INSERT INTO income (owner, amount, source, date) VALUES (?1, ?2, ?3, ?4)",
            (owner, income.amount, &income.source, income.date),
        )?,
    };

    let id = connection.last_insert_rowid();

    Ok(Record {
        id,
        owner: owner.to_owned(),
        entry,
    })
}

/// Retrieve all of `owner`'s records for `domain`, oldest first.
///
/// Each call runs a new query. An owner with no records gets an empty vector.
pub fn get_records(
    domain: Domain,
    owner: &str,
    connection: &Connection,
) -> Result<Vec<Record>, Error> {
    let query = format!(
        "SELECT {} FROM {} WHERE owner = :owner ORDER BY id ASC;",
        select_columns(domain),
        domain.table_name()
    );

    connection
        .prepare(&query)?
        .query_map(rusqlite::named_params! { ":owner": owner }, |row| {
            map_row(domain, row)
        })?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single record by ID.
///
/// # Errors
///
/// Returns an [Error::KeyNotFound] if there is no record with `id` in the
/// domain's table, or if the record belongs to another user.
pub fn get_record(
    domain: Domain,
    owner: &str,
    id: RecordId,
    connection: &Connection,
) -> Result<Record, Error> {
    let query = format!(
        "SELECT {} FROM {} WHERE id = :id AND owner = :owner;",
        select_columns(domain),
        domain.table_name()
    );

    connection
        .prepare(&query)?
        .query_row(
            rusqlite::named_params! { ":id": id, ":owner": owner },
            |row| map_row(domain, row),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::KeyNotFound(format!("{domain} record {id}"))
            }
            error => error.into(),
        })
}

/// The columns [map_row] expects, in order.
fn select_columns(domain: Domain) -> String {
    format!("id, owner, {}", domain.fields().join(", "))
}

fn map_row(domain: Domain, row: &Row) -> Result<Record, rusqlite::Error> {
    let id = row.get(0)?;
    let owner = row.get(1)?;
    let amount = row.get(2)?;

    let entry = match domain {
        Domain::Spending => Entry::Spending(Spending {
            amount,
            category: row.get(3)?,
            date: row.get(4)?,
            description: row.get(5)?,
        }),
        Domain::Expense => Entry::Expense(Expense {
            amount,
            description: row.get(3)?,
            due_date: row.get(4)?,
        }),
        Domain::Goal => Entry::Goal(Goal {
            amount,
            description: row.get(3)?,
            target_date: row.get(4)?,
        }),
        Domain::Debt => Entry::Debt(Debt {
            amount,
            creditor: row.get(3)?,
            interest_rate: row.get(4)?,
            due_date: row.get(5)?,
        }),
        Domain::Income => Entry::Income(Income {
            amount,
            source: row.get(3)?,
            date: row.get(4)?,
        }),
    };

    Ok(Record { id, owner, entry })
}
