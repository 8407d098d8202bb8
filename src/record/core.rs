//! The typed financial records and the validation that turns raw form input into them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, record::Domain};

/// Raw form input: field name to the string the user typed.
pub type FormFields = HashMap<String, String>;

/// Alias for the integer type used for record IDs.
pub type RecordId = i64;

/// Dates are entered in the format submitted by HTML date inputs, e.g. "2025-01-31".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A one-off purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spending {
    pub amount: f64,
    pub category: String,
    pub date: Option<Date>,
    pub description: Option<String>,
}

/// A regular bill or outgoing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub amount: f64,
    pub description: String,
    pub due_date: Option<Date>,
}

/// An amount the user wants to save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub amount: f64,
    pub description: String,
    pub target_date: Option<Date>,
}

/// Money owed to a creditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub amount: f64,
    pub creditor: String,
    /// The yearly interest rate as a percentage, e.g. 4.5 for 4.5%.
    pub interest_rate: Option<f64>,
    pub due_date: Option<Date>,
}

/// Money coming in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub amount: f64,
    pub source: String,
    pub date: Option<Date>,
}

/// A validated financial record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    Spending(Spending),
    Expense(Expense),
    Goal(Goal),
    Debt(Debt),
    Income(Income),
}

/// A financial record that has been stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The ID of the record within its domain's table.
    pub id: RecordId,
    /// The username of the user that owns the record.
    pub owner: String,
    pub entry: Entry,
}

impl Entry {
    /// Validate raw form input for `domain`.
    ///
    /// Surrounding whitespace is ignored, and a field that is empty after trimming is treated as
    /// missing. Fields that are not listed in [Domain::fields] are ignored.
    ///
    /// # Errors
    ///
    /// Returns an [Error::BadRequest] naming the field if:
    /// - a required field is missing or empty,
    /// - an amount or interest rate is not a finite, non-negative number,
    /// - or a date is not in the format "YYYY-MM-DD".
    pub fn validate(domain: Domain, fields: &FormFields) -> Result<Self, Error> {
        let fields = FieldReader(fields);

        let entry = match domain {
            Domain::Spending => Entry::Spending(Spending {
                amount: fields.amount()?,
                category: fields.required_text("category")?,
                date: fields.optional_date("date")?,
                description: fields.optional_text("description"),
            }),
            Domain::Expense => Entry::Expense(Expense {
                amount: fields.amount()?,
                description: fields.required_text("description")?,
                due_date: fields.optional_date("due_date")?,
            }),
            Domain::Goal => Entry::Goal(Goal {
                amount: fields.amount()?,
                description: fields.required_text("description")?,
                target_date: fields.optional_date("target_date")?,
            }),
            Domain::Debt => Entry::Debt(Debt {
                amount: fields.amount()?,
                creditor: fields.required_text("creditor")?,
                interest_rate: fields.optional_number("interest_rate")?,
                due_date: fields.optional_date("due_date")?,
            }),
            Domain::Income => Entry::Income(Income {
                amount: fields.amount()?,
                source: fields.required_text("source")?,
                date: fields.optional_date("date")?,
            }),
        };

        Ok(entry)
    }

    /// The domain this entry belongs to.
    pub fn domain(&self) -> Domain {
        match self {
            Entry::Spending(_) => Domain::Spending,
            Entry::Expense(_) => Domain::Expense,
            Entry::Goal(_) => Domain::Goal,
            Entry::Debt(_) => Domain::Debt,
            Entry::Income(_) => Domain::Income,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            Entry::Spending(spending) => spending.amount,
            Entry::Expense(expense) => expense.amount,
            Entry::Goal(goal) => goal.amount,
            Entry::Debt(debt) => debt.amount,
            Entry::Income(income) => income.amount,
        }
    }

    /// The entry's values formatted for display, in the same order as [Domain::fields].
    ///
    /// Missing optional values are rendered as an empty string.
    pub fn display_values(&self) -> Vec<String> {
        fn date(date: &Option<Date>) -> String {
            date.map(|date| date.to_string()).unwrap_or_default()
        }

        let amount = format!("{:.2}", self.amount());

        match self {
            Entry::Spending(spending) => vec![
                amount,
                spending.category.clone(),
                date(&spending.date),
                spending.description.clone().unwrap_or_default(),
            ],
            Entry::Expense(expense) => {
                vec![amount, expense.description.clone(), date(&expense.due_date)]
            }
            Entry::Goal(goal) => vec![amount, goal.description.clone(), date(&goal.target_date)],
            Entry::Debt(debt) => vec![
                amount,
                debt.creditor.clone(),
                debt.interest_rate
                    .map(|rate| format!("{rate}%"))
                    .unwrap_or_default(),
                date(&debt.due_date),
            ],
            Entry::Income(income) => vec![amount, income.source.clone(), date(&income.date)],
        }
    }
}

/// Reads and coerces individual fields from raw form input.
struct FieldReader<'a>(&'a FormFields);

impl FieldReader<'_> {
    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn required_text(&self, name: &str) -> Result<String, Error> {
        self.get(name)
            .map(str::to_owned)
            .ok_or_else(|| Error::BadRequest(format!("{name} is required")))
    }

    fn optional_text(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_owned)
    }

    fn amount(&self) -> Result<f64, Error> {
        let raw_amount = self
            .get("amount")
            .ok_or_else(|| Error::bad_request("amount is required"))?;

        parse_non_negative_number("amount", raw_amount)
    }

    fn optional_number(&self, name: &str) -> Result<Option<f64>, Error> {
        self.get(name)
            .map(|raw| parse_non_negative_number(name, raw))
            .transpose()
    }

    fn optional_date(&self, name: &str) -> Result<Option<Date>, Error> {
        self.get(name).map(|raw| parse_date(name, raw)).transpose()
    }
}

/// Parse a finite number that is zero or greater.
fn parse_non_negative_number(name: &str, raw: &str) -> Result<f64, Error> {
    let error = || Error::BadRequest(format!("{name} must be a non-negative number, got \"{raw}\""));

    let number: f64 = raw.parse().map_err(|_| error())?;

    if !number.is_finite() || number < 0.0 {
        return Err(error());
    }

    Ok(number)
}

/// Parse a date in the format "YYYY-MM-DD".
fn parse_date(name: &str, raw: &str) -> Result<Date, Error> {
    Date::parse(raw, DATE_FORMAT).map_err(|_| {
        Error::BadRequest(format!(
            "{name} must be a date in the format YYYY-MM-DD, got \"{raw}\""
        ))
    })
}
