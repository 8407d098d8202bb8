//! The kinds of financial record a user can keep.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The five kinds of financial record, each stored in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// One-off purchases.
    Spending,
    /// Regular bills and outgoings.
    Expense,
    /// Savings targets.
    Goal,
    /// Money owed to a creditor.
    Debt,
    /// Money coming in.
    Income,
}

impl Domain {
    /// Every domain, in the order they are shown in the navigation bar.
    pub const ALL: [Domain; 5] = [
        Domain::Spending,
        Domain::Expense,
        Domain::Goal,
        Domain::Debt,
        Domain::Income,
    ];

    /// The tag used in URLs and forms, e.g. "spending".
    pub fn key(&self) -> &'static str {
        match self {
            Self::Spending => "spending",
            Self::Expense => "expense",
            Self::Goal => "goal",
            Self::Debt => "debt",
            Self::Income => "income",
        }
    }

    /// The name of the table the domain's records are stored in.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Spending => "spending",
            Self::Expense => "expense",
            Self::Goal => "goal",
            Self::Debt => "debt",
            Self::Income => "income",
        }
    }

    /// A human readable, plural name for page titles.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Spending => "Spending",
            Self::Expense => "Expenses",
            Self::Goal => "Goals",
            Self::Debt => "Debts",
            Self::Income => "Income",
        }
    }

    /// The form fields for the domain, in CSV column order.
    ///
    /// `amount` always comes first. The required fields come before the optional ones.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Spending => &["amount", "category", "date", "description"],
            Self::Expense => &["amount", "description", "due_date"],
            Self::Goal => &["amount", "description", "target_date"],
            Self::Debt => &["amount", "creditor", "interest_rate", "due_date"],
            Self::Income => &["amount", "source", "date"],
        }
    }

    /// Whether a record of this domain must have a value for `field`.
    pub fn is_required(&self, field: &str) -> bool {
        self.fields()[..2].contains(&field)
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|domain| domain.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::BadRequest(format!("unknown record type \"{s}\"")))
    }
}
