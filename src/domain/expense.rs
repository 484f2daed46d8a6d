//! Domain model for recorded expenses and the raw form input that creates them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;
use crate::errors::ExpenseError;

/// Category suggestions offered by input forms. Not enforced by the manager.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Food",
    "Transport",
    "Shopping",
    "Bills",
    "Entertainment",
    "Other",
];

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";
pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid amount";

/// A single recorded monetary outflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub category: String,
    #[serde(with = "iso_datetime")]
    pub date: DateTime<Utc>,
}

impl Expense {
    /// Attaches an identifier to expense data.
    pub fn from_new(id: impl Into<String>, data: NewExpense) -> Self {
        let NewExpense {
            amount,
            description,
            category,
            date,
        } = data;
        Self {
            id: id.into(),
            amount,
            description,
            category,
            date,
        }
    }

    /// Returns the id as an integer when it was issued from a timestamp.
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.parse().ok()
    }
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Expense data without an identifier; the input to `add`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: DateTime<Utc>,
}

impl NewExpense {
    pub fn new(
        amount: f64,
        description: impl Into<String>,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            category: category.into(),
            date,
        }
    }
}

/// Unvalidated text collected by an input form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub amount: String,
    pub description: String,
    pub category: String,
    pub date: Option<String>,
}

impl ExpenseDraft {
    pub fn new(
        amount: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            description: description.into(),
            category: category.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Checks the draft and converts it into [`NewExpense`].
    ///
    /// A missing date resolves to `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<NewExpense, ExpenseError> {
        let amount = self.amount.trim();
        let description = self.description.trim();
        let category = self.category.trim();
        if amount.is_empty() || description.is_empty() || category.is_empty() {
            return Err(ExpenseError::InvalidInput(MISSING_FIELDS_MESSAGE.into()));
        }

        let amount = parse_amount(amount)
            .ok_or_else(|| ExpenseError::InvalidInput(INVALID_AMOUNT_MESSAGE.into()))?;

        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => now,
            Some(raw) => parse_date(raw).ok_or_else(|| {
                ExpenseError::InvalidInput(format!(
                    "Invalid date `{}` (expected YYYY-MM-DD)",
                    raw
                ))
            })?,
        };

        Ok(NewExpense::new(amount, description, category, date))
    }
}

/// Parses a strictly positive, finite amount.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().trim_start_matches('$').parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Stores dates as ISO-8601 UTC strings with millisecond precision.
pub mod iso_datetime {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid expense date `{}`", raw)))
    }
}
