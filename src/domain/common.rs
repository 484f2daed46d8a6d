//! Shared traits and enums for expense primitives.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Exposes a stable identifier for entities held by the expense manager.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Reporting windows offered by the statistics view.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    /// Everything dated within the last seven days.
    #[default]
    Week,
    /// Same calendar month and year as the reference date.
    Month,
    /// Same calendar year as the reference date.
    Year,
    All,
}

impl StatsPeriod {
    pub const ALL: [StatsPeriod; 4] = [
        StatsPeriod::Week,
        StatsPeriod::Month,
        StatsPeriod::Year,
        StatsPeriod::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::Year => "year",
            StatsPeriod::All => "all",
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a period label is not one of `week`, `month`, `year` or `all`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period `{0}` (expected week, month, year or all)")]
pub struct UnknownPeriod(pub String);

impl FromStr for StatsPeriod {
    type Err = UnknownPeriod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" | "w" => Ok(StatsPeriod::Week),
            "month" | "monthly" | "m" => Ok(StatsPeriod::Month),
            "year" | "yearly" | "y" => Ok(StatsPeriod::Year),
            "all" | "*" => Ok(StatsPeriod::All),
            _ => Err(UnknownPeriod(value.to_string())),
        }
    }
}
