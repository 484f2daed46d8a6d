//! Aggregation helpers for expense totals and category breakdowns.

use std::{cmp::Ordering, collections::HashMap};

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use crate::domain::{Amounted, Expense, StatsPeriod};

/// Spending attributed to one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
    /// Fraction of the summarized total, in `0.0..=1.0`.
    pub share: f64,
}

/// Totals for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseSummary {
    pub period: StatsPeriod,
    pub total: f64,
    pub count: usize,
    pub categories: Vec<CategoryTotal>,
}

impl ExpenseSummary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Aggregates expense lists for the list, home and statistics views.
///
/// See also: [`ExpenseSummary`] for the returned data model.
pub struct SummaryService;

impl SummaryService {
    pub fn total<'a, T: Amounted + 'a>(items: impl IntoIterator<Item = &'a T>) -> f64 {
        items.into_iter().map(Amounted::amount).sum()
    }

    /// Returns whether `date` falls inside `period` relative to `now`.
    pub fn period_contains(period: StatsPeriod, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match period {
            StatsPeriod::Week => now.signed_duration_since(date) <= Duration::days(7),
            StatsPeriod::Month => date.year() == now.year() && date.month() == now.month(),
            StatsPeriod::Year => date.year() == now.year(),
            StatsPeriod::All => true,
        }
    }

    /// Filters to `period`, keeping the original order.
    pub fn in_period(
        expenses: &[Expense],
        period: StatsPeriod,
        now: DateTime<Utc>,
    ) -> Vec<&Expense> {
        expenses
            .iter()
            .filter(|expense| Self::period_contains(period, expense.date, now))
            .collect()
    }

    /// Filters to one category, compared case-insensitively.
    pub fn in_category<'a>(expenses: &'a [Expense], category: &str) -> Vec<&'a Expense> {
        let needle = category.trim();
        expenses
            .iter()
            .filter(|expense| expense.category.trim().eq_ignore_ascii_case(needle))
            .collect()
    }

    /// Groups by category, largest total first, ties broken by name.
    pub fn category_breakdown<'a>(
        expenses: impl IntoIterator<Item = &'a Expense>,
    ) -> Vec<CategoryTotal> {
        let mut grouped: HashMap<&str, (f64, usize)> = HashMap::new();
        let mut grand_total = 0.0;
        for expense in expenses {
            let entry = grouped.entry(expense.category.as_str()).or_default();
            entry.0 += expense.amount;
            entry.1 += 1;
            grand_total += expense.amount;
        }

        let mut rows: Vec<CategoryTotal> = grouped
            .into_iter()
            .map(|(category, (total, count))| CategoryTotal {
                category: category.to_string(),
                total,
                count,
                share: if grand_total > 0.0 {
                    total / grand_total
                } else {
                    0.0
                },
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        rows
    }

    pub fn summarize(
        expenses: &[Expense],
        period: StatsPeriod,
        now: DateTime<Utc>,
    ) -> ExpenseSummary {
        let selected = Self::in_period(expenses, period, now);
        ExpenseSummary {
            period,
            total: Self::total(selected.iter().copied()),
            count: selected.len(),
            categories: Self::category_breakdown(selected),
        }
    }

    /// Newest `limit` expenses by date. The input order is left untouched.
    pub fn recent(expenses: &[Expense], limit: usize) -> Vec<&Expense> {
        let mut sorted: Vec<&Expense> = expenses.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.truncate(limit);
        sorted
    }
}
