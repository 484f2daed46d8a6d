use crate::config::Config;
use crate::domain::Expense;

const DESCRIPTION_WIDTH: usize = 28;

/// One list row: position, id, date, category, description, amount.
pub fn expense_row(config: &Config, position: usize, expense: &Expense) -> String {
    format!(
        "  #{:<3} {:<14} {}  {:<13} {:<width$} {:>12}",
        position,
        expense.id,
        expense.date.format("%Y-%m-%d"),
        expense.category,
        truncate(&expense.description, DESCRIPTION_WIDTH),
        config.format_amount(expense.amount),
        width = DESCRIPTION_WIDTH,
    )
}

pub fn share_percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}
