//! JSON representation of the stored expense list.

use crate::domain::Expense;

use super::Result;

/// Serializes the full list as a compact JSON array.
pub fn encode_expenses(expenses: &[Expense]) -> Result<String> {
    Ok(serde_json::to_string(expenses)?)
}

/// Parses a stored JSON array, preserving element order.
pub fn decode_expenses(raw: &str) -> Result<Vec<Expense>> {
    Ok(serde_json::from_str(raw)?)
}
