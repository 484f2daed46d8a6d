pub mod common;
pub mod expense;

pub use common::{Amounted, Identifiable, StatsPeriod, UnknownPeriod};
pub use expense::{Expense, ExpenseDraft, NewExpense, DEFAULT_CATEGORIES};
