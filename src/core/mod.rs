//! Expense state management and the services built on top of it.

pub mod clock;
pub mod expense_manager;
pub mod services;

pub use clock::{Clock, ManualClock, SystemClock};
pub use expense_manager::{ExpenseHandle, ExpenseManager, ExpenseState};
