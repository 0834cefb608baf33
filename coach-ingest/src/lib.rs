//! coach-ingest: expense CSV import with category and amount normalization.

pub mod categories;
pub mod expense_csv;

pub use categories::normalize_category;
pub use expense_csv::{merge_imported, parse_amount, parse_expense_csv, parse_expense_reader};
