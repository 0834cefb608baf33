//! Expense record and category types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded expense, owned by one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    /// Unique identifier assigned by the record store
    pub id: String,
    /// Positive currency amount
    pub amount: f64,
    /// Category label; normally one of [`Category::ALL`], but carried as-is
    pub category: String,
    /// Optional free-text annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// When the expense was recorded (ms since epoch on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Owning user id
    pub owner_id: String,
}

impl ExpenseRecord {
    pub fn new(
        id: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            category: category.into(),
            note: None,
            created_at,
            owner_id: owner_id.into(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }

    /// The known category for this record, if the label is recognized
    pub fn known_category(&self) -> Option<Category> {
        Category::from_label(&self.category)
    }

    /// Category used for message selection; unknown labels fall back to `Other`
    pub fn category_or_other(&self) -> Category {
        self.known_category().unwrap_or(Category::Other)
    }
}

/// The fixed set of spending categories offered when recording an expense
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "Food & Dining")]
    FoodDining,
    #[serde(rename = "Transportation")]
    Transportation,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Bills & Utilities")]
    BillsUtilities,
    #[serde(rename = "Other")]
    Other,
}

/// Icon shown for category labels outside the known set
pub const UNKNOWN_CATEGORY_ICON: &str = "tag";

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 6] = [
        Category::FoodDining,
        Category::Transportation,
        Category::Shopping,
        Category::Entertainment,
        Category::BillsUtilities,
        Category::Other,
    ];

    /// Display label, also the wire value
    pub fn label(&self) -> &'static str {
        match self {
            Category::FoodDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::BillsUtilities => "Bills & Utilities",
            Category::Other => "Other",
        }
    }

    /// Exact label lookup (case-sensitive, like the record store)
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Feather icon name used by the front-end
    pub fn icon(&self) -> &'static str {
        match self {
            Category::FoodDining => "coffee",
            Category::Transportation => "truck",
            Category::Shopping => "shopping-bag",
            Category::Entertainment => "tv",
            Category::BillsUtilities => "file-text",
            Category::Other => "more-horizontal",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Icon for an arbitrary label, falling back to [`UNKNOWN_CATEGORY_ICON`]
pub fn icon_for_label(label: &str) -> &'static str {
    Category::from_label(label)
        .map(|c| c.icon())
        .unwrap_or(UNKNOWN_CATEGORY_ICON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expense_record_creation() {
        let at = Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap();
        let record = ExpenseRecord::new("exp-001", 12.5, "Food & Dining", at, "u1")
            .with_note("lunch");
        assert_eq!(record.known_category(), Some(Category::FoodDining));
        assert_eq!(record.note.as_deref(), Some("lunch"));
    }

    #[test]
    fn test_blank_note_is_dropped() {
        let at = Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap();
        let record = ExpenseRecord::new("exp-002", 3.0, "Other", at, "u1").with_note("   ");
        assert!(record.note.is_none());
    }

    #[test]
    fn test_unknown_label_falls_back_to_other() {
        let at = Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap();
        let record = ExpenseRecord::new("exp-003", 9.0, "Pets", at, "u1");
        assert_eq!(record.known_category(), None);
        assert_eq!(record.category_or_other(), Category::Other);
        assert_eq!(icon_for_label("Pets"), "tag");
    }

    #[test]
    fn test_labels_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_label(c.label()), Some(c));
        }
        assert_eq!(Category::BillsUtilities.icon(), "file-text");
    }

    #[test]
    fn test_created_at_serializes_as_millis() {
        let at = Utc.timestamp_millis_opt(1_771_416_000_123).unwrap();
        let record = ExpenseRecord::new("exp-004", 1.0, "Shopping", at, "u1");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["created_at"], 1_771_416_000_123_i64);
        assert!(json.get("note").is_none());
    }
}
