//! coach-core: expense and insight types, the rule-based insight engine,
//! and the application state container.

pub mod error;
pub mod expense;
pub mod insight;
pub mod insight_store;
pub mod session;
pub mod state;
pub mod time;

pub use error::{Error, Result};
pub use expense::{Category, ExpenseRecord, icon_for_label};
pub use insight::{
    InsightEngine, InsightKind, InsightPolicy, InsightRecord, WeeklyBreakdown, weekly_breakdown,
};
pub use insight_store::{DEFAULT_INSIGHT_CAP, InsightsState};
pub use session::Session;
pub use state::{Action, AppState, User, reduce};
