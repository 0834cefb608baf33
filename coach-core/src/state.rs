//! Application state container.
//!
//! One `AppState` value holds auth, expenses and insights. It changes only
//! through [`reduce`], one [`Action`] at a time.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::expense::ExpenseRecord;
use crate::insight::InsightRecord;
use crate::insight_store::InsightsState;
use crate::time::same_local_month;

pub const DEMO_USER_ID: &str = "demo-user";
pub const DEMO_USER_EMAIL: &str = "demo@moneycoach.app";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
}

impl User {
    pub fn demo() -> Self {
        Self {
            uid: DEMO_USER_ID.to_string(),
            email: Some(DEMO_USER_EMAIL.to_string()),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.uid == DEMO_USER_ID
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<User>,
    #[serde(skip)]
    pub is_loading: bool,
    #[serde(skip)]
    pub error: Option<String>,
    pub is_initialized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpensesState {
    /// Newest first
    pub items: Vec<ExpenseRecord>,
    #[serde(skip)]
    pub is_loading: bool,
    #[serde(skip)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub auth: AuthState,
    pub expenses: ExpensesState,
    pub insights: InsightsState,
}

/// Every state transition the application can make.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetUser(Option<User>),
    SetDemoUser,
    SetAuthLoading(bool),
    SetAuthError(Option<String>),
    ClearAuthError,
    Logout,

    SetExpenses(Vec<ExpenseRecord>),
    AddExpense(ExpenseRecord),
    SetExpensesLoading(bool),
    SetExpensesError(Option<String>),
    ClearExpenses,

    SetInsights(Vec<InsightRecord>),
    AddInsight(InsightRecord),
    ClearLatestInsight,
    ClearInsights,
}

/// Apply one action.
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SetUser(user) => {
            state.auth.user = user;
            state.auth.is_loading = false;
            state.auth.error = None;
            state.auth.is_initialized = true;
        }
        Action::SetDemoUser => reduce(state, Action::SetUser(Some(User::demo()))),
        Action::SetAuthLoading(loading) => state.auth.is_loading = loading,
        Action::SetAuthError(error) => {
            state.auth.error = error;
            state.auth.is_loading = false;
        }
        Action::ClearAuthError => state.auth.error = None,
        Action::Logout => {
            state.auth.user = None;
            state.auth.error = None;
            state.auth.is_loading = false;
        }

        Action::SetExpenses(items) => {
            state.expenses.items = items;
            state.expenses.is_loading = false;
            state.expenses.error = None;
        }
        Action::AddExpense(expense) => state.expenses.items.insert(0, expense),
        Action::SetExpensesLoading(loading) => state.expenses.is_loading = loading,
        Action::SetExpensesError(error) => {
            state.expenses.error = error;
            state.expenses.is_loading = false;
        }
        Action::ClearExpenses => {
            state.expenses.items.clear();
            state.expenses.error = None;
        }

        Action::SetInsights(items) => state.insights.set_all(items),
        Action::AddInsight(insight) => state.insights.add(insight),
        Action::ClearLatestInsight => state.insights.clear_latest(),
        Action::ClearInsights => state.insights.clear(),
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: Action) {
        reduce(self, action);
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.user.as_ref()
    }

    /// Sum over every known expense.
    pub fn total_spent(&self) -> f64 {
        self.expenses.items.iter().map(|e| e.amount).sum()
    }

    /// Sum over expenses in the local calendar month containing `now`.
    pub fn month_total(&self, now: DateTime<Utc>, tz: Tz) -> f64 {
        self.expenses
            .items
            .iter()
            .filter(|e| same_local_month(e.created_at, now, tz))
            .map(|e| e.amount)
            .sum()
    }
}
