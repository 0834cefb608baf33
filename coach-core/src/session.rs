//! Session: the use cases the front-end drives (sign in/out, record an
//! expense, apply a refreshed expense list), wired to the insight engine.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::expense::ExpenseRecord;
use crate::insight::{InsightEngine, InsightRecord};
use crate::state::{Action, AppState, User};

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Trim + lowercase, then check the `local@domain.tld` shape.
pub fn normalize_email(email: &str) -> Result<String> {
    let e = email.trim().to_lowercase();
    if !email_re().is_match(&e) {
        return Err(Error::InvalidEmail(email.trim().to_string()));
    }
    Ok(e)
}

pub struct Session<R = StdRng> {
    state: AppState,
    engine: InsightEngine,
    rng: R,
}

impl Session<StdRng> {
    pub fn from_entropy(state: AppState, engine: InsightEngine) -> Self {
        Self::new(state, engine, StdRng::from_entropy())
    }
}

impl<R: Rng> Session<R> {
    pub fn new(state: AppState, engine: InsightEngine, rng: R) -> Self {
        Self { state, engine, rng }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn engine(&self) -> &InsightEngine {
        &self.engine
    }

    pub fn into_state(self) -> AppState {
        self.state
    }

    pub fn sign_in(&mut self, email: &str) -> Result<&User> {
        let email = match normalize_email(email) {
            Ok(e) => e,
            Err(err) => {
                self.state.dispatch(Action::SetAuthError(Some(err.to_string())));
                return Err(err);
            }
        };

        self.state.dispatch(Action::SetAuthLoading(true));
        let user = User {
            uid: email.clone(),
            email: Some(email),
        };
        self.switch_user(user);
        debug!(uid = %self.current_uid().unwrap_or_default(), "signed in");

        self.state.user().ok_or(Error::NotSignedIn)
    }

    pub fn continue_as_guest(&mut self) {
        self.switch_user(User::demo());
        debug!("continuing as guest");
    }

    /// Drop the user and everything loaded for them.
    pub fn sign_out(&mut self) {
        self.state.dispatch(Action::Logout);
        self.state.dispatch(Action::ClearExpenses);
        self.state.dispatch(Action::ClearInsights);
        debug!("signed out");
    }

    // A different user must not see the previous user's data.
    fn switch_user(&mut self, user: User) {
        if self.current_uid().is_some_and(|uid| uid != user.uid) {
            self.state.dispatch(Action::ClearExpenses);
            self.state.dispatch(Action::ClearInsights);
        }
        self.state.dispatch(Action::SetUser(Some(user)));
    }

    fn current_uid(&self) -> Option<String> {
        self.state.user().map(|u| u.uid.clone())
    }

    /// Record a new expense for the signed-in user and react to it.
    pub fn record_expense(
        &mut self,
        amount: f64,
        category: &str,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(ExpenseRecord, InsightRecord)> {
        let uid = self.current_uid().ok_or(Error::NotSignedIn)?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidAmount(amount));
        }

        let id = format!("exp_{}_{:08x}", now.timestamp_millis(), self.rng.r#gen::<u32>());
        let mut expense = ExpenseRecord::new(id, amount, category, now, uid);
        if let Some(note) = note {
            expense = expense.with_note(note);
        }

        self.state.dispatch(Action::AddExpense(expense.clone()));

        let insight = self.engine.react_to_new_expense(&expense, &mut self.rng, now);
        self.state.dispatch(Action::AddInsight(insight.clone()));

        debug!(
            expense_id = %expense.id,
            amount,
            category,
            insight_kind = ?insight.kind,
            "recorded expense"
        );

        Ok((expense, insight))
    }

    /// Apply a refreshed expense list (the live-subscription push).
    ///
    /// Keeps the current user's records, newest first, then adds the summary insights.
    pub fn apply_snapshot(
        &mut self,
        expenses: Vec<ExpenseRecord>,
        now: DateTime<Utc>,
    ) -> Vec<InsightRecord> {
        let Some(uid) = self.current_uid() else {
            self.state.dispatch(Action::SetExpenses(Vec::new()));
            return Vec::new();
        };

        let mut mine: Vec<ExpenseRecord> = expenses
            .into_iter()
            .filter(|e| e.owner_id == uid)
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        self.state.dispatch(Action::SetExpenses(mine));

        let insights = self
            .engine
            .summarize_recent_activity(&self.state.expenses.items, &mut self.rng, now);
        for insight in &insights {
            self.state.dispatch(Action::AddInsight(insight.clone()));
        }

        debug!(
            expenses = self.state.expenses.items.len(),
            insights = insights.len(),
            "applied expense snapshot"
        );

        insights
    }

    pub fn dismiss_latest(&mut self) {
        self.state.dispatch(Action::ClearLatestInsight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::InsightKind;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 18, 30, 0).unwrap()
    }

    fn session() -> Session<StdRng> {
        Session::new(AppState::new(), InsightEngine::default(), StdRng::seed_from_u64(17))
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
        assert!(matches!(normalize_email("nope"), Err(Error::InvalidEmail(_))));
        assert!(matches!(normalize_email("a b@c.d"), Err(Error::InvalidEmail(_))));
    }

    #[test]
    fn test_record_requires_user_and_positive_amount() {
        let mut s = session();
        assert_eq!(
            s.record_expense(10.0, "Shopping", None, now()).unwrap_err(),
            Error::NotSignedIn
        );

        s.continue_as_guest();
        assert_eq!(
            s.record_expense(0.0, "Shopping", None, now()).unwrap_err(),
            Error::InvalidAmount(0.0)
        );
        assert!(s.record_expense(f64::NAN, "Shopping", None, now()).is_err());
        assert!(s.state().expenses.items.is_empty());
    }

    #[test]
    fn test_record_adds_expense_and_latest_insight() {
        let mut s = session();
        s.sign_in("me@example.com").unwrap();

        let (expense, insight) = s.record_expense(75.0, "Entertainment", Some("concert"), now()).unwrap();
        assert_eq!(expense.owner_id, "me@example.com");
        assert_eq!(expense.note.as_deref(), Some("concert"));
        assert_eq!(insight.kind, InsightKind::Warning);

        let state = s.state();
        assert_eq!(state.expenses.items[0].id, expense.id);
        assert_eq!(state.insights.latest(), Some(&insight));
        assert_eq!(state.insights.len(), 1);
    }

    #[test]
    fn test_invalid_sign_in_sets_auth_error() {
        let mut s = session();
        assert!(s.sign_in("bad-email").is_err());
        assert!(s.state().auth.error.is_some());
        assert!(s.state().user().is_none());
    }

    #[test]
    fn test_snapshot_filters_sorts_and_summarizes() {
        let mut s = session();
        s.sign_in("me@example.com").unwrap();

        let snapshot = vec![
            ExpenseRecord::new("old", 20.0, "Other", now() - Duration::days(2), "me@example.com"),
            ExpenseRecord::new("new", 600.0, "Shopping", now() - Duration::hours(1), "me@example.com"),
            ExpenseRecord::new("theirs", 1000.0, "Shopping", now(), "someone@else.com"),
        ];
        let insights = s.apply_snapshot(snapshot, now());

        let ids: Vec<_> = s.state().expenses.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);

        assert_eq!(insights.len(), 3);
        assert!(insights[0].message.contains("620.00"));
        assert_eq!(s.state().insights.len(), 3);
        // Most recent first: the tip was added last
        assert_eq!(s.state().insights.items()[0].kind, InsightKind::Tip);
        assert_eq!(s.state().insights.latest(), insights.last());
    }

    #[test]
    fn test_snapshot_without_user_clears_expenses() {
        let mut s = session();
        let out = s.apply_snapshot(
            vec![ExpenseRecord::new("a", 5.0, "Other", now(), "x")],
            now(),
        );
        assert!(out.is_empty());
        assert!(s.state().expenses.items.is_empty());
    }

    #[test]
    fn test_sign_out_clears_everything() {
        let mut s = session();
        s.continue_as_guest();
        s.record_expense(12.0, "Food & Dining", None, now()).unwrap();
        s.sign_out();

        let state = s.into_state();
        assert!(state.user().is_none());
        assert!(state.expenses.items.is_empty());
        assert!(state.insights.is_empty());
        assert!(state.insights.latest().is_none());
    }

    #[test]
    fn test_switching_user_drops_previous_data() {
        let mut s = session();
        s.sign_in("first@example.com").unwrap();
        s.record_expense(12.0, "Shopping", None, now()).unwrap();

        s.sign_in("FIRST@example.com").unwrap();
        assert_eq!(s.state().expenses.items.len(), 1);

        s.sign_in("second@example.com").unwrap();
        assert!(s.state().expenses.items.is_empty());
        assert!(s.state().insights.is_empty());
    }
}
