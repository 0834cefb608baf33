//! Insight engine: canned coaching messages selected from spending patterns.
//!
//! Two entry points:
//! - [`InsightEngine::react_to_new_expense`] runs right after an expense is recorded.
//! - [`InsightEngine::summarize_recent_activity`] runs whenever the expense list refreshes.
//!
//! Selection is a fixed rule table plus a random draw. The RNG and the clock
//! are passed in so callers (and tests) control both.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::expense::{Category, ExpenseRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Tip,
    Info,
}

impl InsightKind {
    pub fn icon(&self) -> &'static str {
        match self {
            InsightKind::Warning => "alert-triangle",
            InsightKind::Tip => "thumbs-up",
            InsightKind::Info => "info",
        }
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            InsightKind::Warning => "warning",
            InsightKind::Tip => "tip",
            InsightKind::Info => "info",
        })
    }
}

/// An advisory message produced by the engine. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub id: String,
    pub message: String,
    /// Category label when the insight is about one category; `None` for general tips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub kind: InsightKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Thresholds used by the rule table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightPolicy {
    /// A single expense strictly above this is a warning.
    pub expense_warning_threshold: f64,
    /// A weekly total strictly above this emits the high-spending warning.
    pub weekly_warning_threshold: f64,
    /// Length of the trailing window, in days.
    pub window_days: i64,
}

impl Default for InsightPolicy {
    fn default() -> Self {
        Self {
            expense_warning_threshold: 50.0,
            weekly_warning_threshold: 500.0,
            window_days: 7,
        }
    }
}

/// Most insights a single summary call can produce
pub const MAX_SUMMARY_INSIGHTS: usize = 3;

pub const GENERAL_TIPS: [&str; 5] = [
    "Set a weekly budget to stay on track!",
    "The 50/30/20 rule: 50% needs, 30% wants, 20% savings.",
    "Track every expense, no matter how small.",
    "Review your spending weekly to spot trends.",
    "Automate your savings for better financial health.",
];

/// Message pool for a category. Every pool is non-empty.
pub fn category_messages(category: Category) -> &'static [&'static str] {
    match category {
        Category::FoodDining => &[
            "You've been spending a lot on food lately. Consider meal prepping!",
            "Your dining expenses are above average this week.",
            "Great job keeping food costs reasonable this month!",
        ],
        Category::Transportation => &[
            "Transportation costs are adding up. Try carpooling?",
            "Your commute expenses seem higher than usual.",
            "Consider using public transit to save on gas.",
        ],
        Category::Shopping => &[
            "You spent quite a bit on shopping recently. Need vs want?",
            "Your shopping habits are impacting your savings.",
            "Try waiting 24 hours before making non-essential purchases.",
        ],
        Category::Entertainment => &[
            "Entertainment spending is high. Look for free activities!",
            "Consider streaming subscriptions instead of frequent outings.",
            "Balance fun with financial goals!",
        ],
        Category::BillsUtilities => &[
            "Utility bills seem consistent. Good job managing them!",
            "Consider reviewing your subscriptions for unused services.",
            "Your bills are under control this month.",
        ],
        Category::Other => &[
            "Miscellaneous expenses can add up quickly.",
            "Track your 'other' expenses to identify patterns.",
            "Every small expense counts towards your budget.",
        ],
    }
}

/// Pool for an arbitrary label; unrecognized labels use the `Other` pool.
pub fn messages_for_label(label: &str) -> &'static [&'static str] {
    category_messages(Category::from_label(label).unwrap_or(Category::Other))
}

fn pick<R: Rng + ?Sized>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool[rng.gen_range(0..pool.len())]
}

/// Spending inside the trailing window, grouped by category label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyBreakdown {
    pub total: f64,
    pub expense_count: usize,
    /// Per-label sums in order of first appearance in the input.
    pub by_category: Vec<(String, f64)>,
}

impl WeeklyBreakdown {
    /// Largest category sum. Ties go to the label seen first.
    pub fn top_category(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, sum) in &self.by_category {
            match best {
                Some((_, b)) if *sum <= b => {}
                _ => best = Some((label.as_str(), *sum)),
            }
        }
        best
    }
}

/// Aggregate the expenses with `created_at > now - window_days`.
pub fn weekly_breakdown(
    expenses: &[ExpenseRecord],
    now: DateTime<Utc>,
    window_days: i64,
) -> WeeklyBreakdown {
    let cutoff = now - Duration::days(window_days);
    let mut out = WeeklyBreakdown::default();

    for e in expenses.iter().filter(|e| e.created_at > cutoff) {
        out.total += e.amount;
        out.expense_count += 1;
        match out.by_category.iter_mut().find(|(label, _)| *label == e.category) {
            Some((_, sum)) => *sum += e.amount,
            None => out.by_category.push((e.category.clone(), e.amount)),
        }
    }

    out
}

/// Rule-based insight generator.
///
/// Holds no application state; the only interior mutability is the id counter.
#[derive(Debug, Default)]
pub struct InsightEngine {
    policy: InsightPolicy,
    seq: AtomicU64,
}

impl InsightEngine {
    pub fn new(policy: InsightPolicy) -> Self {
        Self {
            policy,
            seq: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &InsightPolicy {
        &self.policy
    }

    // Millisecond timestamps alone collide when several insights are made in one tick.
    fn next_id(&self, slot: &str, now: DateTime<Utc>) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("insight_{}_{}_{}", slot, now.timestamp_millis(), seq)
    }

    /// One insight reacting to a just-recorded expense.
    pub fn react_to_new_expense<R: Rng + ?Sized>(
        &self,
        expense: &ExpenseRecord,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> InsightRecord {
        let message = pick(category_messages(expense.category_or_other()), rng);
        let kind = if expense.amount > self.policy.expense_warning_threshold {
            InsightKind::Warning
        } else {
            InsightKind::Tip
        };

        debug!(
            expense_id = %expense.id,
            category = %expense.category,
            amount = expense.amount,
            ?kind,
            "reacting to new expense"
        );

        InsightRecord {
            id: self.next_id("expense", now),
            message: message.to_string(),
            category: Some(expense.category.clone()),
            kind,
            created_at: now,
        }
    }

    /// Summary insights over the trailing window: 1 to 3 records.
    ///
    /// Order: high-spending warning (if any), top-category info (if any), then a
    /// general tip whenever fewer than three were produced.
    pub fn summarize_recent_activity<R: Rng + ?Sized>(
        &self,
        expenses: &[ExpenseRecord],
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Vec<InsightRecord> {
        let weekly = weekly_breakdown(expenses, now, self.policy.window_days);
        let mut out = Vec::with_capacity(MAX_SUMMARY_INSIGHTS);

        debug!(
            total = weekly.total,
            count = weekly.expense_count,
            categories = weekly.by_category.len(),
            "summarizing recent activity"
        );

        if weekly.total > self.policy.weekly_warning_threshold {
            out.push(InsightRecord {
                id: self.next_id("high_spending", now),
                message: format!(
                    "You've spent ${:.2} this week. That's quite a lot!",
                    weekly.total
                ),
                category: None,
                kind: InsightKind::Warning,
                created_at: now,
            });
        }

        if let Some((label, sum)) = weekly.top_category() {
            let lead = messages_for_label(label)[0];
            out.push(InsightRecord {
                id: self.next_id("top_category", now),
                message: format!(
                    "{} is your biggest expense category (${:.2}). {}",
                    label, sum, lead
                ),
                category: Some(label.to_string()),
                kind: InsightKind::Info,
                created_at: now,
            });
        }

        if out.len() < MAX_SUMMARY_INSIGHTS {
            out.push(InsightRecord {
                id: self.next_id("tip", now),
                message: pick(&GENERAL_TIPS, rng).to_string(),
                category: None,
                kind: InsightKind::Tip,
                created_at: now,
            });
        }

        out
    }
}
