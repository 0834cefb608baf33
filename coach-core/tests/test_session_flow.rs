use chrono::{Duration, TimeZone, Utc};
use coach_core::insight::{GENERAL_TIPS, category_messages};
use coach_core::{
    AppState, Category, ExpenseRecord, InsightEngine, InsightKind, InsightPolicy, Session,
    DEFAULT_INSIGHT_CAP,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A week of activity: record expenses one by one, then refresh from the
/// "backend" list and check the retained insights stay bounded and ordered.
#[test]
fn test_week_of_expenses_keeps_insights_bounded() {
    let start = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
    let mut session = Session::new(
        AppState::new(),
        InsightEngine::new(InsightPolicy::default()),
        StdRng::seed_from_u64(2026),
    );
    session.sign_in("coach@example.com").unwrap();

    let plan = [
        (12.0, Category::FoodDining),
        (64.0, Category::Shopping),
        (8.5, Category::Transportation),
        (120.0, Category::BillsUtilities),
        (30.0, Category::Entertainment),
        (220.0, Category::Shopping),
        (9.99, Category::Other),
        (45.0, Category::FoodDining),
        (18.0, Category::Transportation),
        (51.0, Category::Entertainment),
        (70.0, Category::Shopping),
        (5.0, Category::Other),
    ];

    for (i, (amount, category)) in plan.iter().enumerate() {
        let now = start + Duration::hours(i as i64 * 12);
        let (_, insight) = session
            .record_expense(*amount, category.label(), None, now)
            .unwrap();

        let expected = if *amount > 50.0 { InsightKind::Warning } else { InsightKind::Tip };
        assert_eq!(insight.kind, expected);
        assert!(category_messages(*category).contains(&insight.message.as_str()));
    }

    let state = session.state();
    assert_eq!(state.expenses.items.len(), plan.len());
    assert_eq!(state.insights.len(), DEFAULT_INSIGHT_CAP);
    // Newest first, so created_at never increases down the list
    for w in state.insights.items().windows(2) {
        assert!(w[0].created_at >= w[1].created_at);
    }

    // Refresh from the backend list
    let refresh_at = start + Duration::days(6);
    let backend: Vec<ExpenseRecord> = state.expenses.items.clone();
    let insights = session.apply_snapshot(backend, refresh_at);

    let total: f64 = plan.iter().map(|(a, _)| a).sum();
    assert!(total > 500.0);
    assert_eq!(insights.len(), 3);
    assert_eq!(insights[0].kind, InsightKind::Warning);
    assert!(insights[0].message.contains(&format!("{:.2}", total)));
    assert_eq!(insights[1].category.as_deref(), Some("Shopping"));
    assert!(insights[1].message.contains("$354.00"));
    assert!(GENERAL_TIPS.contains(&insights[2].message.as_str()));

    let state = session.state();
    assert_eq!(state.insights.len(), DEFAULT_INSIGHT_CAP);
    assert_eq!(state.insights.items()[0].id, insights[2].id);
    assert_eq!(state.insights.latest().map(|i| &i.id), Some(&insights[2].id));
}

#[test]
fn test_stale_history_only_yields_tip() {
    let now = Utc.with_ymd_and_hms(2026, 4, 20, 8, 0, 0).unwrap();
    let mut session = Session::new(AppState::new(), InsightEngine::default(), StdRng::seed_from_u64(1));
    session.continue_as_guest();

    let old: Vec<ExpenseRecord> = (0..5)
        .map(|i| {
            ExpenseRecord::new(
                format!("old-{i}"),
                400.0,
                "Shopping",
                now - Duration::days(8 + i),
                "demo-user",
            )
        })
        .collect();

    let insights = session.apply_snapshot(old, now);
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].kind, InsightKind::Tip);
    assert!(insights[0].category.is_none());
    assert_eq!(session.state().expenses.items.len(), 5);
}
