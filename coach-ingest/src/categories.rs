//! Map free-text category labels from exports onto the fixed category set.
//!
//! Priority: exact label > case-insensitive label > keyword rules > Other.

use std::sync::OnceLock;

use coach_core::Category;
use regex::Regex;

/// Normalize a raw category label (or merchant description) to a known category.
pub fn normalize_category(raw: &str) -> Category {
    let raw = raw.trim();
    if let Some(c) = Category::from_label(raw) {
        return c;
    }

    let lower = raw.to_lowercase();
    if let Some(c) = Category::ALL
        .into_iter()
        .find(|c| c.label().to_lowercase() == lower)
    {
        return c;
    }

    rules()
        .iter()
        .find(|(_, re)| re.is_match(&lower))
        .map(|(c, _)| *c)
        .unwrap_or(Category::Other)
}

// Whole-word keyword rules, checked in order. Bills come before shopping:
// "phone bill" is not shopping.
fn rules() -> &'static [(Category, Regex)] {
    static RULES: OnceLock<Vec<(Category, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (
                Category::FoodDining,
                r"\b(food|dining|restaurants?|grocer(y|ies)|coffee|caf[eé]|doordash|uber eats)\b",
            ),
            (
                Category::Transportation,
                r"\b(transport(ation)?|fuel|gas station|taxis?|uber|lyft|transit|parking)\b",
            ),
            (
                Category::BillsUtilities,
                r"\b(bills?|utilit(y|ies)|electric(ity)?|water|internet|phone|rent|insurance)\b",
            ),
            (
                Category::Entertainment,
                r"\b(entertainment|movies?|cinema|concerts?|netflix|spotify|games?)\b",
            ),
            (
                Category::Shopping,
                r"\b(shop(ping)?|retail|clothing|amazon|electronics|department store)\b",
            ),
        ]
        .into_iter()
        .map(|(c, pat)| (c, Regex::new(pat).expect("category pattern is valid")))
        .collect()
    })
}
