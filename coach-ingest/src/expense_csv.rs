//! Parse expense CSV exports into `ExpenseRecord`s.
//!
//! Expected header (case-insensitive, any order):
//! date|created_at, amount, category, [note], [id]
//!
//! Amounts may carry a currency symbol and thousands separators.
//! Rows with unparseable dates, non-positive or unparseable amounts are skipped.
//!
//! Rows without an `id` get a content-derived one, so importing the same
//! export twice yields the same ids and [`merge_imported`] adds nothing.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use coach_core::ExpenseRecord;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::categories::normalize_category;

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(-)?\s*[$€£]?\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?$")
            .expect("amount pattern is valid")
    })
}

/// Parse "$1,234.50", "12", "-3.5". Returns `None` for anything else.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let caps = amount_re().captures(raw.trim())?;
    let whole = caps.get(2)?.as_str().replace(',', "");
    let frac = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    let value: f64 = format!("{whole}{frac}").parse().ok()?;
    Some(if caps.get(1).is_some() { -value } else { value })
}

/// RFC 3339, YYYY-MM-DD, MM/DD/YYYY, or epoch milliseconds.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
        }
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Stable id for a row that has none: owner, timestamp, amount, category and
/// note, plus how many identical rows came before it in the same file.
fn import_id(
    owner_id: &str,
    created_at: DateTime<Utc>,
    amount: f64,
    category: &str,
    note: Option<&str>,
    occurrence: u32,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(owner_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(created_at.timestamp_millis().to_be_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(category.as_bytes());
    hasher.update([0u8]);
    hasher.update(note.unwrap_or("").as_bytes());
    hasher.update([0u8]);
    hasher.update(occurrence.to_be_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("import-{}", &digest[..16])
}

struct Columns {
    date: usize,
    amount: usize,
    category: usize,
    note: Option<usize>,
    id: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };

        let Some(date) = find(&["date", "created_at", "createdat"]) else {
            bail!("missing date column (expected `date` or `created_at`)");
        };
        let Some(amount) = find(&["amount"]) else {
            bail!("missing `amount` column");
        };
        let Some(category) = find(&["category"]) else {
            bail!("missing `category` column");
        };

        Ok(Self {
            date,
            amount,
            category,
            note: find(&["note", "notes", "description"]),
            id: find(&["id"]),
        })
    }
}

/// Parse an expense CSV from any reader, assigning every row to `owner_id`.
pub fn parse_expense_reader<R: Read>(reader: R, owner_id: &str) -> Result<Vec<ExpenseRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let cols = Columns::from_headers(rdr.headers().context("reading CSV header")?)?;
    let mut out = Vec::new();
    let mut seen: HashMap<String, u32> = HashMap::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 2);

        let Some(created_at) = record.get(cols.date).and_then(parse_timestamp) else {
            warn!(line, "skipping row with unparseable date");
            continue;
        };

        let amount = match record.get(cols.amount).and_then(parse_amount) {
            Some(a) if a > 0.0 => a,
            _ => {
                warn!(line, "skipping row with missing or non-positive amount");
                continue;
            }
        };

        let category = normalize_category(record.get(cols.category).unwrap_or(""));
        let mut expense = ExpenseRecord::new("", amount, category.label(), created_at, owner_id);
        if let Some(note) = cols.note.and_then(|c| record.get(c)) {
            expense = expense.with_note(note);
        }

        expense.id = match cols.id.and_then(|c| record.get(c)).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let note = expense.note.as_deref();
                let key = import_id(owner_id, created_at, amount, category.label(), note, 0);
                let occurrence = seen.entry(key.clone()).or_insert(0);
                let id = match *occurrence {
                    0 => key,
                    n => import_id(owner_id, created_at, amount, category.label(), note, n),
                };
                *occurrence += 1;
                id
            }
        };
        out.push(expense);
    }

    debug!(count = out.len(), "parsed expense CSV");
    Ok(out)
}

/// Parse an expense CSV file.
pub fn parse_expense_csv(path: impl AsRef<Path>, owner_id: &str) -> Result<Vec<ExpenseRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_expense_reader(file, owner_id).with_context(|| format!("parsing {}", path.display()))
}

/// Append the imported records whose ids are not in `existing`.
/// Returns how many were added.
pub fn merge_imported(existing: &mut Vec<ExpenseRecord>, imported: Vec<ExpenseRecord>) -> usize {
    let before = existing.len();
    for e in imported {
        if !existing.iter().any(|m| m.id == e.id) {
            existing.push(e);
        }
    }
    existing.len() - before
}
