//! Retained insights: a small most-recent-first list plus a "latest" slot.
//!
//! - `add` is idempotent by id for the list, but always updates `latest`.
//! - The list never grows past `cap`; overflow drops the oldest entries.

use serde::{Deserialize, Serialize};

use crate::insight::InsightRecord;

pub const DEFAULT_INSIGHT_CAP: usize = 10;

fn default_cap() -> usize {
    DEFAULT_INSIGHT_CAP
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsState {
    items: Vec<InsightRecord>,
    latest: Option<InsightRecord>,
    #[serde(default = "default_cap")]
    cap: usize,
}

impl Default for InsightsState {
    fn default() -> Self {
        Self::with_cap(DEFAULT_INSIGHT_CAP)
    }
}

impl InsightsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            items: Vec::new(),
            latest: None,
            cap: cap.max(1),
        }
    }

    pub fn items(&self) -> &[InsightRecord] {
        &self.items
    }

    pub fn latest(&self) -> Option<&InsightRecord> {
        self.latest.as_ref()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Change the cap, dropping the oldest entries if the list is now too long.
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap.max(1);
        self.items.truncate(self.cap);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Record a freshly generated insight.
    pub fn add(&mut self, insight: InsightRecord) {
        if !self.contains(&insight.id) {
            self.items.insert(0, insight.clone());
            self.items.truncate(self.cap);
        }
        self.latest = Some(insight);
    }

    /// Replace the retained list wholesale (e.g. when restoring a session).
    pub fn set_all(&mut self, mut items: Vec<InsightRecord>) {
        items.truncate(self.cap);
        self.items = items;
    }

    pub fn clear_latest(&mut self) {
        self.latest = None;
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.latest = None;
    }
}
