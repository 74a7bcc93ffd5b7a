use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::reconcile::{reconcile, MergePolicy, ReconcileStats};
use crate::Record;

/// Server-authoritative pagination metadata; never computed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub page_size: u64,
    pub total_items: u64,
}

/// The records held for one page: at most `limit` entries, identity keys
/// unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<R> {
    records: Vec<R>,
}

impl<R> Default for Window<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Record> Window<R> {
    /// Build a window from snapshot data in payload order. Repeated identity
    /// keys keep their first occurrence; the rest past `limit` is cut.
    pub fn from_snapshot(data: Vec<R>, limit: usize) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let records = data
            .into_iter()
            .filter(|record| match record.identity() {
                Some(id) => seen.insert(id.to_owned()),
                None => true,
            })
            .take(limit)
            .collect();
        Self { records }
    }

    pub fn fold(&self, batch: Vec<R>, limit: usize, policy: MergePolicy) -> (Self, ReconcileStats) {
        let (records, stats) = reconcile(&self.records, limit, batch, policy);
        (Self { records }, stats)
    }

    /// Drop records past `limit`, keeping the head of the page.
    pub fn truncate(&mut self, limit: usize) {
        self.records.truncate(limit);
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.identity() == Some(id))
    }
}
