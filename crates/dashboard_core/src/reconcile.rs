use std::collections::{HashMap, HashSet};

use crate::Record;

/// How an update batch may change the shape of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    /// Records unknown to the window are inserted at the front instead of
    /// being dropped.
    pub allow_insert_from_updates: bool,
}

impl MergePolicy {
    pub const PATCH_AND_INSERT: MergePolicy = MergePolicy {
        allow_insert_from_updates: true,
    };
    pub const PATCH_ONLY: MergePolicy = MergePolicy {
        allow_insert_from_updates: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    pub patched: usize,
    pub inserted: usize,
    pub dropped: usize,
}

/// Fold an update batch into the previous window.
///
/// Matching records are replaced whole, in place. Under an inserting policy
/// the fresh records go to the front in reverse batch order, each one as if
/// pushed at position 0. The result is cut to `limit`.
pub fn reconcile<R: Record>(
    previous: &[R],
    limit: usize,
    batch: Vec<R>,
    policy: MergePolicy,
) -> (Vec<R>, ReconcileStats) {
    let known: HashSet<&str> = previous.iter().filter_map(R::identity).collect();

    let mut stats = ReconcileStats::default();
    let mut updated: HashMap<String, R> = HashMap::new();
    let mut fresh: Vec<R> = Vec::new();
    let mut fresh_ids: HashSet<String> = HashSet::new();

    for record in batch {
        let Some(id) = record.identity().map(str::to_owned) else {
            stats.dropped += 1;
            continue;
        };
        if known.contains(id.as_str()) {
            if updated.contains_key(&id) {
                stats.dropped += 1;
            } else {
                updated.insert(id, record);
            }
        } else if policy.allow_insert_from_updates && fresh_ids.insert(id) {
            fresh.push(record);
        } else {
            stats.dropped += 1;
        }
    }

    let merged = previous.iter().map(|record| {
        match record.identity().and_then(|id| updated.get(id)) {
            Some(patch) => patch.clone(),
            None => record.clone(),
        }
    });

    stats.patched = updated.len();
    stats.inserted = fresh.len();

    let mut next: Vec<R> = fresh.into_iter().rev().chain(merged).collect();
    next.truncate(limit);
    (next, stats)
}
