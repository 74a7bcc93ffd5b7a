use std::fmt;

use crate::reconcile::MergePolicy;

/// The two live collections the dashboard can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Jobs,
    Workers,
}

impl Collection {
    /// Prefix of the envelope type tags addressed to this collection.
    pub fn tag_prefix(self) -> &'static str {
        match self {
            Collection::Jobs => "JOB",
            Collection::Workers => "WORKER",
        }
    }

    /// Jobs are created continuously and may appear on an active page;
    /// the worker roster only ever refines rows already on screen.
    pub fn merge_policy(self) -> MergePolicy {
        match self {
            Collection::Jobs => MergePolicy::PATCH_AND_INSERT,
            Collection::Workers => MergePolicy::PATCH_ONLY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Collection::Jobs => "Jobs",
            Collection::Workers => "Workers",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
