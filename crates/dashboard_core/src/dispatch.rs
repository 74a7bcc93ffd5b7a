use dashboard_logging::{dash_debug, dash_info, dash_warn};

use crate::envelope::{decode_frame, Frame, SnapshotKind};
use crate::reconcile::ReconcileStats;
use crate::store::ViewState;
use crate::Record;

/// What a single inbound frame did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    SnapshotApplied { kind: SnapshotKind, records: usize },
    UpdateApplied(ReconcileStats),
    Ignored(String),
    /// Malformed or schema-violating frame; the window was left untouched.
    Rejected,
}

/// Decode `text` and apply it to `state`.
///
/// Loading is cleared after every frame, whether it was applied, ignored
/// or rejected. A rejected frame also marks the view stale until the next
/// accepted snapshot.
pub fn dispatch_frame<R: Record>(state: &mut ViewState<R>, text: &str) -> DispatchOutcome {
    let outcome = match decode_frame::<R>(text) {
        Ok(Frame::Snapshot {
            kind,
            data,
            pagination,
        }) => {
            let records = data.len();
            state.apply_snapshot(data, pagination);
            dash_info!(
                "{}: snapshot {:?} with {} records, window now {}",
                R::COLLECTION,
                kind,
                records,
                state.window().len()
            );
            DispatchOutcome::SnapshotApplied { kind, records }
        }
        Ok(Frame::Update(batch)) => {
            let stats = state.apply_update(batch);
            dash_debug!(
                "{}: update patched={} inserted={} dropped={}",
                R::COLLECTION,
                stats.patched,
                stats.inserted,
                stats.dropped
            );
            DispatchOutcome::UpdateApplied(stats)
        }
        Ok(Frame::Ignored(tag)) => {
            dash_debug!("{}: ignoring frame type {}", R::COLLECTION, tag);
            DispatchOutcome::Ignored(tag)
        }
        Err(err) => {
            dash_warn!("{}: discarding frame: {}", R::COLLECTION, err);
            state.mark_stale();
            DispatchOutcome::Rejected
        }
    };
    state.set_loading(false);
    outcome
}
