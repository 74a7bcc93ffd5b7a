//! Dashboard core: pure view state, frame reconciliation and the reducer
//! that drives one live collection view.
mod collection;
mod dispatch;
mod effect;
mod envelope;
mod msg;
mod reconcile;
mod record;
mod sort;
mod store;
mod update;
mod view_model;
mod window;

pub use collection::Collection;
pub use dispatch::{dispatch_frame, DispatchOutcome};
pub use effect::Effect;
pub use envelope::{decode_frame, Frame, FrameError, PageRequest, SnapshotKind};
pub use msg::Msg;
pub use reconcile::{reconcile, MergePolicy, ReconcileStats};
pub use record::{
    format_duration, parse_timestamp, Job, JobStatus, JobTimestamps, Record, Worker, WorkerStatus,
};
pub use sort::{compare_keys, project, SortDescriptor, SortDirection, SortKey, SortParseError};
pub use store::{ConnectionState, SessionGeneration, ViewState, DEFAULT_LIMIT};
pub use update::update;
pub use view_model::ViewModel;
pub use window::{Pagination, Window};
