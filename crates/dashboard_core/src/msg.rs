use crate::sort::SortDescriptor;
use crate::store::SessionGeneration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The owning view came up; opens a session.
    Mounted,
    /// The owning view went away; closes the session.
    Unmounted,
    /// User navigated to another page.
    PageRequested(u32),
    /// User picked another page size.
    LimitChanged(u32),
    /// Replace the sort descriptor (or clear it).
    SortChanged(Option<SortDescriptor>),
    /// Header click on a column: ascending, descending, off.
    SortColumnClicked(String),
    /// Transport reports the session as open (also after a reconnect).
    SessionOpened { generation: SessionGeneration },
    /// One inbound text frame.
    FrameReceived {
        generation: SessionGeneration,
        text: String,
    },
    /// Transport-level failure; logged only.
    SessionFailed {
        generation: SessionGeneration,
        message: String,
    },
    SessionClosed { generation: SessionGeneration },
    /// Render tick to coalesce redraws.
    Tick,
    NoOp,
}
