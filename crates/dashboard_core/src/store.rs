use crate::envelope::PageRequest;
use crate::reconcile::ReconcileStats;
use crate::sort::{project, SortDescriptor, SortDirection};
use crate::view_model::ViewModel;
use crate::window::{Pagination, Window};
use crate::Record;

pub const DEFAULT_LIMIT: u32 = 10;

/// Identifies one streaming session of a view. Bumped on every (re)open so
/// that frames from a torn-down session can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionGeneration(pub u64);

impl SessionGeneration {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No owning view; nothing is open.
    #[default]
    Unmounted,
    Connecting,
    Open,
    /// The server or transport ended the session while the view was mounted.
    Closed,
}

impl ConnectionState {
    pub fn is_mounted(self) -> bool {
        !matches!(self, ConnectionState::Unmounted)
    }

    pub fn is_live(self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Open)
    }
}

/// Everything one collection view holds: the window plus pagination, sort,
/// and session bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<R> {
    window: Window<R>,
    pagination: Option<Pagination>,
    sort: Option<SortDescriptor>,
    page: u32,
    limit: u32,
    loading: bool,
    stale: bool,
    connection: ConnectionState,
    generation: SessionGeneration,
    dirty: bool,
}

impl<R: Record> Default for ViewState<R> {
    fn default() -> Self {
        Self::new(1, DEFAULT_LIMIT)
    }
}

impl<R: Record> ViewState<R> {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            window: Window::default(),
            pagination: None,
            sort: None,
            page: page.max(1),
            limit: limit.max(1),
            loading: false,
            stale: false,
            connection: ConnectionState::Unmounted,
            generation: SessionGeneration::default(),
            dirty: false,
        }
    }

    pub fn with_sort(mut self, sort: Option<SortDescriptor>) -> Self {
        self.sort = sort;
        self
    }

    pub fn view(&self) -> ViewModel<R> {
        ViewModel {
            collection: R::COLLECTION,
            rows: project(self.window.records(), self.sort.as_ref())
                .into_iter()
                .cloned()
                .collect(),
            pagination: self.pagination,
            page: self.page,
            limit: self.limit,
            sort: self.sort.clone(),
            loading: self.loading,
            stale: self.stale,
            connection: self.connection,
            dirty: self.dirty,
        }
    }

    pub fn window(&self) -> &Window<R> {
        &self.window
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn sort(&self) -> Option<&SortDescriptor> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn apply_snapshot(&mut self, data: Vec<R>, pagination: Option<Pagination>) {
        self.window = Window::from_snapshot(data, self.limit as usize);
        self.pagination = pagination;
        self.stale = false;
        self.mark_dirty();
    }

    pub(crate) fn apply_update(&mut self, batch: Vec<R>) -> ReconcileStats {
        let (window, stats) =
            self.window
                .fold(batch, self.limit as usize, R::COLLECTION.merge_policy());
        self.window = window;
        self.mark_dirty();
        stats
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
        self.mark_dirty();
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
        self.mark_dirty();
    }

    pub(crate) fn set_limit(&mut self, limit: u32) {
        self.limit = limit.max(1);
        self.window.truncate(self.limit as usize);
        self.mark_dirty();
    }

    pub(crate) fn set_sort(&mut self, sort: Option<SortDescriptor>) {
        if self.sort != sort {
            self.sort = sort;
            self.mark_dirty();
        }
    }

    /// Header-click cycle: unsorted or other column → ascending →
    /// descending → unsorted.
    pub(crate) fn cycle_sort(&mut self, column: String) {
        let next = match self.sort.take() {
            Some(current) if current.column == column => match current.direction {
                SortDirection::Ascending => Some(SortDescriptor::descending(column)),
                SortDirection::Descending => None,
            },
            _ => Some(SortDescriptor::ascending(column)),
        };
        self.sort = next;
        self.mark_dirty();
    }

    pub(crate) fn set_connection(&mut self, connection: ConnectionState) {
        if self.connection != connection {
            self.connection = connection;
            self.mark_dirty();
        }
    }

    /// Start a new session generation and return it.
    pub(crate) fn begin_session(&mut self) -> SessionGeneration {
        self.generation = self.generation.next();
        self.set_connection(ConnectionState::Connecting);
        self.generation
    }
}
