use crate::collection::Collection;
use crate::sort::SortDescriptor;
use crate::store::ConnectionState;
use crate::window::Pagination;

/// What a renderer needs for one frame; `rows` are already in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel<R> {
    pub collection: Collection,
    pub rows: Vec<R>,
    pub pagination: Option<Pagination>,
    pub page: u32,
    pub limit: u32,
    pub sort: Option<SortDescriptor>,
    pub loading: bool,
    pub stale: bool,
    pub connection: ConnectionState,
    pub dirty: bool,
}

impl<R> ViewModel<R> {
    /// Total pages as reported by the server, if any snapshot carried it.
    pub fn total_pages(&self) -> Option<u64> {
        self.pagination.map(|pagination| pagination.total_pages)
    }

    pub fn has_next_page(&self) -> bool {
        self.total_pages()
            .is_some_and(|total| u64::from(self.page) < total)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }
}
