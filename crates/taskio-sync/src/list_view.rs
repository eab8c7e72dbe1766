//! List View Model
//!
//! Owns the (page, perPage, sort) selection of the task list and derives the
//! sequence actually rendered.
//!
//! Two sources are supported:
//! - paged (canonical): the server returns one page plus its counters,
//!   see [`ListViewModel::finish_page`];
//! - unpaged: the server returns every task and the counters are computed
//!   here, see [`ListViewModel::finish_full_list`].

use crate::error::ApiResult;
use crate::models::{PerPage, SortMode, Task, TaskPage};

/// Current page, page size and ordering. `page_index` is zero-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ListSelection {
    pub page_index: u32,
    pub per_page: PerPage,
    pub sort: SortMode,
}

impl ListSelection {
    pub fn new(page_index: u32, per_page: PerPage, sort: SortMode) -> Self {
        Self { page_index, per_page, sort }
    }

    /// One-based `page` query parameter
    pub fn page_param(&self) -> u32 {
        self.page_index + 1
    }

    /// Parse a one-based `page` parameter. Missing, non-numeric or zero
    /// values fall back to the first page.
    pub fn parse_page_param(raw: Option<&str>) -> u32 {
        raw.and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .map(|page| page - 1)
            .unwrap_or(0)
    }

    pub fn with_page(self, page_index: u32) -> Self {
        Self { page_index, ..self }
    }

    /// Changing the page size always goes back to the first page.
    pub fn with_per_page(self, per_page: PerPage) -> Self {
        Self { page_index: 0, per_page, ..self }
    }

    pub fn with_sort(self, sort: SortMode) -> Self {
        Self { sort, ..self }
    }
}

// ========================
// Pure Helpers
// ========================

/// Stable sort by completion; ties keep server order.
pub fn sort_tasks(tasks: &mut [Task], sort: SortMode) {
    match sort {
        SortMode::PendingFirst => tasks.sort_by_key(|t| t.completed),
        SortMode::CompletedFirst => tasks.sort_by_key(|t| !t.completed),
    }
}

/// `min(perPage, total - pageIndex * perPage)`, clamped at zero
pub fn expected_page_len(total: u32, page_index: u32, per_page: PerPage) -> usize {
    let offset = u64::from(page_index) * u64::from(per_page.get());
    let remaining = u64::from(total).saturating_sub(offset);
    remaining.min(u64::from(per_page.get())) as usize
}

/// Number of pages for `total` tasks, never less than one
pub fn page_count(total: u32, per_page: PerPage) -> u32 {
    total.div_ceil(per_page.get()).max(1)
}

/// Build a page from the full task list (unpaged mode).
pub fn paginate(all: &[Task], selection: ListSelection) -> TaskPage {
    let mut sorted = all.to_vec();
    sort_tasks(&mut sorted, selection.sort);

    let per_page = selection.per_page.get() as usize;
    let start = (selection.page_index as usize).saturating_mul(per_page).min(sorted.len());
    let end = start.saturating_add(per_page).min(sorted.len());

    TaskPage {
        items: sorted[start..end].to_vec(),
        page_index: selection.page_index,
        per_page: selection.per_page,
        total_count: sorted.len() as u32,
        completed_total_count: sorted.iter().filter(|t| t.completed).count() as u32,
    }
}

// ========================
// View Model
// ========================

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    /// `previous` keeps the last rendered page on screen while reloading.
    Loading { previous: Option<TaskPage> },
    Ready(TaskPage),
    Error(String),
}

/// Issued by [`ListViewModel::begin_load`]; a result is only accepted for
/// the most recent ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    pub selection: ListSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListViewModel {
    selection: ListSelection,
    state: ViewState,
    seq: u64,
}

impl Default for ListViewModel {
    fn default() -> Self {
        Self::new(ListSelection::default())
    }
}

impl ListViewModel {
    pub fn new(selection: ListSelection) -> Self {
        Self {
            selection,
            state: ViewState::Idle,
            seq: 0,
        }
    }

    pub fn selection(&self) -> ListSelection {
        self.selection
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Page to render: the ready page, or the previous one while loading.
    pub fn page(&self) -> Option<&TaskPage> {
        match &self.state {
            ViewState::Ready(page) => Some(page),
            ViewState::Loading { previous } => previous.as_ref(),
            ViewState::Idle | ViewState::Error(_) => None,
        }
    }

    // ========================
    // Transitions
    // ========================

    pub fn set_page(&mut self, page_index: u32) -> bool {
        self.select(self.selection.with_page(page_index))
    }

    pub fn set_per_page(&mut self, per_page: PerPage) -> bool {
        self.select(self.selection.with_per_page(per_page))
    }

    pub fn set_sort(&mut self, sort: SortMode) -> bool {
        self.select(self.selection.with_sort(sort))
    }

    /// Apply a new selection; returns `false` if nothing changed.
    pub fn select(&mut self, selection: ListSelection) -> bool {
        if selection == self.selection {
            return false;
        }
        self.selection = selection;
        self.enter_loading();
        true
    }

    /// Cached data for this list was invalidated.
    pub fn invalidate(&mut self) {
        self.enter_loading();
    }

    /// Start a fetch for the current selection.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.enter_loading();
        LoadTicket {
            seq: self.seq,
            selection: self.selection,
        }
    }

    /// Settle a paged fetch. Returns `false` if the ticket was superseded.
    pub fn finish_page(&mut self, ticket: LoadTicket, result: ApiResult<TaskPage>) -> bool {
        if ticket.seq != self.seq {
            return false;
        }
        let checked = result.and_then(|mut page| {
            page.validate()?;
            sort_tasks(&mut page.items, ticket.selection.sort);
            Ok(page)
        });
        self.state = match checked {
            Ok(page) => ViewState::Ready(page),
            Err(err) => ViewState::Error(err.user_message()),
        };
        true
    }

    /// Settle an unpaged fetch, computing the page and counters locally.
    pub fn finish_full_list(&mut self, ticket: LoadTicket, result: ApiResult<Vec<Task>>) -> bool {
        if ticket.seq != self.seq {
            return false;
        }
        self.state = match result {
            Ok(all) => ViewState::Ready(paginate(&all, ticket.selection)),
            Err(err) => ViewState::Error(err.user_message()),
        };
        true
    }

    fn enter_loading(&mut self) {
        self.seq += 1;
        let previous = match std::mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::Ready(page) => Some(page),
            ViewState::Loading { previous } => previous,
            ViewState::Idle | ViewState::Error(_) => None,
        };
        self.state = ViewState::Loading { previous };
    }

    // ========================
    // Pagination Helpers
    // ========================

    pub fn page_count(&self) -> u32 {
        self.page()
            .map(|p| page_count(p.total_count, p.per_page))
            .unwrap_or(1)
    }

    pub fn has_previous(&self) -> bool {
        self.selection.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.selection.page_index + 1 < self.page_count()
    }

    /// Last valid page index when the ready page lies past the end of the
    /// list (e.g. after deleting the only task on the last page).
    pub fn overflow_target(&self) -> Option<u32> {
        match &self.state {
            ViewState::Ready(page) if page.items.is_empty() && page.total_count > 0 => {
                let last = page_count(page.total_count, page.per_page) - 1;
                (self.selection.page_index > last).then_some(last)
            }
            _ => None,
        }
    }
}
