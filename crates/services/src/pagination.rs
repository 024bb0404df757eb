use crate::remote::{ListFilter, PageRequest, QuestionPage};

/// Drives `skip`/`limit` paging over the remote question list.
///
/// Paging stops once `skip + returned >= total` or a page comes back empty.
/// When the server omits `total`, only an empty page ends the walk.
#[derive(Debug, Clone)]
pub struct PageCursor {
    filter: ListFilter,
    limit: usize,
    skip: usize,
    fetched: usize,
    done: bool,
}

impl PageCursor {
    #[must_use]
    pub fn new(filter: ListFilter, limit: usize) -> Self {
        Self {
            filter,
            limit: limit.max(1),
            skip: 0,
            fetched: 0,
            done: false,
        }
    }

    /// Next request to send, or `None` once paging is finished.
    #[must_use]
    pub fn next_request(&self) -> Option<PageRequest> {
        (!self.done).then_some(PageRequest {
            skip: self.skip,
            limit: self.limit,
            filter: self.filter,
        })
    }

    /// Record a page received for the last request.
    pub fn advance(&mut self, page: &QuestionPage) {
        let returned = page.items.len();
        if returned == 0 {
            self.done = true;
            return;
        }
        self.fetched += returned;
        if page.total.is_some_and(|total| self.skip + returned >= total) {
            self.done = true;
        }
        self.skip += self.limit;
    }

    #[must_use]
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }
}
