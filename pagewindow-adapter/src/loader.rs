use std::sync::{Mutex, MutexGuard};

use pagewindow::{
    Completion, Filters, LoaderState, Page, PageMeta, PageRequest, PagerOptions, RecordKey,
};

use crate::{Error, FetchError, PageSource, Result};

/// Async driver for [`pagewindow::LoaderState`] over a [`PageSource`].
///
/// Methods take `&self`, so one loader can be shared (e.g. in an `Arc`) between the scroll
/// handler and a query dispatcher. The state lock is never held across an `.await`: each
/// response is applied atomically after the fetch resolves.
pub struct PagedLoader<S: PageSource, K> {
    source: S,
    state: Mutex<LoaderState<S::Record, K>>,
}

impl<S: PageSource, K: RecordKey> PagedLoader<S, K> {
    pub fn new(source: S, options: PagerOptions<S::Record, K>) -> Self {
        Self {
            source,
            state: Mutex::new(LoaderState::new(options)),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState<S::Record, K>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn meta(&self) -> PageMeta {
        self.lock().meta()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The first page for the current filter is being fetched.
    pub fn is_loading(&self) -> bool {
        self.lock().is_resetting()
    }

    /// A follow-up page is being fetched.
    pub fn is_loading_more(&self) -> bool {
        self.lock().is_fetching()
    }

    pub fn filters(&self) -> Filters {
        self.lock().filters().clone()
    }

    /// Runs `f` against the loaded records.
    pub fn with_records<T>(&self, f: impl FnOnce(&[S::Record]) -> T) -> T {
        f(self.lock().records())
    }

    /// Runs `f` against the full loader state.
    pub fn with_state<T>(&self, f: impl FnOnce(&LoaderState<S::Record, K>) -> T) -> T {
        f(&self.lock())
    }

    /// Clears the sequence and loads page 1 for `filters`.
    ///
    /// A later `reset` supersedes this one: if that happens before the response arrives, the
    /// response is dropped and [`Error::Superseded`] is returned. On failure the sequence stays
    /// empty.
    pub async fn reset(&self, filters: Filters) -> Result<PageMeta> {
        let request = self.lock().begin_reset(filters);
        adebug!(generation = request.generation, "reset");
        let response = self
            .source
            .list_page(&request.filters, request.page, request.page_size)
            .await;
        self.finish(&request, response)
    }

    /// Fetches and appends the next page.
    ///
    /// Resolves immediately with the current meta when there is nothing more to load or a
    /// fetch is already in flight. On failure nothing is appended and a retry is possible.
    pub async fn fetch_next(&self) -> Result<PageMeta> {
        let request = {
            let mut state = self.lock();
            match state.begin_next() {
                Some(request) => request,
                None => return Ok(state.meta()),
            }
        };
        atrace!(page = request.page, "fetch_next");
        let response = self
            .source
            .list_page(&request.filters, request.page, request.page_size)
            .await;
        match self.finish(&request, response) {
            Err(Error::Superseded) => Ok(self.meta()),
            other => other,
        }
    }

    /// Drops all records and invalidates outstanding requests.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn finish(
        &self,
        request: &PageRequest,
        response: Result<Page<S::Record>, FetchError>,
    ) -> Result<PageMeta> {
        let mut state = self.lock();
        match response {
            Ok(page) => match state.complete(request, page) {
                Completion::Applied(meta) => Ok(meta),
                Completion::Stale | Completion::Failed => {
                    atrace!(page = request.page, "dropping superseded response");
                    Err(Error::Superseded)
                }
            },
            Err(err) => match state.fail(request) {
                Completion::Stale => Err(Error::Superseded),
                _ => {
                    awarn!(page = request.page, error = %err, "page fetch failed");
                    Err(Error::Fetch(err))
                }
            },
        }
    }
}
