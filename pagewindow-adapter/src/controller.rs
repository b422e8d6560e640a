use std::sync::Arc;

use pagewindow::{
    Epoch, Filters, InputDecision, PageMeta, PagerOptions, Query, QueryOptions, QueryOrigin,
    RecordKey, ScrollOutcome, ScrollSample, SelectionSet, ViewState, Window, WindowController,
};

use crate::{Error, PageSource, PagedLoader, QueryDispatcher, QueryFuture, QueryTarget, Result};

/// Filter field the query text is sent under unless configured otherwise.
pub const DEFAULT_FILTER_FIELD: &str = "search";

/// Configuration for [`Controller`].
pub struct ControllerOptions<R, K> {
    pub pager: PagerOptions<R, K>,
    pub query: QueryOptions,
    /// Filters sent with every page request (e.g. a date range or a warehouse).
    pub base_filters: Filters,
    /// Key the trimmed query text is merged into `base_filters` under.
    pub filter_field: String,
}

impl<R, K> Clone for ControllerOptions<R, K> {
    fn clone(&self) -> Self {
        Self {
            pager: self.pager.clone(),
            query: self.query.clone(),
            base_filters: self.base_filters.clone(),
            filter_field: self.filter_field.clone(),
        }
    }
}

impl<R, K> ControllerOptions<R, K> {
    pub fn new(pager: PagerOptions<R, K>) -> Self {
        Self {
            pager,
            query: QueryOptions::default(),
            base_filters: Filters::new(),
            filter_field: DEFAULT_FILTER_FIELD.to_string(),
        }
    }

    pub fn with_query(mut self, query: QueryOptions) -> Self {
        self.query = query;
        self
    }

    pub fn with_base_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_filters.insert(key.into(), value.into());
        self
    }

    pub fn with_base_filters(mut self, base_filters: Filters) -> Self {
        self.base_filters = base_filters;
        self
    }

    pub fn with_filter_field(mut self, filter_field: impl Into<String>) -> Self {
        self.filter_field = filter_field.into();
        self
    }
}

impl<R, K> core::fmt::Debug for ControllerOptions<R, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("pager", &self.pager)
            .field("query", &self.query)
            .field("base_filters", &self.base_filters)
            .field("filter_field", &self.filter_field)
            .finish()
    }
}

/// Resets a shared loader with the query text merged into the base filters.
pub struct ResetTarget<S: PageSource, K> {
    loader: Arc<PagedLoader<S, K>>,
    base_filters: Filters,
    filter_field: String,
}

impl<S: PageSource, K: RecordKey> ResetTarget<S, K> {
    pub fn new(
        loader: Arc<PagedLoader<S, K>>,
        base_filters: Filters,
        filter_field: String,
    ) -> Self {
        Self {
            loader,
            base_filters,
            filter_field,
        }
    }

    /// The filters a reset for `text` sends. Empty text leaves the filter field out.
    pub fn filters_for(&self, text: &str) -> Filters {
        let mut filters = self.base_filters.clone();
        let text = text.trim();
        if text.is_empty() {
            filters.remove(&self.filter_field);
        } else {
            filters.insert(self.filter_field.clone(), text.to_string());
        }
        filters
    }
}

impl<S, K> QueryTarget for ResetTarget<S, K>
where
    S: PageSource,
    K: RecordKey + Send + 'static,
{
    type Output = PageMeta;

    fn run<'a>(&'a self, query: &'a Query) -> QueryFuture<'a, PageMeta> {
        Box::pin(async move { self.loader.reset(self.filters_for(query.trimmed())).await })
    }
}

/// A filterable, incrementally loaded list page.
///
/// Composes a [`PagedLoader`], a [`WindowController`], a [`QueryDispatcher`] that resets the
/// loader when the filter settles, and a [`SelectionSet`]. The UI layer feeds it scroll
/// samples and filter input, and renders [`Self::view_state`] plus the visible records.
///
/// Failures are recorded once, as the notice in [`ViewState::error`]; superseded requests are
/// never reported.
pub struct Controller<S, K>
where
    S: PageSource,
    K: RecordKey + Send + 'static,
{
    loader: Arc<PagedLoader<S, K>>,
    window: WindowController,
    query: QueryDispatcher<ResetTarget<S, K>>,
    selection: SelectionSet<K>,
    filter_text: String,
    /// The query policy rejected `filter_text`; nothing may be requested for it.
    filter_rejected: bool,
    error: Option<Error>,
}

impl<S, K> Controller<S, K>
where
    S: PageSource,
    K: RecordKey + Send + 'static,
{
    pub fn new(source: S, options: ControllerOptions<S::Record, K>) -> Self {
        let ControllerOptions {
            pager,
            query,
            base_filters,
            filter_field,
        } = options;
        let window = WindowController::new(pager.window);
        let loader = Arc::new(PagedLoader::new(source, pager));
        let target = ResetTarget::new(Arc::clone(&loader), base_filters, filter_field);
        Self {
            loader,
            window,
            query: QueryDispatcher::new(target, query),
            selection: SelectionSet::new(),
            filter_text: String::new(),
            filter_rejected: false,
            error: None,
        }
    }

    pub fn loader(&self) -> &Arc<PagedLoader<S, K>> {
        &self.loader
    }

    pub fn window(&self) -> Window {
        self.window.window()
    }

    pub fn window_controller(&self) -> &WindowController {
        &self.window
    }

    pub fn dispatcher(&self) -> &QueryDispatcher<ResetTarget<S, K>> {
        &self.query
    }

    pub fn meta(&self) -> PageMeta {
        self.loader.meta()
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref().or(self.query.notice())
    }

    /// Loads page 1 for the current filter text, bypassing the debounce.
    ///
    /// Filter text the query policy rejected is never sent: the list stays cleared and the
    /// empty meta is returned.
    pub async fn load(&mut self) -> Result<PageMeta> {
        if self.filter_rejected {
            atrace!("load skipped: filter text rejected by the query policy");
            self.clear_list();
            return Ok(self.loader.meta());
        }
        let filters = self.query.target().filters_for(&self.filter_text);
        let outcome = self.loader.reset(filters).await;
        self.apply_reset(outcome)
    }

    fn apply_reset(&mut self, outcome: Result<PageMeta>) -> Result<PageMeta> {
        match outcome {
            Ok(meta) => {
                self.window.reset();
                self.window.sync(&meta);
                self.selection.clear();
                self.error = None;
                adebug!(
                    total = meta.total_count,
                    pages = meta.total_pages(),
                    "list reset"
                );
                Ok(meta)
            }
            Err(Error::Superseded) => Err(Error::Superseded),
            Err(err) => {
                self.window.reset();
                self.selection.clear();
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Feeds a scroll sample; fetches the next page when the window asks for it.
    ///
    /// The window is re-synced after the fetch, so a shift that needed the new page happens on
    /// the next sample.
    pub async fn on_scroll(
        &mut self,
        offset: u64,
        extent: u64,
        client_height: u32,
    ) -> Result<ScrollOutcome> {
        let sample = ScrollSample::new(offset, extent, client_height);
        let meta = self.loader.meta();
        let outcome = self
            .window
            .on_scroll(sample, &meta, self.loader.is_loading_more());
        if outcome.fetch_next {
            self.fetch_next().await?;
        }
        Ok(outcome)
    }

    async fn fetch_next(&mut self) -> Result<PageMeta> {
        match self.loader.fetch_next().await {
            Ok(meta) => {
                self.window.sync(&meta);
                self.error = None;
                Ok(meta)
            }
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Records new filter text.
    ///
    /// Empty text reloads the unfiltered list at once. Text the query policy rejects as too
    /// short clears the list; anything else resets it once the dispatcher settles (see
    /// [`Self::settle_query`]).
    pub fn on_filter_change(&mut self, text: &str) -> InputDecision {
        self.filter_text = text.trim().to_string();
        self.filter_rejected = false;
        if self.filter_text.is_empty() {
            self.query.submit("");
            return InputDecision::Dispatch(Query::new("", QueryOrigin::Submitted));
        }
        let decision = self.query.on_input_change(text);
        if matches!(decision, InputDecision::Cleared) {
            self.filter_rejected = true;
            self.clear_list();
        }
        decision
    }

    fn clear_list(&mut self) {
        self.loader.clear();
        self.window.reset();
        self.selection.clear();
        self.error = None;
    }

    /// Filters by a scanned code immediately.
    pub fn on_scan_result(&mut self, code: &str) -> Result<Epoch> {
        let epoch = self.query.on_scan_result(code)?;
        self.filter_text = code.trim().to_string();
        self.filter_rejected = false;
        Ok(epoch)
    }

    pub fn on_scan_error(&mut self, message: &str) -> Error {
        self.query.on_scan_error(message)
    }

    /// Waits for the current filter reset and applies it.
    pub async fn settle_query(&mut self) -> Option<Result<PageMeta>> {
        let settled = self.query.next_result().await?;
        Some(self.apply_reset(settled.outcome))
    }

    /// Applies the current filter reset if it already completed.
    pub fn poll_query(&mut self) -> Option<Result<PageMeta>> {
        let settled = self.query.try_next_result()?;
        Some(self.apply_reset(settled.outcome))
    }

    /// Repeats the operation that last failed: page 1 when nothing is loaded, the next page
    /// otherwise.
    pub async fn retry(&mut self) -> Result<PageMeta> {
        if self.loader.is_empty() {
            self.load().await
        } else {
            self.fetch_next().await
        }
    }

    /// Moves the window so it covers `page`.
    pub fn jump_to_page(&mut self, page: usize) -> Window {
        let meta = self.loader.meta();
        self.window.jump_to_page(page, &meta)
    }

    pub fn toggle_selection(&mut self, key: K) -> bool {
        self.selection.toggle(key)
    }

    /// Selects every record in the visible slice.
    pub fn select_visible(&mut self) {
        let window = &self.window;
        let selection = &mut self.selection;
        self.loader.with_state(|state| {
            let range = window.visible_range(&state.meta(), state.len());
            selection.select_all(state.records()[range].iter().map(|r| state.key_for(r)));
        });
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, key: &K) -> bool {
        self.selection.contains(key)
    }

    pub fn selected_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.selection.iter().cloned().collect()
    }

    pub fn selection(&self) -> &SelectionSet<K> {
        &self.selection
    }

    /// Calls `f` for each visible record, in order.
    pub fn for_each_visible(&self, mut f: impl FnMut(&S::Record)) {
        self.loader.with_state(|state| {
            let range = self.window.visible_range(&state.meta(), state.len());
            for record in &state.records()[range] {
                f(record);
            }
        });
    }

    /// Collects the visible records into `out` (cleared first).
    pub fn collect_visible(&self, out: &mut Vec<S::Record>)
    where
        S::Record: Clone,
    {
        out.clear();
        self.for_each_visible(|r| out.push(r.clone()));
    }

    pub fn view_state(&self) -> ViewState {
        self.loader.with_state(|state| {
            let meta = state.meta();
            ViewState {
                visible: self.window.visible_range(&meta, state.len()),
                window: self.window.window(),
                meta,
                loading: state.is_resetting() || self.query.is_loading(),
                loading_more: state.is_fetching(),
                error: self
                    .error()
                    .filter(|err| err.is_user_visible())
                    .map(|err| err.to_string()),
                selected: self.selection.len(),
            }
        })
    }

    /// Cancels pending input, makes outstanding responses stale and drops all records.
    pub fn dispose(&mut self) {
        self.query.dispose();
        self.loader.clear();
        self.window.reset();
        self.selection.clear();
        self.filter_text.clear();
        self.filter_rejected = false;
        self.error = None;
    }
}
