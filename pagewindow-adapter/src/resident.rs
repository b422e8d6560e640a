use std::sync::Arc;

use pagewindow::{
    DEFAULT_RESULT_CAP, Filters, RecordKey, RecordKeyFn, RecordMatcher, ResidentFilter,
    SelectionSet,
};

use crate::{Error, FetchError, FullDatasetSource, Result};

/// Configuration for [`ResidentController`].
pub struct ResidentOptions<R, K> {
    pub get_record_key: RecordKeyFn<R, K>,
    /// Tests a record against the trimmed, non-empty filter text.
    pub matcher: RecordMatcher<R>,
    pub result_cap: usize,
    /// Filters sent with the one whole-table request.
    pub base_filters: Filters,
}

impl<R, K> Clone for ResidentOptions<R, K> {
    fn clone(&self) -> Self {
        Self {
            get_record_key: Arc::clone(&self.get_record_key),
            matcher: Arc::clone(&self.matcher),
            result_cap: self.result_cap,
            base_filters: self.base_filters.clone(),
        }
    }
}

impl<R, K> ResidentOptions<R, K> {
    pub fn new(
        get_record_key: impl Fn(&R) -> K + Send + Sync + 'static,
        matcher: impl Fn(&R, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            get_record_key: Arc::new(get_record_key),
            matcher: Arc::new(matcher),
            result_cap: DEFAULT_RESULT_CAP,
            base_filters: Filters::new(),
        }
    }

    pub fn with_result_cap(mut self, result_cap: usize) -> Self {
        self.result_cap = result_cap;
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
}

impl<R, K> core::fmt::Debug for ResidentOptions<R, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResidentOptions")
            .field("result_cap", &self.result_cap)
            .field("base_filters", &self.base_filters)
            .finish_non_exhaustive()
    }
}

/// A list page over a table small enough to keep in memory.
///
/// The table is fetched once by [`Self::load`]; filter input and scans are then applied
/// synchronously by a [`ResidentFilter`], with no debounce and no request. Results are capped
/// like remote queries. The selection is cleared whenever the filter text or the table changes.
pub struct ResidentController<S: FullDatasetSource, K: RecordKey> {
    source: S,
    base_filters: Filters,
    filter: ResidentFilter<S::Record>,
    get_record_key: RecordKeyFn<S::Record, K>,
    selection: SelectionSet<K>,
    loading: bool,
    error: Option<Error>,
}

impl<S: FullDatasetSource, K: RecordKey> ResidentController<S, K> {
    pub fn new(source: S, options: ResidentOptions<S::Record, K>) -> Self {
        let ResidentOptions {
            get_record_key,
            matcher,
            result_cap,
            base_filters,
        } = options;
        let filter = ResidentFilter::new(Vec::new(), result_cap, move |record, query| {
            matcher(record, query)
        });
        Self {
            source,
            base_filters,
            filter,
            get_record_key,
            selection: SelectionSet::new(),
            loading: false,
            error: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn filter(&self) -> &ResidentFilter<S::Record> {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Fetches the whole table and re-applies the current filter text.
    ///
    /// Returns the number of records held. On failure the previous table is dropped and the
    /// error is recorded.
    pub async fn load(&mut self) -> Result<usize> {
        self.loading = true;
        let response = self.source.list_all(&self.base_filters).await;
        self.loading = false;
        self.selection.clear();
        let outcome = match response {
            Ok(response) if response.success => Ok(response.data),
            Ok(_) => Err(Error::from(FetchError::Rejected(
                "full-dataset query failed".to_string(),
            ))),
            Err(err) => Err(Error::from(err)),
        };
        match outcome {
            Ok(records) => {
                let len = records.len();
                self.filter.set_records(records);
                self.error = None;
                adebug!(rows = len, hits = self.filter.hits().len(), "resident table loaded");
                Ok(len)
            }
            Err(err) => {
                awarn!(error = %err, "resident table failed to load");
                self.filter.set_records(Vec::new());
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Applies filter text at once and returns the number of hits.
    ///
    /// Empty text matches every record, up to the result cap.
    pub fn on_filter_change(&mut self, text: &str) -> usize {
        if text.trim() != self.filter.query() {
            self.selection.clear();
        }
        self.error = None;
        self.filter.apply(text).len()
    }

    /// Filters by a scanned code.
    pub fn on_scan_result(&mut self, code: &str) -> Result<usize> {
        if code.trim().is_empty() {
            return Err(self.on_scan_error("empty scan code"));
        }
        Ok(self.on_filter_change(code))
    }

    /// Reports a frame the decoder could not read; the current hits stay.
    pub fn on_scan_error(&mut self, message: &str) -> Error {
        awarn!(reason = message, "unreadable scan");
        let err = Error::InvalidInput(message.to_string());
        self.error = Some(err.clone());
        err
    }

    /// Indexes of the current hits into [`Self::records`].
    pub fn hits(&self) -> &[usize] {
        self.filter.hits()
    }

    pub fn records(&self) -> &[S::Record] {
        self.filter.records()
    }

    pub fn for_each_visible(&self, f: impl FnMut(&S::Record)) {
        self.filter.for_each_hit(f);
    }

    pub fn collect_visible(&self, out: &mut Vec<S::Record>) {
        self.filter.collect_hits(out);
    }

    pub fn toggle_selection(&mut self, key: K) -> bool {
        self.selection.toggle(key)
    }

    /// Selects every current hit.
    pub fn select_visible(&mut self) {
        let filter = &self.filter;
        let key_for = &self.get_record_key;
        self.selection.select_all(
            filter
                .hits()
                .iter()
                .map(|&i| key_for(&filter.records()[i])),
        );
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

    /// Drops the table, the filter text and the selection.
    pub fn dispose(&mut self) {
        self.filter.set_records(Vec::new());
        self.filter.apply("");
        self.selection.clear();
        self.loading = false;
        self.error = None;
    }
}
