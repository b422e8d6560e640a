use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Tests a record against the (trimmed, non-empty) query text.
pub type RecordMatcher<R> = Arc<dyn Fn(&R, &str) -> bool + Send + Sync>;

/// Synchronous text filter over a fully loaded dataset.
///
/// Used where the whole table fits in memory and filtering must be instant: there is no
/// debounce and no epoch tagging, but results are still capped to bound render cost.
pub struct ResidentFilter<R> {
    records: Vec<R>,
    matches: RecordMatcher<R>,
    cap: usize,
    query: String,
    hits: Vec<usize>,
}

impl<R> ResidentFilter<R> {
    pub fn new(
        records: Vec<R>,
        cap: usize,
        matches: impl Fn(&R, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        let mut filter = Self {
            records,
            matches: Arc::new(matches),
            cap,
            query: String::new(),
            hits: Vec::new(),
        };
        filter.refresh();
        filter
    }

    /// Replaces the dataset and re-applies the current query.
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.refresh();
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Applies `text` and returns the indexes (into [`Self::records`]) of the first `cap` hits.
    ///
    /// Empty input matches everything.
    pub fn apply(&mut self, text: &str) -> &[usize] {
        self.query = text.trim().to_string();
        self.refresh();
        &self.hits
    }

    pub fn hits(&self) -> &[usize] {
        &self.hits
    }

    pub fn for_each_hit(&self, mut f: impl FnMut(&R)) {
        for &i in &self.hits {
            f(&self.records[i]);
        }
    }

    pub fn collect_hits(&self, out: &mut Vec<R>)
    where
        R: Clone,
    {
        out.clear();
        self.for_each_hit(|r| out.push(r.clone()));
    }

    fn refresh(&mut self) {
        self.hits.clear();
        let query = self.query.as_str();
        for (i, record) in self.records.iter().enumerate() {
            if self.hits.len() >= self.cap {
                break;
            }
            if query.is_empty() || (self.matches)(record, query) {
                self.hits.push(i);
            }
        }
        vtrace!(query, hits = self.hits.len(), "resident filter applied");
    }
}

impl<R> core::fmt::Debug for ResidentFilter<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResidentFilter")
            .field("records", &self.records.len())
            .field("cap", &self.cap)
            .field("query", &self.query)
            .field("hits", &self.hits.len())
            .finish()
    }
}
