use alloc::vec::Vec;

use crate::key::{KeySet, RecordKey};
use crate::{Completion, Filters, Page, PageMeta, PageRequest, PagerOptions, RequestKind};

/// Headless bookkeeping for an incrementally loaded, filter-scoped record sequence.
///
/// This type performs no I/O. An adapter asks it for the next [`PageRequest`], performs the
/// fetch, and hands the response back via [`Self::complete`] or [`Self::fail`]:
///
/// - At most one request is outstanding at a time (`begin_next` returns `None` while a fetch is
///   in flight).
/// - Every [`Self::begin_reset`] starts a new generation; responses for older generations are
///   reported as [`Completion::Stale`] and never touch the sequence.
/// - A page is applied atomically: either all of its records are appended or none are.
#[derive(Clone, Debug)]
pub struct LoaderState<R, K> {
    options: PagerOptions<R, K>,
    records: Vec<R>,
    keys: KeySet<K>,
    meta: PageMeta,
    filters: Filters,
    generation: u64,
    in_flight: Option<RequestKind>,
}

impl<R, K: RecordKey> LoaderState<R, K> {
    pub fn new(options: PagerOptions<R, K>) -> Self {
        let meta = PageMeta::empty(options.page_size);
        Self {
            options,
            records: Vec::new(),
            keys: KeySet::<K>::new(),
            meta,
            filters: Filters::new(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn options(&self) -> &PagerOptions<R, K> {
        &self.options
    }

    pub fn meta(&self) -> PageMeta {
        self.meta
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight(&self) -> Option<RequestKind> {
        self.in_flight
    }

    /// A reset (first page for a new filter) is in flight.
    pub fn is_resetting(&self) -> bool {
        self.in_flight == Some(RequestKind::Reset)
    }

    /// A follow-up page is in flight.
    pub fn is_fetching(&self) -> bool {
        self.in_flight == Some(RequestKind::Next)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn key_for(&self, record: &R) -> K {
        self.options.key_for(record)
    }

    /// Clears the sequence and returns the request for page 1 of `filters`.
    ///
    /// Any request issued before this call becomes stale.
    pub fn begin_reset(&mut self, filters: Filters) -> PageRequest {
        self.clear();
        self.filters = filters;
        self.in_flight = Some(RequestKind::Reset);
        vdebug!(generation = self.generation, "begin_reset");
        PageRequest {
            generation: self.generation,
            kind: RequestKind::Reset,
            page: 1,
            page_size: self.meta.page_size,
            filters: self.filters.clone(),
        }
    }

    /// Returns the request for the next page, or `None` when there is nothing to fetch or a
    /// fetch is already in flight.
    pub fn begin_next(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            vtrace!(in_flight = ?self.in_flight, "begin_next: request already in flight");
            return None;
        }
        if !self.meta.is_loaded() || !self.meta.has_more {
            return None;
        }
        self.in_flight = Some(RequestKind::Next);
        let page = self.meta.pages_loaded + 1;
        vtrace!(generation = self.generation, page, "begin_next");
        Some(PageRequest {
            generation: self.generation,
            kind: RequestKind::Next,
            page,
            page_size: self.meta.page_size,
            filters: self.filters.clone(),
        })
    }

    fn is_current(&self, request: &PageRequest) -> bool {
        if request.generation != self.generation || self.in_flight != Some(request.kind) {
            return false;
        }
        match request.kind {
            RequestKind::Reset => request.page == 1,
            RequestKind::Next => request.page == self.meta.pages_loaded + 1,
        }
    }

    /// Applies a fetched page, or drops it when `request` is stale.
    pub fn complete(&mut self, request: &PageRequest, page: Page<R>) -> Completion {
        if !self.is_current(request) {
            vdebug!(
                request_generation = request.generation,
                generation = self.generation,
                page = request.page,
                "complete: dropping stale page"
            );
            return Completion::Stale;
        }
        self.in_flight = None;

        let Page {
            mut data,
            total,
            has_more,
        } = page;
        let page_size = self.meta.page_size;
        if data.len() > page_size {
            vwarn!(
                received = data.len(),
                page_size,
                "complete: source returned an oversized page; truncating"
            );
            data.truncate(page_size);
        }

        let mut skipped = 0usize;
        self.records.reserve(data.len());
        for record in data {
            let key = self.options.key_for(&record);
            if self.keys.contains(&key) {
                skipped += 1;
                continue;
            }
            self.keys.insert(key);
            self.records.push(record);
        }
        if skipped > 0 {
            vdebug!(skipped, page = request.page, "complete: skipped duplicate records");
        }

        self.meta.pages_loaded = request.page;
        self.meta.total_count = total;
        self.meta.has_more = has_more && self.records.len() < total;

        vdebug!(
            page = request.page,
            len = self.records.len(),
            total = self.meta.total_count,
            has_more = self.meta.has_more,
            "page applied"
        );
        Completion::Applied(self.meta)
    }

    /// Records a failed fetch. Nothing is appended and the in-flight guard is released.
    ///
    /// After a failed reset the sequence stays empty.
    pub fn fail(&mut self, request: &PageRequest) -> Completion {
        if !self.is_current(request) {
            return Completion::Stale;
        }
        vwarn!(
            generation = self.generation,
            page = request.page,
            kind = ?request.kind,
            "page fetch failed"
        );
        self.in_flight = None;
        Completion::Failed
    }

    /// Drops every record and invalidates outstanding requests.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.records.clear();
        self.keys.clear();
        self.meta = PageMeta::empty(self.options.page_size);
        self.in_flight = None;
    }
}
