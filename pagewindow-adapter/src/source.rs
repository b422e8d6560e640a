use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use pagewindow::{Filters, Page, Query};

use crate::FetchError;

/// Boxed future returned by source collaborators.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'a>>;

/// A remote paged query API (`listPage(filters, page, pageSize)`).
///
/// `filters` are forwarded verbatim; the loader never interprets them.
pub trait PageSource: Send + Sync + 'static {
    type Record: Send + 'static;

    /// Fetches 1-based page `page` of `page_size` records.
    fn list_page<'a>(
        &'a self,
        filters: &'a Filters,
        page: usize,
        page_size: usize,
    ) -> SourceFuture<'a, Page<Self::Record>>;
}

/// Response of a whole-table query.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListAll<R> {
    pub success: bool,
    pub data: Vec<R>,
}

/// A query API that returns the entire table at once (`listAll(filters)`).
pub trait FullDatasetSource: Send + Sync + 'static {
    type Record: Clone + Send + Sync + 'static;

    fn list_all<'a>(&'a self, filters: &'a Filters) -> SourceFuture<'a, ListAll<Self::Record>>;
}

/// A search API used for query-as-you-type and barcode lookups.
pub trait LookupSource: Send + Sync + 'static {
    type Record: Send + 'static;

    fn lookup<'a>(&'a self, query: &'a Query) -> SourceFuture<'a, Vec<Self::Record>>;
}

struct Resident<R> {
    filters: Filters,
    rows: Arc<Vec<R>>,
}

/// Serves pages from a [`FullDatasetSource`] by fetching the whole table once per filter and
/// slicing it locally.
///
/// Page 1 always refetches, so a reset observes fresh data; later pages reuse the cached table
/// while the filters are unchanged.
pub struct ResidentPages<S: FullDatasetSource> {
    source: S,
    cache: Mutex<Option<Resident<S::Record>>>,
}

impl<S: FullDatasetSource> ResidentPages<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn cached(&self, filters: &Filters) -> Option<Arc<Vec<S::Record>>> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .as_ref()
            .filter(|resident| &resident.filters == filters)
            .map(|resident| Arc::clone(&resident.rows))
    }

    async fn rows(
        &self,
        filters: &Filters,
        page: usize,
    ) -> Result<Arc<Vec<S::Record>>, FetchError> {
        if page > 1 {
            if let Some(rows) = self.cached(filters) {
                return Ok(rows);
            }
        }
        let response = self.source.list_all(filters).await?;
        if !response.success {
            return Err(FetchError::Rejected("full-dataset query failed".to_string()));
        }
        let rows = Arc::new(response.data);
        adebug!(rows = rows.len(), "resident table loaded");
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            *cache = Some(Resident {
                filters: filters.clone(),
                rows: Arc::clone(&rows),
            });
        }
        Ok(rows)
    }
}

impl<S: FullDatasetSource> PageSource for ResidentPages<S> {
    type Record = S::Record;

    fn list_page<'a>(
        &'a self,
        filters: &'a Filters,
        page: usize,
        page_size: usize,
    ) -> SourceFuture<'a, Page<Self::Record>> {
        Box::pin(async move {
            let rows = self.rows(filters, page).await?;
            let page_size = page_size.max(1);
            let start = page.saturating_sub(1).saturating_mul(page_size).min(rows.len());
            let end = start.saturating_add(page_size).min(rows.len());
            Ok(Page {
                data: rows[start..end].to_vec(),
                total: rows.len(),
                has_more: end < rows.len(),
            })
        })
    }
}
