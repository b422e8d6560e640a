use pagewindow::{Epoch, InputDecision, Query, QueryOptions};

use crate::{Error, LookupSource, QueryDispatcher, QueryFuture, QueryTarget, Result};

/// Runs a [`LookupSource`] and caps its results.
pub struct LookupTarget<L> {
    source: L,
    result_cap: usize,
}

impl<L: LookupSource> LookupTarget<L> {
    pub fn new(source: L, result_cap: usize) -> Self {
        Self { source, result_cap }
    }

    pub fn source(&self) -> &L {
        &self.source
    }
}

impl<L: LookupSource> QueryTarget for LookupTarget<L> {
    type Output = Vec<L::Record>;

    fn run<'a>(&'a self, query: &'a Query) -> QueryFuture<'a, Self::Output> {
        Box::pin(async move {
            let mut rows = self.source.lookup(query).await?;
            rows.truncate(self.result_cap);
            Ok(rows)
        })
    }
}

/// A search box (typed text or scanned codes) over a [`LookupSource`].
///
/// Holds the results of the latest settled query. Input that is too short clears them; a
/// failed query clears them and records the error.
pub struct Lookup<L: LookupSource> {
    dispatcher: QueryDispatcher<LookupTarget<L>>,
    results: Vec<L::Record>,
    error: Option<Error>,
}

impl<L: LookupSource> Lookup<L> {
    pub fn new(source: L, options: QueryOptions) -> Self {
        let target = LookupTarget::new(source, options.result_cap);
        Self {
            dispatcher: QueryDispatcher::new(target, options),
            results: Vec::new(),
            error: None,
        }
    }

    pub fn dispatcher(&self) -> &QueryDispatcher<LookupTarget<L>> {
        &self.dispatcher
    }

    pub fn results(&self) -> &[L::Record] {
        &self.results
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref().or(self.dispatcher.notice())
    }

    pub fn is_loading(&self) -> bool {
        self.dispatcher.is_loading()
    }

    pub fn on_input_change(&mut self, text: &str) -> InputDecision {
        let decision = self.dispatcher.on_input_change(text);
        if matches!(decision, InputDecision::Cleared) {
            self.results.clear();
            self.error = None;
        }
        decision
    }

    pub fn on_scan_result(&mut self, code: &str) -> Result<Epoch> {
        self.dispatcher.on_scan_result(code)
    }

    pub fn on_scan_error(&mut self, message: &str) -> Error {
        self.dispatcher.on_scan_error(message)
    }

    pub fn submit(&mut self, text: &str) -> Epoch {
        self.dispatcher.submit(text)
    }

    fn apply(&mut self, outcome: Result<Vec<L::Record>>) -> Result<usize> {
        match outcome {
            Ok(rows) => {
                self.results = rows;
                self.error = None;
                Ok(self.results.len())
            }
            Err(err) => {
                self.results.clear();
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Waits for the current query and applies its outcome. Returns the number of results.
    pub async fn settle(&mut self) -> Option<Result<usize>> {
        let settled = self.dispatcher.next_result().await?;
        Some(self.apply(settled.outcome))
    }

    /// Applies the current query's outcome if it already arrived.
    pub fn poll(&mut self) -> Option<Result<usize>> {
        let settled = self.dispatcher.try_next_result()?;
        Some(self.apply(settled.outcome))
    }

    pub fn dispose(&mut self) {
        self.dispatcher.dispose();
        self.results.clear();
        self.error = None;
    }
}
