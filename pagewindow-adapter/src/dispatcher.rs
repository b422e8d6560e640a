use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use pagewindow::{Debouncer, Epoch, EpochGate, InputDecision, Query, QueryOptions};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{Error, Result};

/// Boxed future returned by [`QueryTarget::run`].
pub type QueryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// What a settled query does: a remote lookup, a loader reset, an in-memory filter...
pub trait QueryTarget: Send + Sync + 'static {
    type Output: Send + 'static;

    fn run<'a>(&'a self, query: &'a Query) -> QueryFuture<'a, Self::Output>;
}

/// The outcome of the most recent query.
#[derive(Debug)]
pub struct Settled<T> {
    pub epoch: Epoch,
    pub query: Query,
    pub outcome: Result<T>,
}

enum Event<T> {
    TimerFired,
    Done {
        epoch: Epoch,
        query: Query,
        outcome: Result<T>,
    },
}

/// Turns raw input (typed text, pasted codes, scans) into at most one effective query per
/// settling of input, and rejects results of superseded queries.
///
/// - Debounce timers are truly cancelled: new input aborts the pending timer task.
/// - Dispatched queries are never aborted. Each carries the [`Epoch`] it was issued under, and
///   only the outcome for the current epoch is returned by [`Self::next_result`]; older
///   outcomes are dropped regardless of arrival order.
///
/// All state lives in this value and is mutated only by its owner; spawned tasks communicate
/// back through a channel. Requires a tokio runtime.
pub struct QueryDispatcher<T: QueryTarget> {
    target: Arc<T>,
    debouncer: Debouncer,
    gate: EpochGate,
    clock: Instant,
    timer: Option<JoinHandle<()>>,
    in_flight: Option<Epoch>,
    notice: Option<Error>,
    tx: mpsc::UnboundedSender<Event<T::Output>>,
    rx: mpsc::UnboundedReceiver<Event<T::Output>>,
}

impl<T: QueryTarget> QueryDispatcher<T> {
    pub fn new(target: T, options: QueryOptions) -> Self {
        Self::from_arc(Arc::new(target), options)
    }

    pub fn from_arc(target: Arc<T>, options: QueryOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            target,
            debouncer: Debouncer::new(options),
            gate: EpochGate::new(),
            clock: Instant::now(),
            timer: None,
            in_flight: None,
            notice: None,
            tx,
            rx,
        }
    }

    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    pub fn options(&self) -> &QueryOptions {
        self.debouncer.options()
    }

    pub fn epoch(&self) -> Epoch {
        self.gate.current()
    }

    /// A query for the current epoch is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight == Some(self.gate.current())
    }

    /// Input is waiting for its debounce delay.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// The last locally handled problem (too-short input is not one; a bad scan is).
    pub fn notice(&self) -> Option<&Error> {
        self.notice.as_ref()
    }

    fn now_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Records new input text.
    ///
    /// Returns [`InputDecision::Cleared`] when the caller should clear shown results; any
    /// query still in flight is invalidated in that case.
    pub fn on_input_change(&mut self, text: &str) -> InputDecision {
        self.cancel_timer();
        self.notice = None;
        let decision = self.debouncer.on_input(text, self.now_ms());
        match &decision {
            InputDecision::Dispatch(query) => {
                self.dispatch(query.clone());
            }
            InputDecision::Scheduled { due_ms } => {
                let delay = Duration::from_millis(due_ms.saturating_sub(self.now_ms()));
                let tx = self.tx.clone();
                self.timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Event::TimerFired);
                }));
            }
            InputDecision::Cleared => {
                self.gate.invalidate();
                self.in_flight = None;
            }
        }
        decision
    }

    /// Dispatches a decoded scan immediately, bypassing the debounce and the length policy.
    pub fn on_scan_result(&mut self, code: &str) -> Result<Epoch> {
        self.cancel_timer();
        let query = self.debouncer.on_scan(code);
        if query.text.is_empty() {
            return Err(self.reject_scan("empty scan code"));
        }
        self.notice = None;
        Ok(self.dispatch(query))
    }

    /// Reports a frame the decoder could not read. The scan session stays open.
    pub fn on_scan_error(&mut self, message: &str) -> Error {
        self.reject_scan(message)
    }

    fn reject_scan(&mut self, message: &str) -> Error {
        awarn!(reason = message, "unreadable scan");
        let err = Error::InvalidInput(message.to_string());
        self.notice = Some(err.clone());
        err
    }

    /// Dispatches `text` now (e.g. on Enter), cancelling any pending input.
    pub fn submit(&mut self, text: &str) -> Epoch {
        self.cancel_timer();
        self.notice = None;
        let query = self.debouncer.submit(text);
        self.dispatch(query)
    }

    fn dispatch(&mut self, query: Query) -> Epoch {
        let epoch = self.gate.advance();
        self.in_flight = Some(epoch);
        adebug!(epoch = epoch.0, origin = ?query.origin, "dispatching query");
        let target = Arc::clone(&self.target);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = target.run(&query).await;
            let _ = tx.send(Event::Done {
                epoch,
                query,
                outcome,
            });
        });
        epoch
    }

    fn handle(&mut self, event: Event<T::Output>) -> Option<Settled<T::Output>> {
        match event {
            Event::TimerFired => {
                if let Some(query) = self.debouncer.poll(self.now_ms()) {
                    self.dispatch(query);
                }
                None
            }
            Event::Done {
                epoch,
                query,
                outcome,
            } => {
                if !self.gate.is_current(epoch) {
                    atrace!(
                        epoch = epoch.0,
                        current = self.gate.current().0,
                        "dropping stale query result"
                    );
                    return None;
                }
                self.in_flight = None;
                #[cfg(feature = "tracing")]
                if let Err(err) = &outcome {
                    awarn!(epoch = epoch.0, error = %err, "query failed");
                }
                Some(Settled {
                    epoch,
                    query,
                    outcome,
                })
            }
        }
    }

    /// Waits for the outcome of the current query, firing due debounce timers on the way.
    ///
    /// Never resolves while nothing is pending or in flight; use it inside a `select!` with
    /// the UI's other event sources.
    pub async fn next_result(&mut self) -> Option<Settled<T::Output>> {
        loop {
            let event = self.rx.recv().await?;
            if let Some(settled) = self.handle(event) {
                return Some(settled);
            }
        }
    }

    /// Non-blocking variant of [`Self::next_result`].
    pub fn try_next_result(&mut self) -> Option<Settled<T::Output>> {
        while let Ok(event) = self.rx.try_recv() {
            if let Some(settled) = self.handle(event) {
                return Some(settled);
            }
        }
        None
    }

    /// Cancels pending input and makes every outstanding result stale.
    pub fn dispose(&mut self) {
        self.cancel_timer();
        self.debouncer.cancel();
        self.gate.invalidate();
        self.in_flight = None;
        self.notice = None;
    }
}

impl<T: QueryTarget> Drop for QueryDispatcher<T> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
