use alloc::string::{String, ToString};

use crate::QueryOptions;

/// How a piece of raw query input should be handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputClass {
    /// Dispatch without waiting (scanned or pasted codes).
    Immediate,
    /// Dispatch once input settles.
    Debounced,
    /// Never dispatched; clears any shown results.
    TooShort,
}

/// The default input policy: an all-digit code of at least one digit is dispatched
/// immediately, free text needs `min_len` characters.
pub fn classify_default(text: &str, min_len: usize) -> InputClass {
    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return InputClass::Immediate;
    }
    if trimmed.chars().count() < min_len {
        return InputClass::TooShort;
    }
    InputClass::Debounced
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryOrigin {
    Typed,
    Scan,
    /// An explicit user action (e.g. pressing Enter or clearing the filter).
    Submitted,
}

/// One settled query, ready to be dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Query {
    pub text: String,
    pub origin: QueryOrigin,
}

impl Query {
    pub fn new(text: impl Into<String>, origin: QueryOrigin) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

/// What the caller should do after an input change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputDecision {
    /// Dispatch this query now.
    Dispatch(Query),
    /// A query is pending until `due_ms`.
    Scheduled { due_ms: u64 },
    /// The input is too short; clear the shown results.
    Cleared,
}

/// Adapter-driven input debouncer.
///
/// Time is supplied by the caller as milliseconds from any fixed origin. New input always
/// replaces the pending query, so a superseded query is never returned by [`Self::poll`].
#[derive(Clone, Debug)]
pub struct Debouncer {
    options: QueryOptions,
    pending: Option<(Query, u64)>,
}

impl Debouncer {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            options,
            pending: None,
        }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn on_input(&mut self, text: &str, now_ms: u64) -> InputDecision {
        self.pending = None;
        match self.options.classify(text) {
            InputClass::Immediate => {
                vtrace!(len = text.len(), "debouncer: immediate");
                InputDecision::Dispatch(Query::new(text.to_string(), QueryOrigin::Typed))
            }
            InputClass::TooShort => {
                vtrace!(len = text.len(), "debouncer: too short");
                InputDecision::Cleared
            }
            InputClass::Debounced => {
                let due_ms = now_ms.saturating_add(self.options.debounce_ms);
                self.pending = Some((Query::new(text.to_string(), QueryOrigin::Typed), due_ms));
                InputDecision::Scheduled { due_ms }
            }
        }
    }

    /// A scan is atomic and already validated: it cancels pending input and bypasses both the
    /// delay and the length policy.
    pub fn on_scan(&mut self, code: &str) -> Query {
        self.pending = None;
        Query::new(code.trim().to_string(), QueryOrigin::Scan)
    }

    /// Cancels pending input and returns an explicitly submitted query.
    pub fn submit(&mut self, text: &str) -> Query {
        self.pending = None;
        Query::new(text.to_string(), QueryOrigin::Submitted)
    }

    /// Returns the pending query once it is due.
    pub fn poll(&mut self, now_ms: u64) -> Option<Query> {
        let due = matches!(&self.pending, Some((_, due_ms)) if now_ms >= *due_ms);
        if !due {
            return None;
        }
        self.pending.take().map(|(query, _)| query)
    }

    pub fn due_ms(&self) -> Option<u64> {
        self.pending.as_ref().map(|(_, due_ms)| *due_ms)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Identifies one dispatched query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Epoch(pub u64);

/// Monotonic epoch counter used to reject results of superseded queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpochGate {
    current: Epoch,
}

impl EpochGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Epoch {
        self.current
    }

    /// Starts a new epoch and returns it. Results tagged with older epochs become stale.
    pub fn advance(&mut self) -> Epoch {
        self.current = Epoch(self.current.0.wrapping_add(1));
        self.current
    }

    /// Makes every outstanding result stale without starting a query.
    pub fn invalidate(&mut self) {
        self.advance();
    }

    pub fn is_current(&self, epoch: Epoch) -> bool {
        self.current == epoch
    }
}
