//! Headless incremental loading and windowed presentation for large scrollable lists.
//!
//! For async drivers (paged sources, debounced queries, a page-level controller), see the
//! `pagewindow-adapter` crate.
//!
//! This crate holds the state machines only, and performs no I/O and keeps no timers:
//! - [`LoaderState`]: an append-only, filter-scoped record sequence fed page by page, with a
//!   single-flight guard and generation-based rejection of stale responses.
//! - [`WindowController`]: a sliding window of at most `window_size` loaded pages, moved by
//!   scroll samples, which also tells the adapter when to fetch ahead.
//! - [`Debouncer`] / [`EpochGate`]: query-as-you-type debouncing and stale-result rejection.
//! - [`ResidentFilter`]: instant, capped filtering of a fully loaded dataset.
//! - [`SelectionSet`]: identity-keyed selection that survives window movement.
//!
//! A UI layer is expected to provide:
//! - scroll offset, content extent and viewport height
//! - fetched pages (via an adapter)
//! - a clock for debouncing
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod filter;
mod key;
mod loader;
mod options;
mod query;
mod selection;
mod state;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use filter::{RecordMatcher, ResidentFilter};
pub use key::RecordKey;
pub use loader::LoaderState;
pub use options::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_MIN_QUERY_LEN, DEFAULT_NEAR_END_PX, DEFAULT_PAGE_SIZE,
    DEFAULT_RESULT_CAP, DEFAULT_SNAP_THRESHOLD, DEFAULT_WINDOW_SIZE, InputPolicy, PagerOptions,
    QueryOptions, RecordKeyFn, WindowOptions,
};
pub use query::{
    Debouncer, Epoch, EpochGate, InputClass, InputDecision, Query, QueryOrigin, classify_default,
};
pub use selection::SelectionSet;
pub use state::{ScrollState, ViewState};
pub use types::{
    Completion, Filters, Page, PageMeta, PageRequest, RequestKind, ScrollDirection,
    ScrollOutcome, ScrollSample, Transition, Window,
};
pub use window::{WindowController, estimated_page, scroll_fraction, window_range};
