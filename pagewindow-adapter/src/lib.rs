//! Async drivers for the `pagewindow` crate.
//!
//! The `pagewindow` crate holds the loading, windowing and query state machines and performs
//! no I/O. This crate connects them to remote collaborators on a tokio runtime:
//!
//! - [`PageSource`] / [`FullDatasetSource`] / [`LookupSource`]: the remote query APIs
//! - [`PagedLoader`]: single-flight page fetching with stale-response rejection
//! - [`QueryDispatcher`]: debounced, epoch-tagged query dispatch with cancellable timers
//! - [`Lookup`]: a search box over a [`LookupSource`] (typed text and barcode scans)
//! - [`Controller`]: a filterable, windowed list page composing all of the above
//! - [`ResidentController`]: a list page over a table held in memory, filtered synchronously
//!
//! This crate is framework-agnostic; rendering and scan decoding stay in the UI layer.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod controller;
mod dispatcher;
mod error;
mod loader;
mod lookup;
mod resident;
mod source;


pub use controller::{Controller, ControllerOptions, DEFAULT_FILTER_FIELD, ResetTarget};
pub use dispatcher::{QueryDispatcher, QueryFuture, QueryTarget, Settled};
pub use error::{Error, FetchError, Result};
pub use loader::PagedLoader;
pub use lookup::{Lookup, LookupTarget};
pub use resident::{ResidentController, ResidentOptions};
pub use source::{
    FullDatasetSource, ListAll, LookupSource, PageSource, ResidentPages, SourceFuture,
};
