use alloc::sync::Arc;

use crate::query::{InputClass, classify_default};

/// Extracts the identity key of a record.
pub type RecordKeyFn<R, K> = Arc<dyn Fn(&R) -> K + Send + Sync>;

/// Classifies raw query input (typed text or a pasted code).
pub type InputPolicy = Arc<dyn Fn(&str) -> InputClass + Send + Sync>;

pub const DEFAULT_PAGE_SIZE: usize = 40;
pub const DEFAULT_WINDOW_SIZE: usize = 3;
pub const DEFAULT_NEAR_END_PX: u64 = 50;
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.1;
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;
pub const DEFAULT_RESULT_CAP: usize = 100;

/// Configuration for [`crate::WindowController`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowOptions {
    /// Maximum number of pages materialized at once.
    pub window_size: usize,
    /// Distance from the end of the content (in pixels) that triggers a fetch-ahead.
    pub near_end_px: u64,
    /// Scroll fraction below which scrolling up snaps back to the first pages.
    pub snap_threshold: f64,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            near_end_px: DEFAULT_NEAR_END_PX,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

impl WindowOptions {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    pub fn with_near_end_px(mut self, near_end_px: u64) -> Self {
        self.near_end_px = near_end_px;
        self
    }

    pub fn with_snap_threshold(mut self, snap_threshold: f64) -> Self {
        self.snap_threshold = snap_threshold.clamp(0.0, 1.0);
        self
    }
}

/// Configuration for [`crate::LoaderState`] and the window that presents it.
///
/// Cheap to clone: the key extractor lives in an `Arc`.
pub struct PagerOptions<R, K> {
    pub page_size: usize,
    pub window: WindowOptions,
    /// Stable identity for a record (e.g. document number + sequence).
    pub get_record_key: RecordKeyFn<R, K>,
}

impl<R, K> Clone for PagerOptions<R, K> {
    fn clone(&self) -> Self {
        Self {
            page_size: self.page_size,
            window: self.window,
            get_record_key: Arc::clone(&self.get_record_key),
        }
    }
}

impl<R, K> PagerOptions<R, K> {
    pub fn new(get_record_key: impl Fn(&R) -> K + Send + Sync + 'static) -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            window: WindowOptions::default(),
            get_record_key: Arc::new(get_record_key),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_window(mut self, window: WindowOptions) -> Self {
        self.window = window;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window = self.window.with_window_size(window_size);
        self
    }

    pub fn with_near_end_px(mut self, near_end_px: u64) -> Self {
        self.window = self.window.with_near_end_px(near_end_px);
        self
    }

    pub fn key_for(&self, record: &R) -> K {
        (self.get_record_key)(record)
    }
}

impl<R, K> core::fmt::Debug for PagerOptions<R, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PagerOptions")
            .field("page_size", &self.page_size)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

/// Configuration for query debouncing and result capping.
pub struct QueryOptions {
    pub debounce_ms: u64,
    /// At most this many results are kept for rendering.
    pub result_cap: usize,
    /// Decides whether input is dispatched immediately, debounced, or rejected as too short.
    ///
    /// The default treats all-digit input as a scanned/pasted code (immediate) and requires
    /// [`DEFAULT_MIN_QUERY_LEN`] characters for free text.
    pub policy: InputPolicy,
}

impl Clone for QueryOptions {
    fn clone(&self) -> Self {
        Self {
            debounce_ms: self.debounce_ms,
            result_cap: self.result_cap,
            policy: Arc::clone(&self.policy),
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            result_cap: DEFAULT_RESULT_CAP,
            policy: Arc::new(|text| classify_default(text, DEFAULT_MIN_QUERY_LEN)),
        }
    }
}

impl QueryOptions {
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_result_cap(mut self, result_cap: usize) -> Self {
        self.result_cap = result_cap;
        self
    }

    /// Keeps the default numeric fast path but changes the free-text minimum length.
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.policy = Arc::new(move |text| classify_default(text, min_len));
        self
    }

    pub fn with_policy(
        mut self,
        policy: impl Fn(&str) -> InputClass + Send + Sync + 'static,
    ) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn classify(&self, text: &str) -> InputClass {
        (self.policy)(text)
    }
}

impl core::fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueryOptions")
            .field("debounce_ms", &self.debounce_ms)
            .field("result_cap", &self.result_cap)
            .finish_non_exhaustive()
    }
}
