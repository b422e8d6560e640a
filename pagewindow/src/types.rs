use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// Opaque filter map forwarded verbatim to the page source.
pub type Filters = BTreeMap<String, String>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    #[default]
    Up,
    Down,
}

/// Paging bookkeeping for the currently loaded sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageMeta {
    pub page_size: usize,
    pub pages_loaded: usize,
    /// Authoritative row count reported by the source.
    pub total_count: usize,
    pub has_more: bool,
}

impl PageMeta {
    pub fn empty(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            pages_loaded: 0,
            total_count: 0,
            has_more: false,
        }
    }

    /// `ceil(total_count / page_size)`.
    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size.max(1))
    }

    pub fn is_loaded(&self) -> bool {
        self.pages_loaded > 0
    }
}

/// A contiguous, 1-based, inclusive range of loaded pages.
///
/// `{ start_page: 1, end_page: 0 }` is the empty window used while nothing is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub start_page: usize,
    pub end_page: usize,
}

impl Window {
    pub const EMPTY: Window = Window {
        start_page: 1,
        end_page: 0,
    };

    pub fn new(start_page: usize, end_page: usize) -> Self {
        Self {
            start_page,
            end_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end_page < self.start_page
    }

    pub fn pages(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end_page - self.start_page + 1
        }
    }

    pub fn contains(&self, page: usize) -> bool {
        page >= self.start_page && page <= self.end_page
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// One page as returned by a paged source.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<R> {
    pub data: Vec<R>,
    pub total: usize,
    pub has_more: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RequestKind {
    Reset,
    Next,
}

/// A page fetch handed out by [`crate::LoaderState`].
///
/// The `generation` ties the response back to the filter it was issued for; responses for an
/// older generation are discarded by [`crate::LoaderState::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub kind: RequestKind,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    pub filters: Filters,
}

/// What happened to a finished page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Applied(PageMeta),
    Failed,
    /// The request belongs to a superseded generation and was dropped.
    Stale,
}

/// One scroll measurement from the UI layer, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSample {
    pub offset: u64,
    /// Full content height (scroll height).
    pub extent: u64,
    /// Viewport height.
    pub client_height: u32,
}

impl ScrollSample {
    pub fn new(offset: u64, extent: u64, client_height: u32) -> Self {
        Self {
            offset,
            extent,
            client_height,
        }
    }

    /// Maximum reachable scroll offset.
    pub fn scrollable(&self) -> u64 {
        self.extent.saturating_sub(self.client_height as u64)
    }

    /// Distance in pixels between the bottom of the viewport and the end of the content.
    pub fn distance_to_end(&self) -> u64 {
        self.extent
            .saturating_sub(self.offset.saturating_add(self.client_height as u64))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transition {
    SnapToStart,
    ShiftDown,
    ShiftUp,
    Unchanged,
}

/// Result of feeding one scroll sample to [`crate::WindowController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub transition: Transition,
    pub window: Window,
    pub direction: ScrollDirection,
    /// `true` when `window` differs from the window before the sample.
    pub changed: bool,
    /// The adapter should call `fetch_next` now.
    pub fetch_next: bool,
}
