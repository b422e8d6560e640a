use core::ops::Range;

use crate::{
    PageMeta, ScrollDirection, ScrollOutcome, ScrollSample, ScrollState, Transition, Window,
    WindowOptions,
};

/// Decides which contiguous range of loaded pages is visible, driven by scroll samples.
///
/// The controller never performs I/O. When the user approaches the end of the loaded content
/// it reports `fetch_next = true` in the returned [`ScrollOutcome`]; the adapter performs the
/// fetch and then calls [`Self::sync`] with the new [`PageMeta`].
///
/// Page estimation is proportional (`ceil(scroll_fraction * total_pages)`), so no per-row
/// geometry is required.
#[derive(Clone, Debug)]
pub struct WindowController {
    options: WindowOptions,
    window: Window,
    scroll: ScrollState,
    /// `pages_loaded` the window was last fitted to.
    synced_pages: usize,
}

impl WindowController {
    pub fn new(options: WindowOptions) -> Self {
        Self {
            options,
            window: Window::EMPTY,
            scroll: ScrollState::default(),
            synced_pages: 0,
        }
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll
    }

    pub fn window_size(&self) -> usize {
        self.options.window_size.max(1)
    }

    /// Returns to the initial (empty) window, e.g. after a filter reset.
    pub fn reset(&mut self) {
        self.window = Window::EMPTY;
        self.scroll = ScrollState::default();
        self.synced_pages = 0;
    }

    /// The first-pages window for `pages_loaded`.
    pub fn initial_window(&self, pages_loaded: usize) -> Window {
        if pages_loaded == 0 {
            return Window::EMPTY;
        }
        Window::new(1, self.window_size().min(pages_loaded))
    }

    /// Re-clamps the window after the loaded page count changed.
    ///
    /// An empty window is opened at the first pages once something is loaded. A window that
    /// ended at the last loaded page follows newly loaded pages, sliding forward once it is
    /// `window_size` pages wide.
    pub fn sync(&mut self, meta: &PageMeta) -> Window {
        let loaded = meta.pages_loaded;
        self.window = if self.window.is_empty() {
            self.initial_window(loaded)
        } else if loaded > self.synced_pages && self.window.end_page >= self.synced_pages {
            let end = loaded;
            let start = self
                .window
                .start_page
                .max(end.saturating_sub(self.window_size() - 1))
                .max(1);
            self.clamp(Window::new(start, end), loaded)
        } else {
            self.clamp(self.window, loaded)
        };
        self.synced_pages = loaded;
        self.window
    }

    /// Feeds one scroll sample through the window state machine.
    ///
    /// `fetching` reports whether a page fetch is currently in flight.
    pub fn on_scroll(
        &mut self,
        sample: ScrollSample,
        meta: &PageMeta,
        fetching: bool,
    ) -> ScrollOutcome {
        let direction = if sample.offset > self.scroll.last_offset {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };
        self.scroll = ScrollState {
            last_offset: sample.offset,
            direction,
        };

        let previous = self.window;
        let loaded = meta.pages_loaded;
        let size = self.window_size();
        let fraction = scroll_fraction(sample);
        let estimated = estimated_page(sample, meta.total_pages());
        let mut fetch_next = false;

        let (transition, next) = if fraction < self.options.snap_threshold
            && direction == ScrollDirection::Up
        {
            (Transition::SnapToStart, self.initial_window(loaded))
        } else if direction == ScrollDirection::Down {
            if sample.distance_to_end() <= self.options.near_end_px && meta.has_more && !fetching
            {
                fetch_next = true;
            }
            if estimated > self.window.end_page && estimated <= loaded {
                let start = estimated.saturating_sub(size - 1).max(1);
                (
                    Transition::ShiftDown,
                    Window::new(start, estimated.min(loaded)),
                )
            } else {
                (Transition::Unchanged, self.window)
            }
        } else if fraction > self.options.snap_threshold && estimated < self.window.start_page {
            let start = estimated.max(1);
            (
                Transition::ShiftUp,
                Window::new(start, start.saturating_add(size - 1).min(loaded)),
            )
        } else {
            (Transition::Unchanged, self.window)
        };

        self.window = if loaded == 0 {
            Window::EMPTY
        } else if next.is_empty() {
            self.initial_window(loaded)
        } else {
            self.clamp(next, loaded)
        };

        self.synced_pages = loaded;

        let changed = self.window != previous;
        if changed {
            vtrace!(
                offset = sample.offset,
                estimated,
                start_page = self.window.start_page,
                end_page = self.window.end_page,
                transition = ?transition,
                "window moved"
            );
        }

        ScrollOutcome {
            transition,
            window: self.window,
            direction,
            changed,
            fetch_next,
        }
    }

    /// Centres the window on `page` (clamped to the loaded pages).
    pub fn jump_to_page(&mut self, page: usize, meta: &PageMeta) -> Window {
        let loaded = meta.pages_loaded;
        if loaded == 0 {
            self.window = Window::EMPTY;
            return self.window;
        }
        let size = self.window_size();
        let page = page.clamp(1, loaded);
        let start = page.saturating_sub(size / 2).max(1);
        let end = start.saturating_add(size - 1).min(loaded);
        let start = end.saturating_sub(size - 1).max(1);
        self.window = Window::new(start, end);
        self.synced_pages = loaded;
        self.window
    }

    /// Record indexes covered by the current window, bounded by `len`.
    pub fn visible_range(&self, meta: &PageMeta, len: usize) -> Range<usize> {
        window_range(self.window, meta.page_size, len)
    }

    fn clamp(&self, window: Window, loaded: usize) -> Window {
        if loaded == 0 {
            return Window::EMPTY;
        }
        let size = self.window_size();
        let end = window.end_page.clamp(1, loaded);
        let mut start = window.start_page.clamp(1, end);
        if end - start >= size {
            start = end - (size - 1);
        }
        Window::new(start, end)
    }
}

impl Default for WindowController {
    fn default() -> Self {
        Self::new(WindowOptions::default())
    }
}

/// `offset / scrollable`, clamped to `[0, 1]`; `0` when the content does not scroll.
pub fn scroll_fraction(sample: ScrollSample) -> f64 {
    let scrollable = sample.scrollable();
    if scrollable == 0 {
        return 0.0;
    }
    let fraction = sample.offset as f64 / scrollable as f64;
    fraction.clamp(0.0, 1.0)
}

/// `ceil(scroll_fraction * total_pages)` computed in integers.
pub fn estimated_page(sample: ScrollSample, total_pages: usize) -> usize {
    let scrollable = sample.scrollable();
    if scrollable == 0 {
        return 0;
    }
    let offset = sample.offset.min(scrollable) as u128;
    let pages = (offset * total_pages as u128).div_ceil(scrollable as u128);
    pages as usize
}

/// Record indexes for `window` with the given page size, bounded by `len`.
pub fn window_range(window: Window, page_size: usize, len: usize) -> Range<usize> {
    if window.is_empty() {
        return 0..0;
    }
    let start = (window.start_page - 1).saturating_mul(page_size).min(len);
    let end = window.end_page.saturating_mul(page_size).min(len);
    start..end
}
