use alloc::string::String;
use core::ops::Range;

use crate::{PageMeta, ScrollDirection, Window};

/// The last scroll sample seen by the window controller.
///
/// Transient: it only drives window transitions and never touches the loaded records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub last_offset: u64,
    pub direction: ScrollDirection,
}

/// A snapshot of everything the UI layer needs to render a windowed list.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewState {
    /// Record indexes of the visible slice.
    pub visible: Range<usize>,
    pub window: Window,
    pub meta: PageMeta,
    /// First page for the current filter is loading.
    pub loading: bool,
    /// A follow-up page is loading.
    pub loading_more: bool,
    /// User-facing notice from the last failed operation.
    pub error: Option<String>,
    pub selected: usize,
}

impl ViewState {
    pub fn total_count(&self) -> usize {
        self.meta.total_count
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }
}
