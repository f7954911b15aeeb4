//! Selection and scroll state for the process table.

use crate::ui::window_offset;

/// Selected row and first visible row.
///
/// Kept valid against the current snapshot: `selected_index < len` when the
/// snapshot is non-empty, otherwise zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    selected_index: usize,
    scroll_offset: usize,
}

impl ViewState {
    /// Selection at the first row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the highlighted record.
    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Index of the first visible record.
    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Clamps the selection to a snapshot of `len` records.
    pub fn reconcile(&mut self, len: usize) {
        if len == 0 {
            self.selected_index = 0;
            self.scroll_offset = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
        self.scroll_offset = self.scroll_offset.min(self.selected_index);
    }

    /// Recomputes the scroll offset for a viewport of `visible_rows`.
    pub fn scroll_to_fit(&mut self, visible_rows: usize) {
        self.scroll_offset = window_offset(self.selected_index, visible_rows);
    }

    /// Moves the selection up one row, stopping at the first.
    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Moves the selection down one row, stopping at the last of `count`.
    pub fn move_down(&mut self, count: usize) {
        if self.selected_index + 1 < count {
            self.selected_index += 1;
        }
    }

    /// Moves up by `page` rows (at least one).
    pub fn page_up(&mut self, page: usize) {
        self.selected_index = self.selected_index.saturating_sub(page.max(1));
    }

    /// Moves down by `page` rows (at least one), stopping at the last of `count`.
    pub fn page_down(&mut self, count: usize, page: usize) {
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + page.max(1)).min(count - 1);
    }

    /// Selects the first row.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Selects the last of `count` rows.
    pub fn select_last(&mut self, count: usize) {
        self.selected_index = count.saturating_sub(1);
    }
}
