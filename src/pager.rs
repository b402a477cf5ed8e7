// ============================================================================
// PAGER - Visible index and page cursor
// ============================================================================
//
// The visible index is always rebuilt from (dataset length, known set, hide
// flag). Nothing edits it in place.

use crate::selection::SelectionSet;

pub const PAGE_SIZE: usize = 100;

/// `[0, len)` minus the known indices when hiding, otherwise the full range.
pub fn visible_indices(len: usize, selection: &SelectionSet, hiding: bool) -> Vec<usize> {
    if hiding {
        (0..len).filter(|i| !selection.contains(*i)).collect()
    } else {
        (0..len).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    len: usize,
    visible: Vec<usize>,
    cursor: usize,
    hiding: bool,
}

impl Pager {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            visible: (0..len).collect(),
            cursor: 0,
            hiding: false,
        }
    }

    /// Rebuild from persisted state. A cursor past the end lands on the last page.
    pub fn restore(len: usize, selection: &SelectionSet, hiding: bool, cursor: usize) -> Self {
        let visible = visible_indices(len, selection, hiding);
        let cursor = if cursor < visible.len() {
            cursor
        } else {
            (visible.len().saturating_sub(1) / PAGE_SIZE) * PAGE_SIZE
        };
        Self {
            len,
            visible,
            cursor,
            hiding,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_hiding(&self) -> bool {
        self.hiding
    }

    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn hide_known(&mut self, selection: &SelectionSet) {
        self.hiding = true;
        self.visible = visible_indices(self.len, selection, true);
        self.clamp_to_last_full_page();
    }

    /// Caller is expected to have re-read `selection` from storage first.
    pub fn show_all(&mut self, selection: &SelectionSet) {
        self.hiding = false;
        self.visible = visible_indices(self.len, selection, false);
        self.cursor = (self.cursor / PAGE_SIZE) * PAGE_SIZE;
    }

    /// Recompute after the known set changed.
    pub fn refresh(&mut self, selection: &SelectionSet) {
        self.visible = visible_indices(self.len, selection, self.hiding);
        if self.hiding {
            self.clamp_to_last_full_page();
        }
    }

    // Not rounded to a page boundary; show_all realigns.
    fn clamp_to_last_full_page(&mut self) {
        let max_start = self.visible.len().saturating_sub(PAGE_SIZE);
        self.cursor = self.cursor.min(max_start);
    }

    pub fn advance(&mut self) -> bool {
        if self.cursor + PAGE_SIZE < self.visible.len() {
            self.cursor += PAGE_SIZE;
            true
        } else {
            false
        }
    }

    pub fn retreat(&mut self) -> bool {
        if self.cursor >= PAGE_SIZE {
            self.cursor -= PAGE_SIZE;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.len);
    }

    pub fn current_page(&self) -> &[usize] {
        let start = self.cursor.min(self.visible.len());
        let end = (self.cursor + PAGE_SIZE).min(self.visible.len());
        &self.visible[start..end]
    }

    /// Original position of the first visible word over the page size, plus
    /// one. Fractional once words are hidden.
    pub fn page_label(&self) -> Option<String> {
        self.visible
            .get(self.cursor)
            .map(|first| format!("{:.2}", *first as f64 / PAGE_SIZE as f64 + 1.0))
    }
}
