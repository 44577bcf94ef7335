use crate::source::Release;

use super::Catalog;

/// Entries per list page.
pub const PAGE_LEN: usize = 10;

/// What the release list currently shows: stable releases only, or every
/// release, and which page of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseView {
    show_weekly: bool,
    offset: usize,
}

impl ReleaseView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_weekly(&self) -> bool {
        self.show_weekly
    }

    /// Index of the first entry on the current page.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Releases visible under the current filter, in catalog order.
    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Release> {
        if self.show_weekly {
            catalog.releases().iter().collect()
        } else {
            catalog.stable().collect()
        }
    }

    /// The current page of visible releases.
    pub fn page<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Release> {
        self.visible(catalog)
            .into_iter()
            .skip(self.offset)
            .take(PAGE_LEN)
            .collect()
    }

    /// Release in position `slot` (0-9) of the current page.
    pub fn select<'a>(&self, catalog: &'a Catalog, slot: usize) -> Option<&'a Release> {
        if slot >= PAGE_LEN {
            return None;
        }
        self.visible(catalog).get(self.offset + slot).copied()
    }

    pub fn next_page(&mut self, catalog: &Catalog) -> bool {
        if self.offset + PAGE_LEN < self.visible(catalog).len() {
            self.offset += PAGE_LEN;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.offset >= PAGE_LEN {
            self.offset -= PAGE_LEN;
            true
        } else {
            false
        }
    }

    /// 1-based number of the current page and the page total (at least 1).
    pub fn page_position(&self, catalog: &Catalog) -> (usize, usize) {
        let total = self.visible(catalog).len().div_ceil(PAGE_LEN).max(1);
        (self.offset / PAGE_LEN + 1, total)
    }

    /// Switches between the stable and the full list.
    pub fn toggle_weekly(&mut self, catalog: &Catalog) {
        self.show_weekly = !self.show_weekly;
        self.clamp(catalog);
    }

    /// Moves the offset back onto the last page when the list got shorter.
    pub fn clamp(&mut self, catalog: &Catalog) {
        let len = self.visible(catalog).len();
        if self.offset >= len {
            self.offset = len.saturating_sub(1) / PAGE_LEN * PAGE_LEN;
        }
    }
}
