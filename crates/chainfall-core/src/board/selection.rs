//! Selection and swap commands.
//!
//! These operate on the board alone; the engine suppresses them while a
//! cascade is running.

use super::Board;

impl Board {
    /// Returns the selected index, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Returns true if a token is selected.
    #[must_use]
    pub const fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    /// Selects the token under the cursor.
    ///
    /// No-op if a token is already selected or the cursor token cannot be
    /// selected. Returns true if the selection changed.
    pub fn select(&mut self) -> bool {
        if self.selected.is_some() {
            return false;
        }
        let index = self.cursor_index();
        if !self.cells[index].can_select() {
            return false;
        }
        self.cells[index].select();
        self.selected = Some(index);
        true
    }

    /// Clears the selection, returning the token to rest.
    ///
    /// Returns false if nothing was selected.
    pub fn release(&mut self) -> bool {
        let Some(index) = self.selected.take() else {
            return false;
        };
        self.cells[index].deselect();
        true
    }

    /// Exchanges the selected token with the token under the cursor.
    ///
    /// No-op if nothing is selected, the cursor is on the selected token, or
    /// either token cannot be swapped. The selection is cleared before the
    /// slots are exchanged; token identity moves with the slot contents.
    pub fn swap(&mut self) -> bool {
        let Some(source) = self.selected else {
            return false;
        };
        let target = self.cursor_index();
        if source == target {
            return false;
        }
        if !self.cells[source].can_swap() || !self.cells[target].can_swap() {
            return false;
        }
        self.release();
        self.cells.swap(source, target);
        true
    }
}
