#![forbid(unsafe_code)]

//! View state for the result list rows and the list itself.
//!
//! These hold presentation flags only. The controller owns which result is
//! active; [`DropdownMenu::sync_with`] mirrors that onto the rows.

/// One row of the dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownItem {
    active: bool,
    focusable: bool,
    native_focus_requested: bool,
}

impl DropdownItem {
    /// An inactive row with a focusable button.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: false,
            focusable: true,
            native_focus_requested: false,
        }
    }

    /// A row without a focusable button (builder).
    #[must_use]
    pub fn without_button(mut self) -> Self {
        self.focusable = false;
        self
    }

    /// Whether the row is highlighted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate the row and, when allowed and the row has a button, request
    /// native focus for it.
    pub fn focus_element(&mut self, allow_native_focus: bool) {
        self.active = true;
        if allow_native_focus && self.focusable {
            self.native_focus_requested = true;
        }
    }

    /// Take a pending native focus request.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.native_focus_requested)
    }

    /// Deactivate the row.
    pub fn reset_state(&mut self) {
        self.active = false;
    }
}

/// The dropdown list: forwards focus and reset commands to its rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownMenu {
    items: Vec<DropdownItem>,
}

impl DropdownMenu {
    /// A menu with `len` inactive rows.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            items: vec![DropdownItem::new(); len],
        }
    }

    /// Rows in display order.
    #[must_use]
    pub fn items(&self) -> &[DropdownItem] {
        &self.items
    }

    /// Mutable row access.
    pub fn item_mut(&mut self, index: usize) -> Option<&mut DropdownItem> {
        self.items.get_mut(index)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the active row, if any.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.items.iter().position(DropdownItem::is_active)
    }

    /// Focus row `index` and reset the others. Out-of-range indices only
    /// reset.
    pub fn focus_item(&mut self, index: usize, allow_native_focus: bool) {
        for (i, item) in self.items.iter_mut().enumerate() {
            if i == index {
                item.focus_element(allow_native_focus);
            } else {
                item.reset_state();
            }
        }
    }

    /// Reset every row.
    pub fn reset_all(&mut self) {
        self.items.iter_mut().for_each(DropdownItem::reset_state);
    }

    /// Resize to `len` rows and mirror the controller's active result.
    ///
    /// Keyboard navigation keeps focus in the text field, so no native focus
    /// is requested.
    pub fn sync_with(&mut self, len: usize, active: Option<usize>) {
        self.items.resize_with(len, DropdownItem::new);
        match active {
            Some(index) => self.focus_item(index, false),
            None => self.reset_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_sets_active_and_requests_native_focus() {
        let mut item = DropdownItem::new();
        item.focus_element(true);
        assert!(item.is_active());
        assert!(item.take_focus_request());
        assert!(!item.take_focus_request());
    }

    #[test]
    fn focus_without_native_focus() {
        let mut item = DropdownItem::new();
        item.focus_element(false);
        assert!(item.is_active());
        assert!(!item.take_focus_request());

        let mut plain = DropdownItem::new().without_button();
        plain.focus_element(true);
        assert!(plain.is_active());
        assert!(!plain.take_focus_request());
    }

    #[test]
    fn reset_deactivates() {
        let mut item = DropdownItem::new();
        item.focus_element(false);
        item.reset_state();
        assert!(!item.is_active());
    }

    #[test]
    fn menu_keeps_one_active_row() {
        let mut menu = DropdownMenu::with_len(3);
        menu.focus_item(1, true);
        assert_eq!(menu.active_index(), Some(1));
        menu.focus_item(2, false);
        assert_eq!(menu.active_index(), Some(2));
        assert_eq!(menu.items().iter().filter(|i| i.is_active()).count(), 1);
        menu.reset_all();
        assert_eq!(menu.active_index(), None);
    }

    #[test]
    fn sync_resizes_and_mirrors() {
        let mut menu = DropdownMenu::default();
        menu.sync_with(2, Some(1));
        assert_eq!(menu.len(), 2);
        assert_eq!(menu.active_index(), Some(1));
        assert!(!menu.item_mut(1).is_some_and(DropdownItem::take_focus_request));

        menu.sync_with(0, None);
        assert!(menu.is_empty());
    }
}
