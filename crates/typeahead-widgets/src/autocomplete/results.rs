#![forbid(unsafe_code)]

//! The visible result list and its highlight.

/// Search results in the order the search function returned them, plus the
/// highlighted index.
///
/// The index wraps around in both directions and is 0 whenever the list is
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet<R> {
    items: Vec<R>,
    highlighted: usize,
}

impl<R> Default for ResultSet<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            highlighted: 0,
        }
    }
}

impl<R> ResultSet<R> {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the items wholesale and highlight the first.
    pub fn replace(&mut self, items: Vec<R>) {
        self.items = items;
        self.highlighted = 0;
    }

    /// Drop all items.
    pub fn clear(&mut self) {
        self.items.clear();
        self.highlighted = 0;
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The highlighted index.
    #[must_use]
    pub fn highlighted_index(&self) -> usize {
        self.highlighted
    }

    /// The highlighted item, if any.
    #[must_use]
    pub fn active(&self) -> Option<&R> {
        self.items.get(self.highlighted)
    }

    /// Move the highlight down, wrapping past the end.
    pub fn next(&mut self) {
        self.highlighted += 1;
        if self.highlighted >= self.items.len() {
            self.highlighted = 0;
        }
    }

    /// Move the highlight up, wrapping past the start. On an empty set this
    /// only resets the index.
    pub fn previous(&mut self) {
        if self.items.is_empty() {
            self.highlighted = 0;
            return;
        }
        self.highlighted = self
            .highlighted
            .checked_sub(1)
            .unwrap_or(self.items.len() - 1);
    }

    /// Highlight `index`. Returns `false`, leaving the highlight alone, when
    /// `index` is out of range.
    pub fn highlight(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.highlighted = index;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(n: usize) -> ResultSet<usize> {
        let mut set = ResultSet::new();
        set.replace((0..n).collect());
        set
    }

    #[test]
    fn next_wraps() {
        let mut s = set(2);
        s.next();
        assert_eq!(s.highlighted_index(), 1);
        s.next();
        assert_eq!(s.highlighted_index(), 0);
    }

    #[test]
    fn previous_wraps() {
        let mut s = set(3);
        s.previous();
        assert_eq!(s.highlighted_index(), 2);
        assert_eq!(s.active(), Some(&2));
    }

    #[test]
    fn empty_navigation_stays_at_zero() {
        let mut s = set(0);
        s.next();
        assert_eq!(s.highlighted_index(), 0);
        s.previous();
        assert_eq!(s.highlighted_index(), 0);
        assert_eq!(s.active(), None);
    }

    #[test]
    fn replace_resets_highlight() {
        let mut s = set(3);
        s.next();
        s.replace(vec![7, 8]);
        assert_eq!(s.highlighted_index(), 0);
        assert_eq!(s.items(), &[7, 8]);
    }

    #[test]
    fn highlight_rejects_out_of_range() {
        let mut s = set(2);
        assert!(s.highlight(1));
        assert!(!s.highlight(2));
        assert_eq!(s.highlighted_index(), 1);
        assert!(!set(0).highlight(0));
    }
}
