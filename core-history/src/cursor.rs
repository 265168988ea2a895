//! Keyboard focus over the history list.

/// Focused row of a list of `len` entries.
///
/// Starts unfocused. Moving down from nothing focuses the first row, moving
/// up from nothing (or from the first row) focuses the last; both
/// directions wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCursor {
    focused: Option<usize>,
    len: usize,
}

impl HistoryCursor {
    pub fn new(len: usize) -> Self {
        Self { focused: None, len }
    }

    /// Forget the focus after the list changed.
    pub fn reset(&mut self, len: usize) {
        self.focused = None;
        self.len = len;
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// ArrowDown
    pub fn focus_next(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.focused = Some(match self.focused {
            Some(i) if i + 1 < self.len => i + 1,
            _ => 0,
        });
        self.focused
    }

    /// ArrowUp
    pub fn focus_previous(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.focused = Some(match self.focused {
            Some(i) if i > 0 => i - 1,
            _ => self.len - 1,
        });
        self.focused
    }

    /// Enter: the focused row, if any.
    pub fn select(&self) -> Option<usize> {
        self.focused.filter(|&i| i < self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_down_wraps_to_first() {
        let mut cursor = HistoryCursor::new(3);
        assert_eq!(cursor.select(), None);
        assert_eq!(cursor.focus_next(), Some(0));
        assert_eq!(cursor.focus_next(), Some(1));
        assert_eq!(cursor.focus_next(), Some(2));
        assert_eq!(cursor.focus_next(), Some(0));
        assert_eq!(cursor.select(), Some(0));
    }

    #[test]
    fn test_up_wraps_to_last() {
        let mut cursor = HistoryCursor::new(3);
        assert_eq!(cursor.focus_previous(), Some(2));
        assert_eq!(cursor.focus_previous(), Some(1));
        assert_eq!(cursor.focus_previous(), Some(0));
        assert_eq!(cursor.focus_previous(), Some(2));
    }

    #[test]
    fn test_empty_list_and_reset() {
        let mut cursor = HistoryCursor::new(0);
        assert_eq!(cursor.focus_next(), None);
        assert_eq!(cursor.focus_previous(), None);

        cursor.reset(2);
        cursor.focus_next();
        assert_eq!(cursor.focused(), Some(0));

        cursor.reset(5);
        assert_eq!(cursor.focused(), None);
        assert_eq!(cursor.len(), 5);
    }
}
