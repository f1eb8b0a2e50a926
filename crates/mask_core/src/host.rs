//! Text cursor host capability.
//!
//! The engine never touches a concrete UI toolkit. Whatever surface shows the
//! mask (a DOM input, an egui text field, a terminal line) implements
//! [`TextCursorHost`] and hands it to the [`MaskParser`](crate::MaskParser).
//!
//! All offsets are character offsets into the host's text, not byte offsets.

use crate::selection::SelectionRange;

pub trait TextCursorHost {
    /// Current text of the host buffer.
    fn text(&self) -> &str;

    /// Replace the whole buffer.
    fn write_text(&mut self, text: &str);

    /// Current caret/selection.
    fn selection(&self) -> SelectionRange;

    /// Select `[start, end)`. A zero-width range must place a caret.
    fn set_selection(&mut self, range: SelectionRange);

    /// Whether the host element currently has input focus.
    fn is_focused(&self) -> bool {
        true
    }
}

impl<H: TextCursorHost + ?Sized> TextCursorHost for Box<H> {
    #[inline]
    fn text(&self) -> &str {
        (**self).text()
    }

    #[inline]
    fn write_text(&mut self, text: &str) {
        (**self).write_text(text)
    }

    #[inline]
    fn selection(&self) -> SelectionRange {
        (**self).selection()
    }

    #[inline]
    fn set_selection(&mut self, range: SelectionRange) {
        (**self).set_selection(range)
    }

    #[inline]
    fn is_focused(&self) -> bool {
        (**self).is_focused()
    }
}

/// In-memory host backed by a `String`.
///
/// Used by tests, benches and the terminal replay tool. Tracks a write
/// revision so callers can tell whether a key caused a re-render.
#[derive(Clone, Debug, Default)]
pub struct StringHost {
    text: String,
    selection: SelectionRange,
    focused: bool,
    text_rev: u64,
}

impl StringHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Caret offset (start of the selection).
    pub fn caret(&self) -> usize {
        self.selection.start
    }

    /// Monotonic counter incremented on every `write_text`.
    pub fn text_revision(&self) -> u64 {
        self.text_rev
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl TextCursorHost for StringHost {
    fn text(&self) -> &str {
        &self.text
    }

    fn write_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.text_rev = self.text_rev.wrapping_add(1);
        self.selection = self.selection.clamped(self.char_len());
    }

    fn selection(&self) -> SelectionRange {
        self.selection
    }

    fn set_selection(&mut self, range: SelectionRange) {
        self.selection = range.clamped(self.char_len());
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}
