//! Caret/selection range in a host's text buffer.

/// A selection expressed in character offsets into the rendered mask text.
///
/// The range is always normalized such that `start <= end`. A zero-width
/// range is a plain caret.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionRange {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl SelectionRange {
    /// Create a new selection range, normalizing so `start <= end`.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// A zero-width selection at `pos`.
    #[inline]
    pub fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Returns `true` if this is a caret rather than a range.
    #[inline]
    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Number of selected characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Clamp both ends to `max`.
    #[inline]
    pub fn clamped(self, max: usize) -> Self {
        Self::new(self.start.min(max), self.end.min(max))
    }
}
