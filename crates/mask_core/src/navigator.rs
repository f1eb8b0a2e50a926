//! Cursor navigation across editable entries and separators.
//!
//! The navigator owns the logical cursor (`current_part_index`,
//! `current_cursor_position`) and translates logical moves into caret
//! positions. It never talks to the host directly: every move records a
//! pending selection which the parser flushes after the text has been
//! rendered, so the caret write always sees the latest render.
//!
//! Invariant: `current_part_index` never refers to a separator entry.

use crate::entries::{self, PartEntry};
use crate::host::TextCursorHost;
use crate::selection::SelectionRange;
use crate::slots::SlotCollection;

/// Logical cursor of one mask instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorState {
    pub current_part_index: usize,
    pub current_cursor_position: usize,
}

#[derive(Clone, Debug, Default)]
pub struct CursorNavigator {
    cursor: CursorState,
    pending: Option<SelectionRange>,
}

impl CursorNavigator {
    /// A navigator resting at the start of the first editable entry.
    pub fn new(entries: &[PartEntry]) -> Self {
        let mut nav = Self::default();
        if let Some(i) = entries::first_editable(entries) {
            nav.cursor = CursorState {
                current_part_index: i,
                current_cursor_position: entries[i].start_position,
            };
        }
        nav
    }

    #[inline]
    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    #[inline]
    pub fn current_part_index(&self) -> usize {
        self.cursor.current_part_index
    }

    #[inline]
    pub fn current_cursor_position(&self) -> usize {
        self.cursor.current_cursor_position
    }

    pub fn current_entry<'a>(&self, entries: &'a [PartEntry]) -> Option<&'a PartEntry> {
        entries.get(self.cursor.current_part_index)
    }

    /// Caret offset relative to the start of the current entry.
    pub fn offset_in_entry(&self, entries: &[PartEntry]) -> usize {
        self.current_entry(entries).map_or(0, |e| {
            self.cursor
                .current_cursor_position
                .saturating_sub(e.start_position)
                .min(e.character_count)
        })
    }

    /// Put the cursor at `pos` inside editable entry `part_index`.
    ///
    /// Out-of-range indices and separator entries are ignored.
    pub fn place(&mut self, entries: &[PartEntry], part_index: usize, pos: usize) -> bool {
        let Some(entry) = entries.get(part_index) else {
            log::debug!(target: "mask.navigator", "place: part index {part_index} out of range");
            return false;
        };
        if entry.is_separator {
            log::debug!(target: "mask.navigator", "place: refusing separator entry {part_index}");
            return false;
        }
        let pos = pos.clamp(entry.start_position, entry.end_position);
        self.cursor = CursorState {
            current_part_index: part_index,
            current_cursor_position: pos,
        };
        self.pending = Some(SelectionRange::caret(pos));
        log::trace!(target: "mask.navigator", "cursor -> part {part_index} @ {pos}");
        true
    }

    /// Re-derive the current entry from an absolute position.
    ///
    /// A position inside a separator is advanced to the start of the next
    /// editable entry (or, past the last one, to the end of the previous
    /// editable entry). Returns the normalized position.
    pub fn set_part_index_by_cursor_position(
        &mut self,
        entries: &[PartEntry],
        pos: usize,
    ) -> Option<usize> {
        let pos = pos.min(entries::total_length(entries));
        let index = entries::entry_at(entries, pos)?;
        let (index, pos) = if entries[index].is_separator {
            if let Some(next) = entries::next_editable(entries, index) {
                (next, entries[next].start_position)
            } else {
                let prev = entries::previous_editable(entries, index)?;
                (prev, entries[prev].end_position)
            }
        } else {
            (index, pos)
        };
        self.cursor = CursorState {
            current_part_index: index,
            current_cursor_position: pos,
        };
        Some(pos)
    }

    /// Select `[start, end)` (a caret when `end` is `None`) and re-derive the
    /// current entry from `start`.
    pub fn set_cursor_selection(&mut self, entries: &[PartEntry], start: usize, end: Option<usize>) {
        let Some(start) = self.set_part_index_by_cursor_position(entries, start) else {
            return;
        };
        let end = end
            .unwrap_or(start)
            .clamp(start, entries::total_length(entries));
        self.pending = Some(SelectionRange::new(start, end));
    }

    pub fn move_left(&mut self, entries: &[PartEntry]) {
        let pos = self.cursor.current_cursor_position;
        if pos == 0 {
            return;
        }
        let target = pos - 1;
        let Some(index) = entries::entry_at(entries, target) else {
            return;
        };
        if entries[index].is_separator {
            if let Some(prev) = entries::previous_editable(entries, index) {
                self.place(entries, prev, entries[prev].end_position);
            }
            return;
        }
        self.place(entries, index, target);
    }

    pub fn move_right(&mut self, entries: &[PartEntry]) {
        let pos = self.cursor.current_cursor_position;
        if pos >= entries::total_length(entries) {
            return;
        }
        let target = pos + 1;
        let Some(index) = entries::entry_at(entries, target) else {
            return;
        };
        if entries[index].is_separator {
            if let Some(next) = entries::next_editable(entries, index) {
                self.place(entries, next, entries[next].start_position);
            }
            return;
        }
        self.place(entries, index, target);
    }

    /// Start of the first editable entry, not absolute offset zero.
    pub fn move_home(&mut self, entries: &[PartEntry]) {
        if let Some(first) = entries::first_editable(entries) {
            self.place(entries, first, entries[first].start_position);
        }
    }

    /// One past the last typed character of the last slot holding data.
    pub fn move_end(&mut self, entries: &[PartEntry], slots: &SlotCollection) {
        match slots.get_last_slot_with_data() {
            Some(slot) => {
                let index = slot.part_index();
                if let Some(entry) = entries.get(index) {
                    self.place(entries, index, entry.start_position + slot.len());
                }
            }
            None => self.move_home(entries),
        }
    }

    /// Jump to the start of the next editable entry. Returns `false` at the
    /// last editable entry.
    pub fn tab_forward(&mut self, entries: &[PartEntry]) -> bool {
        match entries::next_editable(entries, self.cursor.current_part_index) {
            Some(next) => self.place(entries, next, entries[next].start_position),
            None => false,
        }
    }

    /// Jump to the end of the previous editable entry. Returns `false` at the
    /// first editable entry.
    pub fn tab_backward(&mut self, entries: &[PartEntry]) -> bool {
        match entries::previous_editable(entries, self.cursor.current_part_index) {
            Some(prev) => self.place(entries, prev, entries[prev].end_position),
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the pending selection to the host, if any.
    pub fn flush<H: TextCursorHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(range) = self.pending.take() {
            host.set_selection(range);
        }
    }

    /// Drop any pending selection without applying it.
    pub fn discard_pending(&mut self) {
        self.pending = None;
    }
}
