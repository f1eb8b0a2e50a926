//! Part-entry table: absolute character offsets for every format part.

use crate::format::{FormatDefinition, FormatPart};
use std::ops::Deref;

/// A format part with its computed position in the rendered text.
///
/// Invariant: `end_position - start_position == part.character_count`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartEntry {
    pub part: FormatPart,
    pub start_position: usize,
    pub end_position: usize,
}

impl PartEntry {
    /// Returns `true` if `pos` is a caret position inside this entry's span,
    /// counting the start but not the end.
    #[inline]
    pub fn covers(&self, pos: usize) -> bool {
        self.start_position <= pos && pos < self.end_position
    }
}

impl Deref for PartEntry {
    type Target = FormatPart;

    fn deref(&self) -> &FormatPart {
        &self.part
    }
}

/// Derive the entry table by prefix sum over character counts.
///
/// Entries partition `[0, total_length)` contiguously. A zero-width editable
/// part yields a degenerate empty entry; [`FormatDefinition::validate`] rejects
/// such definitions up front.
pub fn build(def: &FormatDefinition) -> Vec<PartEntry> {
    let mut start = 0;
    def.format_parts
        .iter()
        .map(|part| {
            let end = start + part.character_count;
            let entry = PartEntry {
                part: part.clone(),
                start_position: start,
                end_position: end,
            };
            start = end;
            entry
        })
        .collect()
}

/// Total rendered length of an entry table.
pub fn total_length(entries: &[PartEntry]) -> usize {
    entries.last().map_or(0, |e| e.end_position)
}

/// Index of the first editable entry after `index`.
pub fn next_editable(entries: &[PartEntry], index: usize) -> Option<usize> {
    (index + 1..entries.len()).find(|&i| !entries[i].is_separator)
}

/// Index of the last editable entry before `index`.
pub fn previous_editable(entries: &[PartEntry], index: usize) -> Option<usize> {
    (0..index.min(entries.len()))
        .rev()
        .find(|&i| !entries[i].is_separator)
}

pub fn first_editable(entries: &[PartEntry]) -> Option<usize> {
    entries.iter().position(|e| !e.is_separator)
}

pub fn last_editable(entries: &[PartEntry]) -> Option<usize> {
    entries.iter().rposition(|e| !e.is_separator)
}

/// Index of the entry whose span covers `pos`; the end of the text maps to
/// the last entry.
pub fn entry_at(entries: &[PartEntry], pos: usize) -> Option<usize> {
    if let Some(i) = entries.iter().position(|e| e.covers(pos)) {
        return Some(i);
    }
    if pos >= total_length(entries) {
        entries.len().checked_sub(1)
    } else {
        None
    }
}
