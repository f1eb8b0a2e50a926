//! Mutable per-field state: format slots and the slot collection.
//!
//! Each editable part entry has exactly one [`FormatSlot`]. Slots are created
//! once per mask and only ever cleared in bulk; every edit goes through one of
//! the named transition functions below, which re-derive the [`SlotState`].

use crate::entries::PartEntry;
use crate::format::{FormatPart, ValueType};

/// Lifecycle of a single slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Empty,
    /// Holds characters that do not (yet) satisfy the part's value rules.
    Partial,
    Complete,
}

/// Runtime twin of one editable part entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatSlot {
    part_index: usize,
    text: String,
    state: SlotState,
}

impl FormatSlot {
    pub fn new(part_index: usize) -> Self {
        Self {
            part_index,
            text: String::new(),
            state: SlotState::Empty,
        }
    }

    /// Index of the part entry this slot belongs to.
    #[inline]
    pub fn part_index(&self) -> usize {
        self.part_index
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Number of typed characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.state == SlotState::Complete
    }

    pub fn is_full(&self, part: &FormatPart) -> bool {
        self.len() >= part.character_count
    }

    /// A full slot whose value still fails its rules (e.g. day `00`).
    pub fn is_invalid(&self, part: &FormatPart) -> bool {
        self.is_full(part) && !self.is_complete()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.state = SlotState::Empty;
    }

    /// Replace the slot text, truncated to the part's width.
    pub fn set_text(&mut self, part: &FormatPart, text: &str) {
        self.text = text.chars().take(part.character_count).collect();
        self.reevaluate(part);
    }

    /// Insert `ch` at character offset `offset` (clamped to the text length).
    pub fn insert(&mut self, part: &FormatPart, offset: usize, ch: char) {
        let at = byte_offset(&self.text, offset);
        self.text.insert(at, ch);
        self.reevaluate(part);
    }

    /// Overwrite the character at `offset`, or append when past the end.
    pub fn replace(&mut self, part: &FormatPart, offset: usize, ch: char) {
        let at = byte_offset(&self.text, offset);
        if at < self.text.len() {
            self.text.remove(at);
        }
        self.text.insert(at, ch);
        self.reevaluate(part);
    }

    /// Remove and return the character at `offset`.
    pub fn remove(&mut self, part: &FormatPart, offset: usize) -> Option<char> {
        if offset >= self.len() {
            return None;
        }
        let ch = self.text.remove(byte_offset(&self.text, offset));
        self.reevaluate(part);
        Some(ch)
    }

    pub fn push(&mut self, part: &FormatPart, ch: char) {
        self.text.push(ch);
        self.reevaluate(part);
    }

    pub fn pop_front(&mut self, part: &FormatPart) -> Option<char> {
        self.remove(part, 0)
    }

    /// Leave the slot: a complete numeric slot with `pad_with_zeros` is
    /// left-padded to its full width.
    pub fn finalize(&mut self, part: &FormatPart) {
        if self.is_complete()
            && part.pad_with_zeros
            && part.value_type == ValueType::Numeric
            && self.len() < part.character_count
        {
            let pad = "0".repeat(part.character_count - self.len());
            self.text.insert_str(0, &pad);
            self.reevaluate(part);
        }
    }

    fn reevaluate(&mut self, part: &FormatPart) {
        self.state = evaluate(part, &self.text);
    }
}

/// Completion test for `text` under `part`'s value rules.
pub fn evaluate(part: &FormatPart, text: &str) -> SlotState {
    if text.is_empty() {
        return SlotState::Empty;
    }
    let complete = match part.value_type {
        ValueType::Text => {
            let lowered = text.to_lowercase();
            part.possible_values
                .iter()
                .any(|v| v.to_lowercase() == lowered)
        }
        ValueType::Numeric => {
            let length_ok =
                !part.all_characters_required || text.chars().count() == part.character_count;
            length_ok && numeric_value(text).is_some_and(|value| part.within_bounds(value))
        }
    };
    if complete {
        SlotState::Complete
    } else {
        SlotState::Partial
    }
}

/// Value of an all-digit string, saturating at `u64::MAX` so that wide
/// fields never fail to parse. `None` for empty or non-digit text.
pub fn numeric_value(text: &str) -> Option<u64> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(text.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    }))
}

fn byte_offset(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(i, _)| i)
}

/// Ordered slots of one mask instance, independent of separators.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotCollection {
    slots: Vec<FormatSlot>,
}

impl SlotCollection {
    /// One empty slot per editable entry, in entry order.
    pub fn from_entries(entries: &[PartEntry]) -> Self {
        Self {
            slots: entries
                .iter()
                .enumerate()
                .filter(|(_, e)| !e.is_separator)
                .map(|(i, _)| FormatSlot::new(i))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormatSlot> {
        self.slots.iter()
    }

    pub fn get_slot(&self, part_index: usize) -> Option<&FormatSlot> {
        self.slots.iter().find(|s| s.part_index == part_index)
    }

    pub fn get_slot_mut(&mut self, part_index: usize) -> Option<&mut FormatSlot> {
        self.slots.iter_mut().find(|s| s.part_index == part_index)
    }

    pub fn get_first_slot(&self) -> Option<&FormatSlot> {
        self.slots.first()
    }

    pub fn get_next_slot(&self, part_index: usize) -> Option<&FormatSlot> {
        self.slots.iter().find(|s| s.part_index > part_index)
    }

    pub fn get_previous_slot(&self, part_index: usize) -> Option<&FormatSlot> {
        self.slots.iter().rev().find(|s| s.part_index < part_index)
    }

    /// The rightmost slot holding typed characters, looking no further than
    /// the first incomplete slot. This marks the logical end of input.
    pub fn get_last_slot_with_data(&self) -> Option<&FormatSlot> {
        let limit = self
            .slots
            .iter()
            .position(|s| !s.is_complete())
            .unwrap_or(self.slots.len().saturating_sub(1));
        self.slots
            .iter()
            .take(limit + 1)
            .rev()
            .find(|s| !s.is_empty())
    }

    pub fn clear_all_slots(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }

    pub fn all_slots_completed(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(FormatSlot::is_complete)
    }

    pub fn all_slots_empty(&self) -> bool {
        self.slots.iter().all(FormatSlot::is_empty)
    }

    /// Delete-shift: starting after the slot at `part_index`, pull the first
    /// character of each slot into its predecessor while the predecessor has
    /// room, cascading to the last slot.
    pub fn shift_left_after(&mut self, entries: &[PartEntry], part_index: usize) {
        let Some(start) = self.slots.iter().position(|s| s.part_index == part_index) else {
            return;
        };
        for j in start + 1..self.slots.len() {
            let (left, right) = self.slots.split_at_mut(j);
            let prev = &mut left[j - 1];
            let cur = &mut right[0];
            let (Some(prev_part), Some(cur_part)) =
                (entries.get(prev.part_index), entries.get(cur.part_index))
            else {
                return;
            };
            if prev.is_full(prev_part) {
                continue;
            }
            if let Some(ch) = cur.pop_front(cur_part) {
                prev.push(prev_part, ch);
            }
        }
    }

    /// Part indices of all slots, in order.
    pub fn part_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().map(|s| s.part_index)
    }
}

impl<'a> IntoIterator for &'a SlotCollection {
    type Item = &'a FormatSlot;
    type IntoIter = std::slice::Iter<'a, FormatSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
