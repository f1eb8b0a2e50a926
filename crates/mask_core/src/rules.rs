//! Rule processor: how digit, character and editing keys change the slots.
//!
//! Movement keys never reach this module; the parser routes them straight to
//! the [`CursorNavigator`]. Every accepted mutation is confined to the
//! [`SlotCollection`] and leaves a pending caret position on the navigator.

use crate::entries::{self, PartEntry};
use crate::format::ValueType;
use crate::keys::Editing;
use crate::navigator::CursorNavigator;
use crate::slots::{self, SlotCollection};

/// Result of handling one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Slot text changed.
    Accepted,
    /// Only the caret moved.
    Moved,
    /// The key cannot apply here and was ignored.
    Rejected,
    /// The key exceeded a bound whose policy is to flag an error. State is
    /// unchanged.
    Invalid,
    /// A modifier press; nothing to do.
    Ignored,
    /// Not handled by the mask; the host should apply its default action
    /// (e.g. `Tab` on the last field moves focus away).
    PassThrough,
}

impl KeyOutcome {
    /// Whether the host should suppress its own handling of the key.
    pub fn consumed(self) -> bool {
        !matches!(self, KeyOutcome::PassThrough | KeyOutcome::Ignored)
    }
}

/// Applies key rules to one mask's slots and cursor.
pub struct RuleProcessor<'a> {
    entries: &'a [PartEntry],
    slots: &'a mut SlotCollection,
    navigator: &'a mut CursorNavigator,
    delete_shifts: bool,
}

impl<'a> RuleProcessor<'a> {
    pub fn new(
        entries: &'a [PartEntry],
        slots: &'a mut SlotCollection,
        navigator: &'a mut CursorNavigator,
        delete_shifts: bool,
    ) -> Self {
        Self {
            entries,
            slots,
            navigator,
            delete_shifts,
        }
    }

    /// Handle a printable key at the cursor.
    pub fn apply_character(&mut self, ch: char) -> KeyOutcome {
        let index = self.navigator.current_part_index();
        let Some(entry) = self.entries.get(index) else {
            return KeyOutcome::Rejected;
        };
        let Some(slot) = self.slots.get_slot(index) else {
            return KeyOutcome::Rejected;
        };
        let offset = self.navigator.offset_in_entry(self.entries).min(slot.len());

        if !slot.is_empty() && self.is_following_separator(index, ch) {
            log::trace!(target: "mask.rules", "separator key {ch:?} closes part {index}");
            self.finalize_current();
            return if self.navigator.tab_forward(self.entries) {
                KeyOutcome::Moved
            } else {
                KeyOutcome::Rejected
            };
        }

        if slot.is_full(entry) && offset >= slot.len() {
            return match entries::next_editable(self.entries, index) {
                Some(next) => {
                    self.finalize_current();
                    self.navigator
                        .place(self.entries, next, self.entries[next].start_position);
                    self.apply_character(ch)
                }
                None => {
                    log::debug!(target: "mask.rules", "part {index} full, dropping {ch:?}");
                    KeyOutcome::Rejected
                }
            };
        }

        match entry.value_type {
            ValueType::Text => self.apply_text(index, offset, ch),
            ValueType::Numeric if ch.is_ascii_digit() => self.apply_digit(index, offset, ch),
            ValueType::Numeric => {
                log::debug!(target: "mask.rules", "numeric part {index} rejects {ch:?}");
                KeyOutcome::Rejected
            }
        }
    }

    /// `ch` is the first visible glyph of the separator after `index`, or
    /// its first raw glyph when the separator is all whitespace.
    fn is_following_separator(&self, index: usize, ch: char) -> bool {
        self.entries.get(index + 1).is_some_and(|e| {
            if !e.is_separator {
                return false;
            }
            let trimmed = e.input_text.trim_start();
            let glyphs = if trimmed.is_empty() { e.input_text.as_str() } else { trimmed };
            glyphs.starts_with(ch)
        })
    }

    fn apply_text(&mut self, index: usize, offset: usize, ch: char) -> KeyOutcome {
        let entry = &self.entries[index];
        let Some(slot) = self.slots.get_slot_mut(index) else {
            return KeyOutcome::Rejected;
        };
        let mut candidate: String = slot.text().chars().take(offset).collect();
        candidate.push(ch);
        let lowered = candidate.to_lowercase();
        let matches: Vec<&String> = entry
            .possible_values
            .iter()
            .filter(|v| v.to_lowercase().starts_with(&lowered))
            .collect();
        let Some(first) = matches.first() else {
            log::debug!(target: "mask.rules", "{candidate:?} matches no value of part {index}");
            return KeyOutcome::Rejected;
        };
        let typed = candidate.chars().count();
        let canonical: String = first.chars().take(typed).collect();
        let unique_full = matches.len() == 1 && first.chars().count() == typed;
        slot.set_text(entry, &canonical);
        log::trace!(target: "mask.rules", "text part {index} -> {canonical:?}");

        if unique_full {
            self.advance_from(index);
        } else {
            self.navigator
                .place(self.entries, index, entry.start_position + typed);
        }
        KeyOutcome::Accepted
    }

    fn apply_digit(&mut self, index: usize, offset: usize, ch: char) -> KeyOutcome {
        let entry = &self.entries[index];
        let Some(slot) = self.slots.get_slot(index) else {
            return KeyOutcome::Rejected;
        };
        let typed = slot.text().to_string();
        let len = slot.len();
        let overwrite = len >= entry.character_count;

        let mut candidate = typed.clone();
        let at = candidate
            .char_indices()
            .nth(offset)
            .map_or(candidate.len(), |(i, _)| i);
        if overwrite {
            candidate.remove(at);
        }
        candidate.insert(at, ch);

        let exceeds = match (entry.maximum_value, slots::numeric_value(&candidate)) {
            (Some(max), Some(value)) => value > u64::from(max),
            _ => false,
        };
        if exceeds {
            return self.overflow(index, offset, len, &typed, ch, overwrite);
        }

        let Some(slot) = self.slots.get_slot_mut(index) else {
            return KeyOutcome::Rejected;
        };
        if overwrite {
            slot.replace(entry, offset, ch);
        } else {
            slot.insert(entry, offset, ch);
        }
        let now_full = slot.is_full(entry);
        let complete = slot.is_complete();
        log::trace!(
            target: "mask.rules",
            "digit {ch:?} -> part {index} = {:?} ({:?})",
            slot.text(),
            slot.state()
        );

        // Overwriting only leaves the slot once the caret reaches its end.
        let advance =
            now_full && complete && (!overwrite || offset + 1 >= entry.character_count);
        if advance {
            self.advance_from(index);
        } else {
            self.navigator
                .place(self.entries, index, entry.start_position + offset + 1);
        }
        KeyOutcome::Accepted
    }

    /// The candidate value is above the part's maximum.
    fn overflow(
        &mut self,
        index: usize,
        offset: usize,
        len: usize,
        typed: &str,
        ch: char,
        overwrite: bool,
    ) -> KeyOutcome {
        let entry = &self.entries[index];
        if entry.exceeding_maximum_value_causes_tab && !overwrite && len > 0 && offset == len {
            let next = entries::next_editable(self.entries, index)
                .filter(|&n| self.entries[n].value_type == ValueType::Numeric);
            if let Some(next) = next {
                let finished = if entry.pad_with_zeros {
                    format!("{typed:0>width$}", width = entry.character_count)
                } else {
                    typed.to_string()
                };
                if let Some(slot) = self.slots.get_slot_mut(index) {
                    slot.set_text(entry, &finished);
                }
                let next_entry = &self.entries[next];
                if let Some(slot) = self.slots.get_slot_mut(next) {
                    slot.set_text(next_entry, &ch.to_string());
                }
                log::trace!(
                    target: "mask.rules",
                    "overflow: part {index} = {finished:?}, part {next} seeded with {ch:?}"
                );
                self.navigator
                    .place(self.entries, next, next_entry.start_position + 1);
                return KeyOutcome::Accepted;
            }
        }
        if entry.exceeding_maximum_value_causes_error {
            log::debug!(target: "mask.rules", "digit {ch:?} exceeds maximum of part {index}");
            return KeyOutcome::Invalid;
        }
        log::debug!(target: "mask.rules", "digit {ch:?} exceeds maximum of part {index}, ignored");
        KeyOutcome::Rejected
    }

    /// Move on after `index` became complete: next editable entry, or the end
    /// of this one when it is the last.
    fn advance_from(&mut self, index: usize) {
        match entries::next_editable(self.entries, index) {
            Some(next) => {
                self.navigator
                    .place(self.entries, next, self.entries[next].start_position);
            }
            None => {
                let end = self.entries[index].end_position;
                self.navigator.place(self.entries, index, end);
            }
        }
    }

    pub fn apply_editing(&mut self, editing: Editing) -> KeyOutcome {
        match editing {
            Editing::Backspace => self.backspace(),
            Editing::Delete => self.delete(),
        }
    }

    fn backspace(&mut self) -> KeyOutcome {
        let index = self.navigator.current_part_index();
        let Some(entry) = self.entries.get(index) else {
            return KeyOutcome::Rejected;
        };
        let Some(slot) = self.slots.get_slot_mut(index) else {
            return KeyOutcome::Rejected;
        };
        let offset = self.navigator.offset_in_entry(self.entries).min(slot.len());

        if offset > 0 {
            slot.remove(entry, offset - 1);
            log::trace!(target: "mask.rules", "backspace in part {index} -> {:?}", slot.text());
            self.navigator
                .place(self.entries, index, entry.start_position + offset - 1);
            self.shift_after(index);
            return KeyOutcome::Accepted;
        }

        let Some(prev) = self.slots.get_previous_slot(index).map(|s| s.part_index()) else {
            if self.navigator.current_cursor_position() != entry.start_position {
                self.navigator
                    .place(self.entries, index, entry.start_position);
                return KeyOutcome::Moved;
            }
            return KeyOutcome::Rejected;
        };
        let prev_entry = &self.entries[prev];
        let Some(prev_slot) = self.slots.get_slot_mut(prev) else {
            return KeyOutcome::Rejected;
        };
        if prev_slot.is_empty() {
            self.navigator
                .place(self.entries, prev, prev_entry.start_position);
            return KeyOutcome::Moved;
        }
        let last = prev_slot.len() - 1;
        prev_slot.remove(prev_entry, last);
        log::trace!(
            target: "mask.rules",
            "backspace at start of part {index} trims part {prev} -> {:?}",
            prev_slot.text()
        );
        self.navigator
            .place(self.entries, prev, prev_entry.start_position + last);
        self.shift_after(prev);
        KeyOutcome::Accepted
    }

    fn delete(&mut self) -> KeyOutcome {
        let index = self.navigator.current_part_index();
        let Some(entry) = self.entries.get(index) else {
            return KeyOutcome::Rejected;
        };
        let Some(slot) = self.slots.get_slot_mut(index) else {
            return KeyOutcome::Rejected;
        };
        let offset = self.navigator.offset_in_entry(self.entries);
        if offset >= slot.len() {
            return KeyOutcome::Rejected;
        }
        slot.remove(entry, offset);
        log::trace!(target: "mask.rules", "delete in part {index} -> {:?}", slot.text());
        self.navigator
            .place(self.entries, index, entry.start_position + offset);
        self.shift_after(index);
        KeyOutcome::Accepted
    }

    fn shift_after(&mut self, index: usize) {
        if self.delete_shifts {
            self.slots.shift_left_after(self.entries, index);
        }
    }

    /// Pad the current slot if it is complete; used whenever the caret leaves
    /// a slot.
    pub fn finalize_current(&mut self) {
        let index = self.navigator.current_part_index();
        if let (Some(entry), Some(slot)) = (self.entries.get(index), self.slots.get_slot_mut(index))
        {
            slot.finalize(entry);
        }
    }
}
