//! Composing slot state back into display text.

use crate::entries::PartEntry;
use crate::format::ValueType;
use crate::slots::SlotCollection;

/// Display text: typed characters followed by filler glyphs for each
/// editable entry, literal text for separators.
pub fn render(entries: &[PartEntry], slots: &SlotCollection) -> String {
    compose(entries, slots, false)
}

/// Like [`render`], but complete slots with `pad_with_zeros` appear padded
/// without mutating them. This is the value handed to change callbacks.
pub fn render_committed(entries: &[PartEntry], slots: &SlotCollection) -> String {
    compose(entries, slots, true)
}

/// Placeholder view shown while the mask is empty and unfocused.
pub fn render_placeholder(entries: &[PartEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            if e.is_separator || e.placeholder.is_empty() {
                e.input_text.as_str()
            } else {
                e.placeholder.as_str()
            }
        })
        .collect()
}

fn compose(entries: &[PartEntry], slots: &SlotCollection, committed: bool) -> String {
    let mut out = String::with_capacity(crate::entries::total_length(entries));
    for (index, entry) in entries.iter().enumerate() {
        if entry.is_separator {
            out.push_str(&entry.input_text);
            continue;
        }
        let (text, typed) = slots
            .get_slot(index)
            .map_or(("", 0), |slot| (slot.text(), slot.len()));
        let width = entry.character_count;
        let pad = committed
            && entry.pad_with_zeros
            && entry.value_type == ValueType::Numeric
            && slots.get_slot(index).is_some_and(|s| s.is_complete());
        if pad && typed < width {
            out.extend(std::iter::repeat_n('0', width - typed));
        }
        out.push_str(text);
        if !pad {
            out.extend(std::iter::repeat_n(entry.filler(), width.saturating_sub(typed)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries;
    use crate::format::FormatPreset;

    fn setup() -> (Vec<PartEntry>, SlotCollection) {
        let entries = entries::build(&FormatPreset::DayMonthYear.definition());
        let slots = SlotCollection::from_entries(&entries);
        (entries, slots)
    }

    #[test]
    fn empty_mask_renders_fillers() {
        let (entries, slots) = setup();
        assert_eq!(render(&entries, &slots), "__/__/____");
    }

    #[test]
    fn partial_slots_are_filled_out() {
        let (entries, mut slots) = setup();
        slots.get_slot_mut(0).unwrap().set_text(&entries[0], "1");
        slots.get_slot_mut(4).unwrap().set_text(&entries[4], "20");
        assert_eq!(render(&entries, &slots), "1_/__/20__");
    }

    #[test]
    fn render_is_idempotent() {
        let (entries, mut slots) = setup();
        slots.get_slot_mut(2).unwrap().set_text(&entries[2], "07");
        let first = render(&entries, &slots);
        assert_eq!(first, render(&entries, &slots));
    }

    #[test]
    fn committed_view_pads_complete_slots() {
        let (entries, mut slots) = setup();
        slots.get_slot_mut(0).unwrap().set_text(&entries[0], "5");
        slots.get_slot_mut(2).unwrap().set_text(&entries[2], "0");
        slots.get_slot_mut(4).unwrap().set_text(&entries[4], "2024");
        assert_eq!(render_committed(&entries, &slots), "05/0_/2024");
        assert_eq!(render(&entries, &slots), "5_/0_/2024");
    }

    #[test]
    fn placeholder_view() {
        let (entries, _) = setup();
        assert_eq!(render_placeholder(&entries), "dd/mm/yyyy");
        let entries = entries::build(&FormatPreset::Hour12.definition());
        assert_eq!(render_placeholder(&entries), "hh:mm aa");
    }

    #[test]
    fn rendered_length_matches_table() {
        for preset in FormatPreset::ALL {
            let entries = entries::build(&preset.definition());
            let slots = SlotCollection::from_entries(&entries);
            assert_eq!(
                render(&entries, &slots).chars().count(),
                entries::total_length(&entries)
            );
        }
    }
}
