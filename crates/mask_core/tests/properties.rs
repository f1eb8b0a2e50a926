//! Invariants checked over every preset (and their range variants) with
//! deterministic pseudo-random key streams.

use mask_core::entries::{self, PartEntry};
use mask_core::{
    FormatDefinition, FormatPreset, KeyEvent, MaskParser, SlotCollection, StringHost,
    TextCursorHost, render,
};
use std::cell::Cell;
use std::rc::Rc;

const KEYS: &[&str] = &[
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "a", "p", "m", "/", ":", "-", "x",
    "ArrowLeft", "ArrowRight", "Home", "End", "Tab", "Backspace", "Delete",
];
const STEPS: usize = 400;

/// xorshift64*: reproducible without pulling in a RNG crate.
struct KeyStream(u64);

impl KeyStream {
    fn next_key(&mut self) -> KeyEvent {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        let n = self.0.wrapping_mul(0x2545_f491_4f6c_dd1d);
        let key = KeyEvent::new(KEYS[(n >> 33) as usize % KEYS.len()]);
        if n & 0x10 != 0 && key.key == "Tab" {
            key.with_shift()
        } else {
            key
        }
    }
}

fn definitions() -> Vec<(String, FormatDefinition)> {
    let mut defs = Vec::new();
    for preset in FormatPreset::ALL {
        defs.push((preset.to_string(), preset.definition()));
        defs.push((
            format!("{preset} range"),
            preset.definition().range(" - ").with_delete_shift(true),
        ));
    }
    defs
}

fn attached(def: FormatDefinition) -> MaskParser<StringHost> {
    let mut mask = MaskParser::new(def);
    let mut host = StringHost::new();
    host.set_focused(true);
    mask.attach_host(host);
    mask
}

fn assert_separators_intact(name: &str, entries: &[PartEntry], text: &str) {
    for entry in entries.iter().filter(|e| e.is_separator) {
        let rendered: String = text
            .chars()
            .skip(entry.start_position)
            .take(entry.character_count)
            .collect();
        assert_eq!(rendered, entry.input_text, "[{name}] separator moved in {text:?}");
    }
}

#[test]
fn entries_are_contiguous() {
    for (name, def) in definitions() {
        let entries = entries::build(&def);
        let mut expected_start = 0;
        for entry in &entries {
            assert_eq!(entry.start_position, expected_start, "[{name}]");
            assert_eq!(
                entry.end_position - entry.start_position,
                entry.character_count,
                "[{name}]"
            );
            expected_start = entry.end_position;
        }
        assert_eq!(entries::total_length(&entries), def.total_length(), "[{name}]");
    }
}

#[test]
fn random_keys_keep_layout_and_cursor_invariants() {
    for (seed, (name, def)) in definitions().into_iter().enumerate() {
        let mut mask = attached(def);
        let expected_len = entries::total_length(mask.entries());
        let mut keys = KeyStream(0x9e37_79b9_7f4a_7c15 ^ seed as u64);

        for step in 0..STEPS {
            let key = keys.next_key();
            mask.on_key_down(&key);

            let text = mask.render();
            assert_eq!(
                text.chars().count(),
                expected_len,
                "[{name}] step {step} key {:?}",
                key.key
            );
            assert_eq!(mask.host().map(|h| h.text()), Some(text.as_str()), "[{name}]");
            assert_separators_intact(&name, mask.entries(), &text);

            let cursor = mask.cursor();
            let entry = &mask.entries()[cursor.current_part_index];
            assert!(!entry.is_separator, "[{name}] parked on a separator");
            assert!(
                (entry.start_position..=entry.end_position)
                    .contains(&cursor.current_cursor_position),
                "[{name}] cursor {cursor:?} outside its entry"
            );

            for slot in mask.slots() {
                let part = &mask.entries()[slot.part_index()];
                assert!(slot.len() <= part.character_count, "[{name}] slot overflow");
            }
        }
    }
}

#[test]
fn render_is_idempotent_and_side_effect_free() {
    for (name, def) in definitions() {
        let mut mask = attached(def);
        let mut keys = KeyStream(0xdead_beef);
        for _ in 0..64 {
            mask.on_key_down(&keys.next_key());
        }
        let before: SlotCollection = mask.slots().clone();
        let first = render(mask.entries(), mask.slots());
        let second = render(mask.entries(), mask.slots());
        assert_eq!(first, second, "[{name}]");
        assert_eq!(&before, mask.slots(), "[{name}] render mutated slots");
    }
}

#[test]
fn typing_full_value_fires_exactly_once() {
    let cases = [
        (FormatPreset::DayMonthYear, "24122024", "24/12/2024"),
        (FormatPreset::MonthDayYear, "12242024", "12/24/2024"),
        (FormatPreset::YearMonthDay, "20241224", "2024-12-24"),
        (FormatPreset::Hour12, "0945pm", "09:45 PM"),
        (FormatPreset::Hour24, "2359", "23:59"),
    ];
    for (preset, typed, expected) in cases {
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let mut mask = attached(preset.definition());
        mask.set_on_change(move |value| {
            assert!(value.is_some());
            counter.set(counter.get() + 1);
        });
        for ch in typed.chars() {
            mask.on_key_down(&KeyEvent::from(ch));
        }
        assert_eq!(mask.render(), expected, "[{preset}]");
        assert!(mask.slots().all_slots_completed(), "[{preset}]");
        assert_eq!(fired.get(), 1, "[{preset}] callback count");
    }
}

#[test]
fn load_then_clear_fires_none_once() {
    let samples = [
        (FormatPreset::DayMonthYear, "01/02/2003"),
        (FormatPreset::MonthDayYear, "02/01/2003"),
        (FormatPreset::YearMonthDay, "2003-02-01"),
        (FormatPreset::Hour12, "12:00 AM"),
        (FormatPreset::Hour24, "00:00"),
    ];
    for (preset, raw) in samples {
        let log: Rc<std::cell::RefCell<Vec<Option<String>>>> = Rc::default();
        let sink = Rc::clone(&log);
        let mut mask = attached(preset.definition());
        mask.set_on_change(move |v| sink.borrow_mut().push(v.map(str::to_string)));

        mask.load_value(raw);
        mask.load_value("");
        mask.load_value("");
        assert!(mask.slots().all_slots_empty(), "[{preset}]");
        assert_eq!(
            *log.borrow(),
            vec![Some(raw.to_string()), None],
            "[{preset}] emissions"
        );
    }
}

#[test]
fn loaded_values_round_trip_through_render() {
    for preset in FormatPreset::ALL {
        let mut mask = attached(preset.definition());
        let mut keys = KeyStream(preset as u64 + 7);
        for _ in 0..200 {
            mask.on_key_down(&keys.next_key());
        }
        mask.on_blur();
        let Some(value) = mask.value() else {
            continue;
        };
        let mut reloaded = attached(preset.definition());
        reloaded.load_value(&value);
        assert_eq!(reloaded.value().as_deref(), Some(value.as_str()), "[{preset}]");
    }
}
