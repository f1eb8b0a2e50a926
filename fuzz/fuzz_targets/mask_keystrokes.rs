#![no_main]

use libfuzzer_sys::fuzz_target;
use mask_core::{FormatPreset, KeyEvent, MaskParser, StringHost, TextCursorHost, entries};

const KEYS: &[&str] = &[
    "0", "1", "2", "3", "5", "9", "a", "m", "p", "/", ":", "-", " ", "x",
    "ArrowLeft", "ArrowRight", "Home", "End", "Tab", "Backspace", "Delete", "Shift",
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, keys)) = data.split_first() else {
        return;
    };
    let preset = FormatPreset::ALL[usize::from(selector) % FormatPreset::ALL.len()];
    let mut definition = preset.definition();
    if selector & 0x80 != 0 {
        definition = definition.range(" - ");
    }
    definition.delete_shifts_format_part = selector & 0x40 != 0;

    let mut mask = MaskParser::new(definition);
    let mut host = StringHost::new();
    host.set_focused(true);
    mask.attach_host(host);

    let expected_len = entries::total_length(mask.entries());
    for &byte in keys {
        let key = KEYS[usize::from(byte) % KEYS.len()];
        let mut event = KeyEvent::new(key);
        if byte & 0x80 != 0 {
            event = event.with_shift();
        }
        mask.on_key_down(&event);

        let text = mask.render();
        assert_eq!(text.chars().count(), expected_len);
        if let Some(host) = mask.host() {
            assert_eq!(host.text(), text);
        }
        let cursor = mask.cursor();
        assert!(!mask.entries()[cursor.current_part_index].is_separator);
        for entry in mask.entries().iter().filter(|e| e.is_separator) {
            let rendered: String = text
                .chars()
                .skip(entry.start_position)
                .take(entry.character_count)
                .collect();
            assert_eq!(rendered, entry.input_text);
        }
    }
});
