//! Mask parser: the single entry point a host talks to.
//!
//! A parser owns everything one mask instance needs (part entries, slots,
//! navigator) under its own [`MaskId`]; nothing is shared between instances.
//! Every key event runs to completion: classify, mutate, render, place the
//! caret, then evaluate whether the change callback has to fire.

use crate::entries::{self, PartEntry};
use crate::format::{FormatDefinition, ValueType};
use crate::host::TextCursorHost;
use crate::id::MaskId;
use crate::keys::{self, KeyClass, KeyEvent, Movement};
use crate::navigator::{CursorNavigator, CursorState};
use crate::render;
use crate::rules::{KeyOutcome, RuleProcessor};
use crate::slots::SlotCollection;
use std::fmt;

/// Invoked with the committed value when every slot becomes complete, and
/// with `None` when the mask returns to empty after having emitted a value.
pub type ChangeCallback = Box<dyn FnMut(Option<&str>)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Unattached,
    Attached,
    Focused,
    Blurred,
}

pub struct MaskParser<H> {
    id: MaskId,
    definition: FormatDefinition,
    entries: Vec<PartEntry>,
    slots: SlotCollection,
    navigator: CursorNavigator,
    host: Option<H>,
    lifecycle: Lifecycle,
    on_change: Option<ChangeCallback>,
    emitted: Option<String>,
    was_complete: bool,
    invalid: bool,
}

impl<H: TextCursorHost> MaskParser<H> {
    pub fn new(definition: FormatDefinition) -> Self {
        Self::with_id(MaskId::next(), definition)
    }

    pub fn with_id(id: MaskId, definition: FormatDefinition) -> Self {
        if let Err(err) = definition.validate() {
            log::warn!(target: "mask.format", "{id}: degraded format definition: {err}");
        }
        let entries = entries::build(&definition);
        let slots = SlotCollection::from_entries(&entries);
        let navigator = CursorNavigator::new(&entries);
        Self {
            id,
            definition,
            entries,
            slots,
            navigator,
            host: None,
            lifecycle: Lifecycle::Unattached,
            on_change: None,
            emitted: None,
            was_complete: false,
            invalid: false,
        }
    }

    pub fn with_on_change(mut self, callback: impl FnMut(Option<&str>) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn set_on_change(&mut self, callback: impl FnMut(Option<&str>) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn id(&self) -> MaskId {
        self.id
    }

    pub fn definition(&self) -> &FormatDefinition {
        &self.definition
    }

    pub fn entries(&self) -> &[PartEntry] {
        &self.entries
    }

    pub fn slots(&self) -> &SlotCollection {
        &self.slots
    }

    pub fn cursor(&self) -> CursorState {
        self.navigator.cursor()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    /// Soft invalid signal for the host to style; never blocks input.
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// Current display text.
    pub fn render(&self) -> String {
        render::render(&self.entries, &self.slots)
    }

    /// The committed value, once every slot is settled.
    pub fn value(&self) -> Option<String> {
        self.is_settled()
            .then(|| render::render_committed(&self.entries, &self.slots))
    }

    /// Every slot complete, and padded slots full (typed out or finalized).
    /// A padded slot holding one digit is still being edited.
    fn is_settled(&self) -> bool {
        self.slots.all_slots_completed()
            && self.slots.iter().all(|slot| {
                self.entries
                    .get(slot.part_index())
                    .is_none_or(|entry| !entry.pad_with_zeros || slot.is_full(entry))
            })
    }

    /// Register the host element and render any value loaded so far.
    pub fn attach_host(&mut self, host: H) {
        let focused = host.is_focused();
        self.host = Some(host);
        self.lifecycle = Lifecycle::Attached;
        log::debug!(target: "mask.parser", "{}: host attached", self.id);
        if focused {
            self.on_focus();
        } else {
            self.write_display();
        }
    }

    /// Replace the slots with the contents of `raw`.
    ///
    /// Slots are located by scanning for separator text; whatever cannot be
    /// located unambiguously is left empty. An empty string clears the mask.
    pub fn load_value(&mut self, raw: &str) {
        self.slots.clear_all_slots();
        if !raw.is_empty() {
            self.fill_from_raw(raw);
        }
        self.invalid = self.any_slot_invalid();
        if self.host.is_some() {
            if self.lifecycle == Lifecycle::Focused {
                self.navigator.move_end(&self.entries, &self.slots);
            }
            self.write_display();
            self.flush_caret();
        }
        self.evaluate_transition();
    }

    fn fill_from_raw(&mut self, raw: &str) {
        let chars: Vec<char> = raw.chars().collect();
        let mut pos = 0;
        for (index, entry) in self.entries.iter().enumerate() {
            if pos >= chars.len() {
                break;
            }
            if entry.is_separator {
                let sep: Vec<char> = entry.input_text.chars().collect();
                match find_chars(&chars, pos, &sep) {
                    Some(at) => {
                        if at != pos {
                            log::warn!(
                                target: "mask.parser",
                                "{}: skipping {} unexpected characters before separator {:?}",
                                self.id,
                                at - pos,
                                entry.input_text
                            );
                        }
                        pos = at + sep.len();
                    }
                    None => {
                        log::warn!(
                            target: "mask.parser",
                            "{}: separator {:?} missing from {raw:?}, partial load",
                            self.id,
                            entry.input_text
                        );
                        break;
                    }
                }
                continue;
            }

            let end = match self.entries.get(index + 1).filter(|e| e.is_separator) {
                Some(sep) => {
                    let sep: Vec<char> = sep.input_text.chars().collect();
                    find_chars(&chars, pos, &sep).unwrap_or(chars.len())
                }
                None => (pos + entry.character_count).min(chars.len()),
            };
            let segment: String = chars[pos..end].iter().collect();
            pos = end;

            let accepted = match entry.value_type {
                ValueType::Numeric => segment
                    .chars()
                    .all(|c| c.is_ascii_digit())
                    .then(|| segment.clone()),
                ValueType::Text => entry
                    .possible_values
                    .iter()
                    .find(|v| v.to_lowercase() == segment.to_lowercase())
                    .cloned(),
            };
            let Some(text) = accepted else {
                log::warn!(
                    target: "mask.parser",
                    "{}: {segment:?} does not fit part {index}, left empty",
                    self.id
                );
                continue;
            };
            if text.chars().count() > entry.character_count {
                log::warn!(
                    target: "mask.parser",
                    "{}: {text:?} truncated to {} characters",
                    self.id,
                    entry.character_count
                );
            }
            if let Some(slot) = self.slots.get_slot_mut(index) {
                slot.set_text(entry, &text);
                slot.finalize(entry);
            }
        }
    }

    pub fn on_focus(&mut self) {
        if self.host.is_none() {
            return;
        }
        self.lifecycle = Lifecycle::Focused;
        self.write_text();
        if self.slots.all_slots_empty() {
            self.navigator.move_home(&self.entries);
        } else if let Some(sel) = self.host.as_ref().map(|h| h.selection()) {
            self.navigator
                .set_cursor_selection(&self.entries, sel.start, None);
        }
        self.flush_caret();
    }

    pub fn on_blur(&mut self) {
        if self.host.is_none() {
            return;
        }
        self.lifecycle = Lifecycle::Blurred;
        for index in self.slots.part_indices().collect::<Vec<_>>() {
            if let (Some(entry), Some(slot)) =
                (self.entries.get(index), self.slots.get_slot_mut(index))
            {
                slot.finalize(entry);
            }
        }
        self.navigator.discard_pending();
        self.write_display();
        self.evaluate_transition();
    }

    /// The host moved the caret or selection itself (pointer click, drag).
    pub fn on_select(&mut self, start: usize, end: Option<usize>) {
        if self.host.is_none() {
            return;
        }
        self.navigator.set_cursor_selection(&self.entries, start, end);
        self.flush_caret();
    }

    /// Handle one key press. The host should suppress its default handling
    /// when [`KeyOutcome::consumed`] is true.
    pub fn on_key_down(&mut self, event: &KeyEvent) -> KeyOutcome {
        if self.host.is_none() {
            return KeyOutcome::PassThrough;
        }
        let class = keys::classify(event);
        log::trace!(target: "mask.parser", "{}: key {:?} -> {class:?}", self.id, event.key);
        let outcome = match class {
            KeyClass::Modifier => return KeyOutcome::Ignored,
            KeyClass::Shortcut | KeyClass::Other => return KeyOutcome::PassThrough,
            KeyClass::Movement(movement) => self.apply_movement(movement),
            KeyClass::Digit(ch) | KeyClass::Character(ch) => self.rules().apply_character(ch),
            KeyClass::Editing(editing) => self.rules().apply_editing(editing),
        };
        self.invalid = outcome == KeyOutcome::Invalid || self.any_slot_invalid();
        if outcome != KeyOutcome::PassThrough {
            self.write_text();
            self.flush_caret();
        }
        self.evaluate_transition();
        outcome
    }

    fn apply_movement(&mut self, movement: Movement) -> KeyOutcome {
        let before = self.navigator.current_part_index();
        let moved = match movement {
            Movement::Left => {
                self.navigator.move_left(&self.entries);
                true
            }
            Movement::Right => {
                self.navigator.move_right(&self.entries);
                true
            }
            Movement::Home => {
                self.navigator.move_home(&self.entries);
                true
            }
            Movement::End => {
                self.navigator.move_end(&self.entries, &self.slots);
                true
            }
            Movement::TabForward => self.navigator.tab_forward(&self.entries),
            Movement::TabBackward => self.navigator.tab_backward(&self.entries),
        };
        if !moved {
            return KeyOutcome::PassThrough;
        }
        if self.navigator.current_part_index() != before
            && let (Some(entry), Some(slot)) =
                (self.entries.get(before), self.slots.get_slot_mut(before))
        {
            slot.finalize(entry);
        }
        KeyOutcome::Moved
    }

    /// Release the instance, handing the host back to the caller.
    pub fn dispose(self) -> Option<H> {
        log::debug!(target: "mask.parser", "{}: disposed", self.id);
        self.host
    }

    fn rules(&mut self) -> RuleProcessor<'_> {
        RuleProcessor::new(
            &self.entries,
            &mut self.slots,
            &mut self.navigator,
            self.definition.delete_shifts_format_part,
        )
    }

    fn any_slot_invalid(&self) -> bool {
        self.slots.iter().any(|slot| {
            self.entries
                .get(slot.part_index())
                .is_some_and(|entry| slot.is_invalid(entry))
        })
    }

    /// Filler view while focused; placeholder view when empty and unfocused.
    fn write_display(&mut self) {
        if self.lifecycle != Lifecycle::Focused && self.slots.all_slots_empty() {
            let text = render::render_placeholder(&self.entries);
            if let Some(host) = self.host.as_mut() {
                host.write_text(&text);
            }
        } else {
            self.write_text();
        }
    }

    fn write_text(&mut self) {
        let text = self.render();
        if let Some(host) = self.host.as_mut() {
            host.write_text(&text);
        }
    }

    /// Caret placement always follows the latest render.
    fn flush_caret(&mut self) {
        if let Some(host) = self.host.as_mut() {
            self.navigator.flush(host);
        }
    }

    fn evaluate_transition(&mut self) {
        let complete = self.is_settled();
        if complete {
            let value = render::render_committed(&self.entries, &self.slots);
            if !self.was_complete || self.emitted.as_deref() != Some(value.as_str()) {
                log::debug!(target: "mask.parser", "{}: complete {value:?}", self.id);
                self.emit(Some(&value));
                self.emitted = Some(value);
            }
        } else if self.slots.all_slots_empty() && self.emitted.is_some() {
            log::debug!(target: "mask.parser", "{}: cleared", self.id);
            self.emitted = None;
            self.emit(None);
        }
        self.was_complete = complete;
    }

    fn emit(&mut self, value: Option<&str>) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(value);
        }
    }
}

impl<H> fmt::Debug for MaskParser<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskParser")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle)
            .field("slots", &self.slots)
            .field("cursor", &self.navigator.cursor())
            .field("attached", &self.host.is_some())
            .field("invalid", &self.invalid)
            .finish_non_exhaustive()
    }
}

fn find_chars(haystack: &[char], from: usize, needle: &[char]) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FormatPart, FormatPreset};
    use crate::host::StringHost;
    use crate::selection::SelectionRange;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<Option<String>>>>;

    fn focused_host() -> StringHost {
        let mut host = StringHost::new();
        host.set_focused(true);
        host
    }

    fn parser(def: FormatDefinition) -> (MaskParser<StringHost>, Log) {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let parser = MaskParser::new(def)
            .with_on_change(move |v| sink.borrow_mut().push(v.map(str::to_string)));
        (parser, log)
    }

    fn press(parser: &mut MaskParser<StringHost>, keys: &[&'static str]) -> Vec<KeyOutcome> {
        keys.iter()
            .map(|k| parser.on_key_down(&KeyEvent::new(*k)))
            .collect()
    }

    fn caret(parser: &MaskParser<StringHost>) -> usize {
        parser.host().map_or(usize::MAX, StringHost::caret)
    }

    fn month_year() -> FormatDefinition {
        FormatDefinition::new(vec![
            FormatPart::numeric(2, "mm").bounds(1, 12).padded().tab_on_overflow(),
            FormatPart::separator("/"),
            FormatPart::numeric(4, "yyyy").require_all(),
        ])
    }

    #[test]
    fn unattached_parser_ignores_keys() {
        let (mut parser, log) = parser(month_year());
        assert_eq!(parser.lifecycle(), Lifecycle::Unattached);
        assert_eq!(
            parser.on_key_down(&KeyEvent::new("1")),
            KeyOutcome::PassThrough
        );
        parser.on_focus();
        parser.on_blur();
        assert!(parser.slots().all_slots_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn typing_full_value_fires_once() {
        let (mut parser, log) = parser(month_year());
        parser.attach_host(focused_host());
        assert_eq!(parser.lifecycle(), Lifecycle::Focused);
        press(&mut parser, &["1", "2", "2", "0", "2", "4"]);
        assert_eq!(parser.render(), "12/2024");
        assert_eq!(parser.host().unwrap().text(), "12/2024");
        assert!(parser.slots().all_slots_completed());
        assert_eq!(*log.borrow(), vec![Some("12/2024".to_string())]);
        assert_eq!(parser.value().as_deref(), Some("12/2024"));
    }

    #[test]
    fn caret_follows_each_render() {
        let (mut parser, _) = parser(month_year());
        parser.attach_host(focused_host());
        assert_eq!(caret(&parser), 0);
        press(&mut parser, &["1"]);
        assert_eq!(parser.host().unwrap().text(), "1_/____");
        assert_eq!(caret(&parser), 1);
        press(&mut parser, &["2"]);
        assert_eq!(caret(&parser), 3);
    }

    #[test]
    fn load_then_clear_fires_value_then_none() {
        let (mut parser, log) = parser(FormatPreset::DayMonthYear.definition());
        parser.attach_host(focused_host());
        parser.load_value("24/12/2024");
        assert_eq!(parser.render(), "24/12/2024");
        parser.load_value("");
        assert!(parser.slots().all_slots_empty());
        parser.load_value("");
        assert_eq!(
            *log.borrow(),
            vec![Some("24/12/2024".to_string()), None]
        );
    }

    #[test]
    fn clearing_without_prior_value_stays_silent() {
        let (mut parser, log) = parser(FormatPreset::DayMonthYear.definition());
        parser.attach_host(focused_host());
        press(&mut parser, &["1", "Backspace"]);
        assert!(parser.slots().all_slots_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn editing_back_to_empty_reports_none() {
        let (mut parser, log) = parser(FormatPreset::Hour24.definition());
        parser.attach_host(focused_host());
        press(&mut parser, &["0", "9", "1", "5"]);
        press(&mut parser, &["Backspace", "Backspace", "Backspace"]);
        assert_eq!(parser.render(), "0_:__");
        assert_eq!(log.borrow().len(), 1);
        press(&mut parser, &["Backspace"]);
        assert_eq!(parser.render(), "__:__");
        assert_eq!(*log.borrow(), vec![Some("09:15".to_string()), None]);
    }

    #[test]
    fn padded_slot_mid_edit_does_not_fire() {
        let (mut parser, log) = parser(FormatPreset::Hour24.definition());
        parser.attach_host(focused_host());
        press(&mut parser, &["0", "9", "1"]);
        assert!(parser.slots().all_slots_completed());
        assert_eq!(parser.value(), None);
        assert!(log.borrow().is_empty());
        parser.on_blur();
        assert_eq!(*log.borrow(), vec![Some("09:01".to_string())]);
    }

    #[test]
    fn recompleting_fires_again() {
        let (mut parser, log) = parser(FormatPreset::Hour24.definition());
        parser.attach_host(focused_host());
        press(&mut parser, &["0", "9", "1", "5", "Backspace", "5"]);
        assert_eq!(
            *log.borrow(),
            vec![Some("09:15".to_string()), Some("09:15".to_string())]
        );
    }

    #[test]
    fn partial_load_fills_locatable_slots() {
        let (mut parser, log) = parser(FormatPreset::DayMonthYear.definition());
        parser.load_value("7/11");
        assert_eq!(parser.render(), "07/11/____");
        parser.load_value("xx/03/1999");
        assert_eq!(parser.render(), "__/03/1999");
        parser.load_value("05-06-2001");
        assert_eq!(parser.render(), "__/__/____");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn load_before_attach_renders_on_attach() {
        let (mut parser, _) = parser(FormatPreset::Hour12.definition());
        parser.load_value("9:05 pm");
        parser.attach_host(StringHost::new());
        assert_eq!(parser.lifecycle(), Lifecycle::Attached);
        assert_eq!(parser.host().unwrap().text(), "09:05 PM");
    }

    #[test]
    fn blur_pads_and_shows_placeholder_when_empty() {
        let (mut parser, _) = parser(FormatPreset::DayMonthYear.definition());
        parser.attach_host(StringHost::new());
        assert_eq!(parser.host().unwrap().text(), "dd/mm/yyyy");

        parser.on_focus();
        assert_eq!(parser.host().unwrap().text(), "__/__/____");
        press(&mut parser, &["4"]);
        parser.on_blur();
        assert_eq!(parser.lifecycle(), Lifecycle::Blurred);
        assert_eq!(parser.host().unwrap().text(), "04/__/____");

        parser.on_focus();
        press(&mut parser, &["End", "Backspace", "Backspace"]);
        parser.on_blur();
        assert_eq!(parser.host().unwrap().text(), "dd/mm/yyyy");
    }

    #[test]
    fn invalid_flag_is_soft() {
        let def = FormatDefinition::new(vec![
            FormatPart::numeric(2, "mm").bounds(1, 12).error_on_overflow(),
            FormatPart::separator("/"),
            FormatPart::numeric(2, "dd").bounds(1, 31),
        ]);
        let (mut parser, _) = parser(def);
        parser.attach_host(focused_host());
        assert_eq!(press(&mut parser, &["1", "3"]), vec![
            KeyOutcome::Accepted,
            KeyOutcome::Invalid
        ]);
        assert!(parser.is_invalid());
        assert_eq!(press(&mut parser, &["0"]), vec![KeyOutcome::Accepted]);
        assert!(!parser.is_invalid());
        assert_eq!(parser.render(), "10/__");
    }

    #[test]
    fn full_out_of_range_slot_is_flagged() {
        let (mut parser, _) = parser(FormatPreset::DayMonthYear.definition());
        parser.attach_host(focused_host());
        press(&mut parser, &["0", "0"]);
        assert!(parser.is_invalid());
        press(&mut parser, &["Backspace", "1"]);
        assert!(!parser.is_invalid());
    }

    #[test]
    fn tab_at_edges_passes_through() {
        let (mut parser, _) = parser(FormatPreset::Hour24.definition());
        parser.attach_host(focused_host());
        assert_eq!(
            parser.on_key_down(&KeyEvent::new("Tab").with_shift()),
            KeyOutcome::PassThrough
        );
        assert_eq!(parser.on_key_down(&KeyEvent::new("Tab")), KeyOutcome::Moved);
        assert_eq!(caret(&parser), 3);
        assert_eq!(
            parser.on_key_down(&KeyEvent::new("Tab")),
            KeyOutcome::PassThrough
        );
    }

    #[test]
    fn leaving_a_slot_pads_it() {
        let (mut parser, _) = parser(FormatPreset::Hour24.definition());
        parser.attach_host(focused_host());
        press(&mut parser, &["7", "ArrowRight", "ArrowRight"]);
        assert_eq!(parser.render(), "07:__");
        assert_eq!(parser.cursor().current_part_index, 2);
    }

    #[test]
    fn modifiers_and_shortcuts_are_left_alone() {
        let (mut parser, _) = parser(FormatPreset::Hour24.definition());
        parser.attach_host(focused_host());
        let rev = parser.host().unwrap().text_revision();
        assert_eq!(parser.on_key_down(&KeyEvent::new("Shift")), KeyOutcome::Ignored);
        assert_eq!(
            parser.on_key_down(&KeyEvent::new("c").with_meta()),
            KeyOutcome::PassThrough
        );
        assert_eq!(parser.on_key_down(&KeyEvent::new("Enter")), KeyOutcome::PassThrough);
        assert_eq!(parser.host().unwrap().text_revision(), rev);
    }

    #[test]
    fn pointer_selection_is_normalized() {
        let (mut parser, _) = parser(FormatPreset::DayMonthYear.definition());
        parser.attach_host(focused_host());
        parser.on_select(5, None);
        assert_eq!(parser.cursor().current_part_index, 4);
        assert_eq!(parser.host().unwrap().selection(), SelectionRange::caret(6));
    }

    #[test]
    fn dispose_returns_host() {
        let (mut parser, _) = parser(FormatPreset::DayMonthYear.definition());
        parser.attach_host(focused_host());
        let host = parser.dispose().unwrap();
        assert_eq!(host.text(), "__/__/____");
    }
}
