//! Normalized key events and the key classifier.
//!
//! Hosts translate their native key events into [`KeyEvent`] using the
//! DOM-style key names (`"ArrowLeft"`, `"Backspace"`, `"5"`, ...).

use std::borrow::Cow;

/// A key press as seen by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Cow<'static, str>,
    pub shift_key: bool,
    pub meta_key: bool,
    pub ctrl_key: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self {
            key: key.into(),
            shift_key: false,
            meta_key: false,
            ctrl_key: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    /// The single character this key produces, if it is printable.
    pub fn printable_char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

impl From<&'static str> for KeyEvent {
    fn from(key: &'static str) -> Self {
        KeyEvent::new(key)
    }
}

impl From<char> for KeyEvent {
    fn from(ch: char) -> Self {
        KeyEvent::new(ch.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Left,
    Right,
    Home,
    End,
    TabForward,
    TabBackward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Editing {
    Backspace,
    Delete,
}

/// Bucket a key press falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyClass {
    Digit(char),
    /// Any other printable character.
    Character(char),
    Movement(Movement),
    Editing(Editing),
    /// Pure modifier press (`Shift`, `Alt`, ...).
    Modifier,
    /// A key combined with `Meta`/`Control`; left to the host.
    Shortcut,
    Other,
}

pub fn is_number_key(event: &KeyEvent) -> bool {
    event.printable_char().is_some_and(|c| c.is_ascii_digit())
}

pub fn is_movement_key(event: &KeyEvent) -> bool {
    matches!(
        event.key.as_ref(),
        "ArrowLeft" | "ArrowRight" | "Home" | "End" | "Tab"
    )
}

pub fn is_editing_key(event: &KeyEvent) -> bool {
    matches!(event.key.as_ref(), "Backspace" | "Delete")
}

pub fn is_ignore_key(event: &KeyEvent) -> bool {
    matches!(
        event.key.as_ref(),
        "Shift" | "Alt" | "Control" | "Meta" | "Fn" | "AltGraph" | "CapsLock"
    )
}

pub fn classify(event: &KeyEvent) -> KeyClass {
    if is_ignore_key(event) {
        return KeyClass::Modifier;
    }
    if event.meta_key || event.ctrl_key {
        return KeyClass::Shortcut;
    }
    if is_movement_key(event) {
        let movement = match event.key.as_ref() {
            "ArrowLeft" => Movement::Left,
            "ArrowRight" => Movement::Right,
            "Home" => Movement::Home,
            "End" => Movement::End,
            _ if event.shift_key => Movement::TabBackward,
            _ => Movement::TabForward,
        };
        return KeyClass::Movement(movement);
    }
    if is_editing_key(event) {
        let editing = if event.key == "Backspace" {
            Editing::Backspace
        } else {
            Editing::Delete
        };
        return KeyClass::Editing(editing);
    }
    match event.printable_char() {
        Some(c) if c.is_ascii_digit() => KeyClass::Digit(c),
        Some(c) => KeyClass::Character(c),
        None => KeyClass::Other,
    }
}
