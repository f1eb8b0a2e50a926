//! # mask_core
//!
//! UI-agnostic engine for masked, formatted text inputs (dates, times,
//! ranges of either).
//!
//! A mask is described by a [`FormatDefinition`]: an ordered list of
//! [`FormatPart`]s, each either an editable field or a literal separator.
//! At runtime every editable part gets a slot holding what the user typed;
//! key presses are classified, applied by the rule processor, rendered back
//! into display text and the caret is repositioned.
//!
//! - [`MaskParser`]: one mask instance, the entry point a host talks to
//! - [`MaskRegistry`]: page-level map of mask instances by [`MaskId`]
//! - [`TextCursorHost`]: what a text field has to provide (text + caret)
//!
//! ## Design Principles
//!
//! This crate does not depend on any UI toolkit or DOM binding. Hosts
//! translate their native key events into [`KeyEvent`] and implement
//! [`TextCursorHost`]; [`StringHost`] is an in-memory implementation.
//!
//! ```
//! use mask_core::{FormatPreset, KeyEvent, MaskParser, StringHost, TextCursorHost};
//!
//! let mut mask = MaskParser::new(FormatPreset::DayMonthYear.definition());
//! let mut host = StringHost::new();
//! host.set_focused(true);
//! mask.attach_host(host);
//!
//! for key in ["2", "4", "1", "2"] {
//!     mask.on_key_down(&KeyEvent::new(key));
//! }
//! assert_eq!(mask.host().map(|h| h.text()), Some("24/12/____"));
//! ```

mod error;
mod format;
mod host;
mod id;
mod parser;
mod registry;
mod render;
mod selection;

pub mod entries;
pub mod keys;
pub mod navigator;
pub mod rules;
pub mod slots;

pub use error::FormatError;
pub use format::{FormatDefinition, FormatPart, FormatPreset, ValueType};
pub use host::{StringHost, TextCursorHost};
pub use id::MaskId;
pub use keys::{KeyClass, KeyEvent};
pub use parser::{ChangeCallback, Lifecycle, MaskParser};
pub use registry::MaskRegistry;
pub use render::{render, render_committed, render_placeholder};
pub use rules::KeyOutcome;
pub use selection::SelectionRange;
pub use slots::{FormatSlot, SlotCollection, SlotState};
