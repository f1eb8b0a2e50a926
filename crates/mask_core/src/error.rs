//! Errors raised while loading or validating a format definition.
//!
//! Runtime editing never produces these; a keystroke that cannot apply is
//! reported through [`KeyOutcome`](crate::KeyOutcome) instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("format part {index} has a character count of zero")]
    ZeroWidthPart { index: usize },

    #[error("separator part {index} declares {expected} characters but its input text has {found}")]
    SeparatorWidthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("format part {index} needs exactly one filler glyph, got {found:?}")]
    BadFillerGlyph { index: usize, found: String },

    #[error("format part {index} has minimum {min} above maximum {max}")]
    InvalidBounds { index: usize, min: u32, max: u32 },

    #[error("text format part {index} has no possible values")]
    MissingPossibleValues { index: usize },

    #[error("possible value {value:?} of format part {index} exceeds {count} characters")]
    PossibleValueWidth {
        index: usize,
        value: String,
        count: usize,
    },

    #[error("format definition has no editable parts")]
    NoEditableParts,

    #[error("unknown format preset: {0}")]
    UnknownPreset(String),

    #[error("invalid format definition JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid format definition TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
