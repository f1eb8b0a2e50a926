//! Declarative mask description: format parts, format definitions and the
//! built-in date/time presets.
//!
//! A [`FormatDefinition`] is static data supplied once per mask. Its JSON shape
//! uses camelCase names so definitions produced by other tooling load as-is:
//!
//! ```
//! use mask_core::FormatDefinition;
//!
//! let def = FormatDefinition::from_json(r#"{
//!     "formatParts": [
//!         { "characterCount": 2, "placeholder": "mm", "inputText": "_",
//!           "minimumValue": 1, "maximumValue": 12, "padWithZeros": true,
//!           "exceedingMaximumValueCausesTab": true },
//!         { "characterCount": 1, "isSeparator": true, "inputText": "/" },
//!         { "characterCount": 4, "placeholder": "yyyy", "inputText": "_",
//!           "allCharactersRequired": true }
//!     ]
//! }"#).unwrap();
//! assert_eq!(def.format_parts.len(), 3);
//! ```

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filler glyph used by the presets for unfilled characters.
pub const DEFAULT_FILLER: &str = "_";

/// How the characters of an editable part are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    #[serde(alias = "Numeric")]
    Numeric,
    /// Enumerated values, e.g. meridian markers.
    #[serde(alias = "Text")]
    Text,
}

/// One segment of a mask: either an editable field or a fixed separator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatPart {
    /// The only field a serialized part must carry.
    pub character_count: usize,
    #[serde(default)]
    pub is_separator: bool,
    /// Text shown for this part while the whole mask is empty and unfocused.
    #[serde(default)]
    pub placeholder: String,
    /// Filler glyph for editable parts, literal text for separators.
    #[serde(default)]
    pub input_text: String,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_values: Vec<String>,
    #[serde(default)]
    pub all_characters_required: bool,
    #[serde(default)]
    pub pad_with_zeros: bool,
    #[serde(default)]
    pub exceeding_maximum_value_causes_tab: bool,
    #[serde(default)]
    pub exceeding_maximum_value_causes_error: bool,
}

impl FormatPart {
    /// A numeric field of `count` digits using the default filler glyph.
    pub fn numeric(count: usize, placeholder: &str) -> Self {
        Self {
            character_count: count,
            placeholder: placeholder.to_string(),
            input_text: DEFAULT_FILLER.to_string(),
            ..Self::default()
        }
    }

    /// An enumerated text field accepting one of `values`.
    pub fn text(count: usize, placeholder: &str, values: &[&str]) -> Self {
        Self {
            character_count: count,
            placeholder: placeholder.to_string(),
            input_text: DEFAULT_FILLER.to_string(),
            value_type: ValueType::Text,
            possible_values: values.iter().map(|v| v.to_string()).collect(),
            all_characters_required: true,
            ..Self::default()
        }
    }

    /// A fixed separator rendering `text` verbatim.
    pub fn separator(text: &str) -> Self {
        Self {
            character_count: text.chars().count(),
            is_separator: true,
            placeholder: text.to_string(),
            input_text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn bounds(mut self, min: u32, max: u32) -> Self {
        self.minimum_value = Some(min);
        self.maximum_value = Some(max);
        self
    }

    pub fn padded(mut self) -> Self {
        self.pad_with_zeros = true;
        self
    }

    pub fn require_all(mut self) -> Self {
        self.all_characters_required = true;
        self
    }

    pub fn tab_on_overflow(mut self) -> Self {
        self.exceeding_maximum_value_causes_tab = true;
        self
    }

    pub fn error_on_overflow(mut self) -> Self {
        self.exceeding_maximum_value_causes_error = true;
        self
    }

    pub fn with_filler(mut self, glyph: &str) -> Self {
        self.input_text = glyph.to_string();
        self
    }

    /// The glyph rendered for each unfilled character of an editable part.
    pub fn filler(&self) -> char {
        self.input_text.chars().next().unwrap_or('_')
    }

    /// Returns `true` if `value` satisfies whichever bounds are declared.
    pub fn within_bounds(&self, value: u64) -> bool {
        self.minimum_value.is_none_or(|min| value >= u64::from(min))
            && self.maximum_value.is_none_or(|max| value <= u64::from(max))
    }

    fn validate(&self, index: usize) -> Result<(), FormatError> {
        if self.character_count == 0 {
            return Err(FormatError::ZeroWidthPart { index });
        }
        if self.is_separator {
            let found = self.input_text.chars().count();
            if found != self.character_count {
                return Err(FormatError::SeparatorWidthMismatch {
                    index,
                    expected: self.character_count,
                    found,
                });
            }
            return Ok(());
        }
        if self.input_text.chars().count() != 1 {
            return Err(FormatError::BadFillerGlyph {
                index,
                found: self.input_text.clone(),
            });
        }
        if let (Some(min), Some(max)) = (self.minimum_value, self.maximum_value)
            && min > max
        {
            return Err(FormatError::InvalidBounds { index, min, max });
        }
        if self.value_type == ValueType::Text {
            if self.possible_values.is_empty() {
                return Err(FormatError::MissingPossibleValues { index });
            }
            if let Some(value) = self
                .possible_values
                .iter()
                .find(|v| v.chars().count() > self.character_count)
            {
                return Err(FormatError::PossibleValueWidth {
                    index,
                    value: value.clone(),
                    count: self.character_count,
                });
            }
        }
        Ok(())
    }
}

/// An ordered list of format parts describing one input mask.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDefinition {
    /// Whether deleting a character ripples the following characters left
    /// across slot boundaries.
    #[serde(default)]
    pub delete_shifts_format_part: bool,
    pub format_parts: Vec<FormatPart>,
}

impl FormatDefinition {
    pub fn new(format_parts: Vec<FormatPart>) -> Self {
        Self {
            delete_shifts_format_part: false,
            format_parts,
        }
    }

    pub fn with_delete_shift(mut self, enabled: bool) -> Self {
        self.delete_shifts_format_part = enabled;
        self
    }

    /// Parse and validate a JSON definition.
    pub fn from_json(src: &str) -> Result<Self, FormatError> {
        let def: Self = serde_json::from_str(src)?;
        def.checked("json")
    }

    /// Parse and validate a TOML definition (`[[formatParts]]` tables).
    pub fn from_toml(src: &str) -> Result<Self, FormatError> {
        let def: Self = toml::from_str(src)?;
        def.checked("toml")
    }

    fn checked(self, source: &str) -> Result<Self, FormatError> {
        if let Err(err) = self.validate() {
            log::warn!(target: "mask.format", "rejecting {source} definition: {err}");
            return Err(err);
        }
        log::debug!(
            target: "mask.format",
            "loaded {source} definition: {} parts, {} characters",
            self.format_parts.len(),
            self.total_length()
        );
        Ok(self)
    }

    /// Look up a built-in definition by preset name.
    pub fn preset(name: &str) -> Result<Self, FormatError> {
        Ok(name.parse::<FormatPreset>()?.definition())
    }

    /// Check the definition for caller errors the engine would otherwise
    /// tolerate with degraded behavior.
    pub fn validate(&self) -> Result<(), FormatError> {
        for (index, part) in self.format_parts.iter().enumerate() {
            part.validate(index)?;
        }
        if self.format_parts.iter().all(|p| p.is_separator) {
            return Err(FormatError::NoEditableParts);
        }
        Ok(())
    }

    /// Build a range mask: this definition twice, joined by `separator`.
    pub fn range(&self, separator: &str) -> Self {
        let mut format_parts = Vec::with_capacity(self.format_parts.len() * 2 + 1);
        format_parts.extend(self.format_parts.iter().cloned());
        format_parts.push(FormatPart::separator(separator));
        format_parts.extend(self.format_parts.iter().cloned());
        Self {
            delete_shifts_format_part: self.delete_shifts_format_part,
            format_parts,
        }
    }

    /// Total rendered length in characters.
    pub fn total_length(&self) -> usize {
        self.format_parts.iter().map(|p| p.character_count).sum()
    }
}

/// Built-in date and time layouts, selectable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatPreset {
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
    Hour12,
    Hour24,
}

impl FormatPreset {
    pub const ALL: [FormatPreset; 5] = [
        FormatPreset::DayMonthYear,
        FormatPreset::MonthDayYear,
        FormatPreset::YearMonthDay,
        FormatPreset::Hour12,
        FormatPreset::Hour24,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormatPreset::DayMonthYear => "day-month-year",
            FormatPreset::MonthDayYear => "month-day-year",
            FormatPreset::YearMonthDay => "year-month-day",
            FormatPreset::Hour12 => "12-hour",
            FormatPreset::Hour24 => "24-hour",
        }
    }

    pub fn definition(self) -> FormatDefinition {
        let parts = match self {
            FormatPreset::DayMonthYear => vec![
                day_part(),
                FormatPart::separator("/"),
                month_part(),
                FormatPart::separator("/"),
                year_part(),
            ],
            FormatPreset::MonthDayYear => vec![
                month_part(),
                FormatPart::separator("/"),
                day_part(),
                FormatPart::separator("/"),
                year_part(),
            ],
            FormatPreset::YearMonthDay => vec![
                year_part(),
                FormatPart::separator("-"),
                month_part(),
                FormatPart::separator("-"),
                day_part(),
            ],
            FormatPreset::Hour12 => vec![
                FormatPart::numeric(2, "hh").bounds(1, 12).padded().tab_on_overflow(),
                FormatPart::separator(":"),
                minute_part(),
                FormatPart::separator(" "),
                FormatPart::text(2, "aa", &["AM", "PM"]),
            ],
            FormatPreset::Hour24 => vec![
                FormatPart::numeric(2, "hh").bounds(0, 23).padded().tab_on_overflow(),
                FormatPart::separator(":"),
                minute_part(),
            ],
        };
        FormatDefinition::new(parts)
    }
}

fn day_part() -> FormatPart {
    FormatPart::numeric(2, "dd").bounds(1, 31).padded().tab_on_overflow()
}

fn month_part() -> FormatPart {
    FormatPart::numeric(2, "mm").bounds(1, 12).padded().tab_on_overflow()
}

fn year_part() -> FormatPart {
    FormatPart::numeric(4, "yyyy").bounds(1, 9999).require_all()
}

fn minute_part() -> FormatPart {
    FormatPart::numeric(2, "mm").bounds(0, 59).padded().tab_on_overflow()
}

impl fmt::Display for FormatPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatPreset {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatPreset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FormatError::UnknownPreset(s.to_string()))
    }
}
