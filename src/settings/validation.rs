use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::kind::SettingKind;

/// Reasons a value is refused by a setting descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("`{0}` settings carry no value")]
    NotValueBearing(SettingKind),
    #[error("`{kind}` settings do not accept a {found} value")]
    Shape {
        kind: SettingKind,
        found: &'static str,
    },
    #[error("`{0}` is not one of the declared options")]
    NotAnOption(String),
    #[error("{value} is outside the allowed range")]
    OutOfRange { value: f64 },
    #[error("numbers must be finite")]
    NotFinite,
    #[error("`{0}` is not a colour")]
    BadColor(String),
    #[error("`{0}` is not a link")]
    BadUrl(String),
    #[error("`{0}` is not a breakpoint")]
    UnknownBreakpoint(String),
    #[error("a value is required")]
    Required,
    #[error("value does not match pattern `{0}`")]
    PatternMismatch(String),
    #[error("value is shorter than {0} characters")]
    TooShort(usize),
    #[error("value is longer than {0} characters")]
    TooLong(usize),
}

/// Regular expression attached to a validation rule. Serialized as its
/// source text; an invalid expression fails deserialization.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Extra constraints on top of the kind's own checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Check a text value against the pattern and length limits.
    pub fn check_text(&self, text: &str) -> Result<(), ValueError> {
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                return Err(ValueError::PatternMismatch(pattern.as_str().to_string()));
            }
        }
        let length = text.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(ValueError::TooShort(min));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(ValueError::TooLong(max));
            }
        }
        Ok(())
    }

    /// Check a numeric value against the bounds.
    pub fn check_number(&self, value: f64) -> Result<(), ValueError> {
        check_bounds(value, self.min, self.max)
    }
}

pub(crate) fn check_bounds(value: f64, min: Option<f64>, max: Option<f64>) -> Result<(), ValueError> {
    // NaN compares false against every bound and serializes as null.
    if !value.is_finite() {
        return Err(ValueError::NotFinite);
    }
    if min.map(|min| value < min).unwrap_or(false) || max.map(|max| value > max).unwrap_or(false) {
        return Err(ValueError::OutOfRange { value });
    }
    Ok(())
}

/// `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
pub fn is_color(text: &str) -> bool {
    if text == "transparent" {
        return true;
    }
    match text.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Empty, store-relative, anchor, or an absolute web/mail/phone link.
pub fn is_link(text: &str) -> bool {
    const SCHEMES: [&str; 4] = ["http://", "https://", "mailto:", "tel:"];
    text.is_empty()
        || text.starts_with('/')
        || text.starts_with('#')
        || SCHEMES.iter().any(|scheme| text.starts_with(scheme))
}
