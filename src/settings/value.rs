use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Override map stored on section and block instances. Keys absent from the
/// map fall back to the descriptor default.
pub type SettingsMap = BTreeMap<String, SettingValue>;

/// JSON-compatible setting value.
///
/// Values are stored by shape; which shapes a setting accepts is decided by its
/// [`SettingKind`](super::SettingKind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<SettingValue>),
    Map(BTreeMap<String, SettingValue>),
}

impl SettingValue {
    pub fn text(value: impl Into<String>) -> Self {
        SettingValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SettingValue::Null)
    }

    /// `Null` and empty text count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            SettingValue::Null => true,
            SettingValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SettingValue]> {
        match self {
            SettingValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, SettingValue>> {
        match self {
            SettingValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Numeric reading used by ordered comparisons: numbers as-is, booleans
    /// as 0/1, text when it parses as a number.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            SettingValue::Number(number) if !number.is_nan() => Some(*number),
            SettingValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            SettingValue::Text(text) => text.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    /// Name of the value's shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            SettingValue::Null => "null",
            SettingValue::Bool(_) => "bool",
            SettingValue::Number(_) => "number",
            SettingValue::Text(_) => "text",
            SettingValue::List(_) => "list",
            SettingValue::Map(_) => "map",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str(self.shape()),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Number(value as f64)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Number(f64::from(value))
    }
}

impl<T: Into<SettingValue>> From<Vec<T>> for SettingValue {
    fn from(values: Vec<T>) -> Self {
        SettingValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Build a [`SettingsMap`] from `(key, value)` pairs.
pub fn settings_map<K, V, I>(pairs: I) -> SettingsMap
where
    K: Into<String>,
    V: Into<SettingValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
