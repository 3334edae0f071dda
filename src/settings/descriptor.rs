use serde::{Deserialize, Serialize};

use super::kind::{Breakpoint, SettingGroup, SettingKind};
use super::validation::{ValueError, Validation, check_bounds, is_color, is_link};
use super::value::SettingValue;

/// One entry of a select, radio or responsive select control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            group: None,
        }
    }
}

/// Comparison applied by a conditional rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    LessThan,
    Exists,
    NotExists,
}

/// Show the owning setting only while a sibling setting satisfies a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Id of the sibling setting whose effective value is tested.
    pub setting: String,
    #[serde(default)]
    pub operator: ConditionOperator,
    #[serde(default = "null_value")]
    pub value: SettingValue,
}

fn null_value() -> SettingValue {
    SettingValue::Null
}

impl Condition {
    pub fn new(
        setting: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<SettingValue>,
    ) -> Self {
        Self {
            setting: setting.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(setting: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        Self::new(setting, ConditionOperator::Equals, value)
    }

    pub fn exists(setting: impl Into<String>) -> Self {
        Self::new(setting, ConditionOperator::Exists, SettingValue::Null)
    }
}

/// Declaration of a single configurable field of a section or block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDescriptor {
    /// Empty for presentational descriptors.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SettingKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SettingValue>,
    #[serde(default)]
    pub group: SettingGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub responsive: bool,
}

impl SettingDescriptor {
    pub fn new(kind: SettingKind, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            default: None,
            group: SettingGroup::default(),
            info: None,
            placeholder: None,
            options: Vec::new(),
            min: None,
            max: None,
            step: None,
            unit: None,
            conditional: None,
            validation: None,
            required: false,
            responsive: matches!(
                kind,
                SettingKind::ResponsiveSelect | SettingKind::ResponsiveRange
            ),
        }
    }

    /// Panel heading; carries no id and no value.
    pub fn heading(label: impl Into<String>) -> Self {
        Self::new(SettingKind::Header, "", label)
    }

    pub fn with_default(mut self, value: impl Into<SettingValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn in_group(mut self, group: SettingGroup) -> Self {
        self.group = group;
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(value, label)| SelectOption::new(value, label))
            .collect();
        self
    }

    pub fn with_range(mut self, min: f64, max: f64, step: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.step = Some(step);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditional = Some(condition);
        self
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn carries_value(&self) -> bool {
        self.kind.carries_value()
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    /// Decide whether `value` may be stored for this setting.
    pub fn check_value(&self, value: &SettingValue) -> Result<(), ValueError> {
        if !self.kind.carries_value() {
            return Err(ValueError::NotValueBearing(self.kind));
        }
        if value.is_blank() {
            if self.required {
                return Err(ValueError::Required);
            }
            if value.is_null() {
                return Ok(());
            }
        }
        if !self.kind.accepts(value) {
            return Err(ValueError::Shape {
                kind: self.kind,
                found: value.shape(),
            });
        }

        match (self.kind, value) {
            (SettingKind::Select | SettingKind::Radio, SettingValue::Text(choice)) => {
                self.check_option(choice)?;
            }
            (SettingKind::ResponsiveSelect, SettingValue::Map(entries)) => {
                for (breakpoint, choice) in entries {
                    check_breakpoint(breakpoint)?;
                    if let Some(choice) = choice.as_str() {
                        self.check_option(choice)?;
                    }
                }
            }
            (SettingKind::Range | SettingKind::Number, SettingValue::Number(number)) => {
                check_bounds(*number, self.min, self.max)?;
            }
            (SettingKind::ResponsiveRange, SettingValue::Map(entries)) => {
                for (breakpoint, number) in entries {
                    check_breakpoint(breakpoint)?;
                    if let Some(number) = number.as_f64() {
                        check_bounds(number, self.min, self.max)?;
                    }
                }
            }
            (SettingKind::Color, SettingValue::Text(text)) => {
                if !text.is_empty() && !is_color(text) {
                    return Err(ValueError::BadColor(text.clone()));
                }
            }
            (SettingKind::Url, SettingValue::Text(text)) => {
                if !is_link(text) {
                    return Err(ValueError::BadUrl(text.clone()));
                }
            }
            _ => {}
        }

        if let Some(validation) = &self.validation {
            match value {
                SettingValue::Text(text) => validation.check_text(text)?,
                SettingValue::Number(number) => validation.check_number(*number)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn check_option(&self, choice: &str) -> Result<(), ValueError> {
        if self.options.is_empty() || self.has_option(choice) {
            Ok(())
        } else {
            Err(ValueError::NotAnOption(choice.to_string()))
        }
    }
}

fn check_breakpoint(key: &str) -> Result<(), ValueError> {
    Breakpoint::parse(key)
        .map(|_| ())
        .ok_or_else(|| ValueError::UnknownBreakpoint(key.to_string()))
}
