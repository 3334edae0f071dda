use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::SettingValue;

/// Editor control a setting is declared with. The kind decides which value
/// shapes the setting accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    Text,
    Textarea,
    Richtext,
    Select,
    Checkbox,
    Radio,
    Color,
    #[serde(alias = "image_picker")]
    Image,
    Url,
    Range,
    Number,
    /// Presentational heading; carries no value.
    Header,
    /// Presentational help text; carries no value.
    Paragraph,
    FontPicker,
    CollectionPicker,
    ProductList,
    #[serde(alias = "link_list")]
    MenuPicker,
    Video,
    ResponsiveSelect,
    ResponsiveRange,
    IconPicker,
    ShadowPicker,
    SpacingPicker,
    AnimationPicker,
}

impl SettingKind {
    pub const ALL: [SettingKind; 24] = [
        SettingKind::Text,
        SettingKind::Textarea,
        SettingKind::Richtext,
        SettingKind::Select,
        SettingKind::Checkbox,
        SettingKind::Radio,
        SettingKind::Color,
        SettingKind::Image,
        SettingKind::Url,
        SettingKind::Range,
        SettingKind::Number,
        SettingKind::Header,
        SettingKind::Paragraph,
        SettingKind::FontPicker,
        SettingKind::CollectionPicker,
        SettingKind::ProductList,
        SettingKind::MenuPicker,
        SettingKind::Video,
        SettingKind::ResponsiveSelect,
        SettingKind::ResponsiveRange,
        SettingKind::IconPicker,
        SettingKind::ShadowPicker,
        SettingKind::SpacingPicker,
        SettingKind::AnimationPicker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKind::Text => "text",
            SettingKind::Textarea => "textarea",
            SettingKind::Richtext => "richtext",
            SettingKind::Select => "select",
            SettingKind::Checkbox => "checkbox",
            SettingKind::Radio => "radio",
            SettingKind::Color => "color",
            SettingKind::Image => "image",
            SettingKind::Url => "url",
            SettingKind::Range => "range",
            SettingKind::Number => "number",
            SettingKind::Header => "header",
            SettingKind::Paragraph => "paragraph",
            SettingKind::FontPicker => "font_picker",
            SettingKind::CollectionPicker => "collection_picker",
            SettingKind::ProductList => "product_list",
            SettingKind::MenuPicker => "menu_picker",
            SettingKind::Video => "video",
            SettingKind::ResponsiveSelect => "responsive_select",
            SettingKind::ResponsiveRange => "responsive_range",
            SettingKind::IconPicker => "icon_picker",
            SettingKind::ShadowPicker => "shadow_picker",
            SettingKind::SpacingPicker => "spacing_picker",
            SettingKind::AnimationPicker => "animation_picker",
        }
    }

    /// Header and paragraph descriptors only decorate the settings panel and
    /// are never written into an instance.
    pub fn carries_value(&self) -> bool {
        !matches!(self, SettingKind::Header | SettingKind::Paragraph)
    }

    /// Kinds whose value is a choice among declared options.
    pub fn uses_options(&self) -> bool {
        matches!(
            self,
            SettingKind::Select | SettingKind::Radio | SettingKind::ResponsiveSelect
        )
    }

    /// Kinds whose value is bounded by `min`/`max`.
    pub fn is_ranged(&self) -> bool {
        matches!(
            self,
            SettingKind::Range | SettingKind::Number | SettingKind::ResponsiveRange
        )
    }

    /// Shape check only. `Null` is accepted by every value-bearing kind as an
    /// explicit clear.
    pub fn accepts(&self, value: &SettingValue) -> bool {
        if !self.carries_value() {
            return false;
        }
        if value.is_null() {
            return true;
        }
        match self {
            SettingKind::Checkbox => matches!(value, SettingValue::Bool(_)),
            SettingKind::Range | SettingKind::Number => matches!(value, SettingValue::Number(_)),
            SettingKind::ProductList => value
                .as_list()
                .map(|items| items.iter().all(|item| item.as_str().is_some()))
                .unwrap_or(false),
            SettingKind::ResponsiveSelect => value
                .as_map()
                .map(|entries| entries.values().all(|v| v.as_str().is_some()))
                .unwrap_or(false),
            SettingKind::ResponsiveRange | SettingKind::SpacingPicker => value
                .as_map()
                .map(|entries| entries.values().all(|v| v.as_f64().is_some()))
                .unwrap_or(false),
            SettingKind::ShadowPicker => {
                matches!(value, SettingValue::Map(_) | SettingValue::Text(_))
            }
            SettingKind::Header | SettingKind::Paragraph => false,
            _ => matches!(value, SettingValue::Text(_)),
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings panel grouping.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SettingGroup {
    #[default]
    Content,
    Layout,
    Style,
    Behavior,
    Advanced,
    General,
}

impl SettingGroup {
    /// Panel display order.
    pub const ORDER: [SettingGroup; 6] = [
        SettingGroup::Content,
        SettingGroup::Layout,
        SettingGroup::Style,
        SettingGroup::Behavior,
        SettingGroup::Advanced,
        SettingGroup::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingGroup::Content => "content",
            SettingGroup::Layout => "layout",
            SettingGroup::Style => "style",
            SettingGroup::Behavior => "behavior",
            SettingGroup::Advanced => "advanced",
            SettingGroup::General => "general",
        }
    }
}

/// Viewport keys accepted by the responsive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
    DesktopLarge,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 4] = [
        Breakpoint::Mobile,
        Breakpoint::Tablet,
        Breakpoint::Desktop,
        Breakpoint::DesktopLarge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Mobile => "mobile",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Desktop => "desktop",
            Breakpoint::DesktopLarge => "desktop_large",
        }
    }

    pub fn parse(key: &str) -> Option<Breakpoint> {
        Breakpoint::ALL.into_iter().find(|bp| bp.as_str() == key)
    }
}
