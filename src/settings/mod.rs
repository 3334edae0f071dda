//! Setting descriptor model: what a configurable field is, which values it
//! accepts, and the conditional rule that decides when it is shown.

mod descriptor;
mod kind;
mod validation;
mod value;

pub use descriptor::{Condition, ConditionOperator, SelectOption, SettingDescriptor};
pub use kind::{Breakpoint, SettingGroup, SettingKind};
pub use validation::{Pattern, ValueError, Validation, is_color, is_link};
pub use value::{SettingValue, SettingsMap, settings_map};
