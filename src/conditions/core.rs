use crate::document::{BlockInstance, SectionInstance};
use crate::schema::{BlockSchema, SectionSchema};
use crate::settings::{
    Condition, ConditionOperator, SettingDescriptor, SettingGroup, SettingValue, SettingsMap,
};

/// Apply a rule to the effective value of its referenced setting. `None`
/// means the setting resolves to nothing.
pub fn evaluate(condition: &Condition, current: Option<&SettingValue>) -> bool {
    let expected = &condition.value;
    match condition.operator {
        ConditionOperator::Equals => current == Some(expected),
        ConditionOperator::NotEquals => current != Some(expected),
        ConditionOperator::In => match (expected.as_list(), current) {
            (Some(options), Some(value)) => options.contains(value),
            _ => false,
        },
        ConditionOperator::NotIn => match expected.as_list() {
            Some(options) => current.map(|value| !options.contains(value)).unwrap_or(true),
            None => false,
        },
        ConditionOperator::GreaterThan => compare(current, expected, |l, r| l > r),
        ConditionOperator::LessThan => compare(current, expected, |l, r| l < r),
        ConditionOperator::Exists => is_present(current),
        ConditionOperator::NotExists => !is_present(current),
    }
}

fn compare(current: Option<&SettingValue>, expected: &SettingValue, op: fn(f64, f64) -> bool) -> bool {
    match (current.and_then(SettingValue::coerce_number), expected.coerce_number()) {
        (Some(left), Some(right)) => op(left, right),
        _ => false,
    }
}

fn is_present(value: Option<&SettingValue>) -> bool {
    value.map(|value| !value.is_blank()).unwrap_or(false)
}

/// Descriptors of `descriptors` whose rule holds (or that have none), in
/// declaration order.
///
/// Effective values are accumulated top to bottom, so a rule sees the
/// override-or-default of every setting declared above it. A referenced
/// setting counts even when it is itself hidden.
pub fn visible_settings<'a>(
    overrides: &SettingsMap,
    descriptors: &'a [SettingDescriptor],
) -> Vec<&'a SettingDescriptor> {
    let mut resolved: SettingsMap = SettingsMap::new();
    let mut visible = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let shown = descriptor
            .conditional
            .as_ref()
            .map(|condition| evaluate(condition, resolved.get(&condition.setting)))
            .unwrap_or(true);
        if shown {
            visible.push(descriptor);
        }
        if descriptor.carries_value() {
            if let Some(value) = overrides.get(&descriptor.id).or(descriptor.default.as_ref()) {
                resolved.insert(descriptor.id.clone(), value.clone());
            }
        }
    }
    visible
}

pub fn visible_section_settings<'a>(
    section: &SectionInstance,
    schema: &'a SectionSchema,
) -> Vec<&'a SettingDescriptor> {
    visible_settings(&section.settings, &schema.settings)
}

pub fn visible_block_settings<'a>(
    block: &BlockInstance,
    schema: &'a BlockSchema,
) -> Vec<&'a SettingDescriptor> {
    visible_settings(&block.settings, &schema.settings)
}

/// Group descriptors for the settings panel, in panel order, skipping empty
/// groups. Order inside a group follows the input.
pub fn group_settings<'a>(
    descriptors: &[&'a SettingDescriptor],
) -> Vec<(SettingGroup, Vec<&'a SettingDescriptor>)> {
    SettingGroup::ORDER
        .into_iter()
        .filter_map(|group| {
            let members: Vec<_> = descriptors
                .iter()
                .copied()
                .filter(|descriptor| descriptor.group == group)
                .collect();
            (!members.is_empty()).then_some((group, members))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SectionCategory;
    use crate::settings::{SettingKind, settings_map};

    fn ids(visible: &[&SettingDescriptor]) -> Vec<String> {
        visible.iter().map(|d| d.id.clone()).collect()
    }

    fn products() -> SectionSchema {
        SectionSchema::new("featured_products", "Products", SectionCategory::Products)
            .setting(
                SettingDescriptor::new(SettingKind::Select, "product_source", "Source")
                    .with_options([("featured", "Featured"), ("collection", "Collection")])
                    .with_default("featured"),
            )
            .setting(
                SettingDescriptor::new(SettingKind::CollectionPicker, "collection", "Collection")
                    .with_condition(Condition::equals("product_source", "collection")),
            )
            .setting(
                SettingDescriptor::new(SettingKind::Checkbox, "show_view_all", "View all")
                    .with_default(true)
                    .in_group(SettingGroup::Behavior),
            )
            .setting(
                SettingDescriptor::new(SettingKind::Text, "view_all_text", "Label")
                    .with_condition(Condition::equals("show_view_all", true))
                    .in_group(SettingGroup::Behavior),
            )
    }

    #[test]
    fn equals_rule_follows_default_then_override() {
        let schema = products();
        let mut section = SectionInstance::new("featured_products_1", "featured_products");
        assert_eq!(
            ids(&visible_section_settings(&section, &schema)),
            vec!["product_source", "show_view_all", "view_all_text"]
        );

        section.settings.insert("product_source".into(), "collection".into());
        section.settings.insert("show_view_all".into(), false.into());
        assert_eq!(
            ids(&visible_section_settings(&section, &schema)),
            vec!["product_source", "collection", "show_view_all"]
        );
    }

    #[test]
    fn cleared_override_hides_dependents() {
        let schema = products();
        let mut section = SectionInstance::new("p", "featured_products");
        section.settings.insert("show_view_all".into(), SettingValue::Null);
        assert!(!ids(&visible_section_settings(&section, &schema)).contains(&"view_all_text".to_string()));
    }

    #[test]
    fn operator_table() {
        let text = SettingValue::text("grid");
        let n = SettingValue::Number(4.0);
        let empty = SettingValue::text("");
        let null = SettingValue::Null;
        let cases: Vec<(Condition, Option<&SettingValue>, bool)> = vec![
            (Condition::equals("x", "grid"), Some(&text), true),
            (Condition::equals("x", "grid"), None, false),
            (Condition::new("x", ConditionOperator::NotEquals, "list"), Some(&text), true),
            (Condition::new("x", ConditionOperator::NotEquals, "grid"), None, true),
            (Condition::new("x", ConditionOperator::In, vec!["grid", "list"]), Some(&text), true),
            (Condition::new("x", ConditionOperator::In, "grid"), Some(&text), false),
            (Condition::new("x", ConditionOperator::NotIn, vec!["list"]), Some(&text), true),
            (Condition::new("x", ConditionOperator::NotIn, vec!["grid"]), Some(&text), false),
            (Condition::new("x", ConditionOperator::NotIn, "grid"), Some(&text), false),
            (Condition::new("x", ConditionOperator::GreaterThan, 3), Some(&n), true),
            (Condition::new("x", ConditionOperator::GreaterThan, "3"), Some(&n), true),
            (Condition::new("x", ConditionOperator::LessThan, 3), Some(&n), false),
            (Condition::new("x", ConditionOperator::LessThan, 3), Some(&text), false),
            (Condition::exists("x"), Some(&text), true),
            (Condition::exists("x"), Some(&empty), false),
            (Condition::exists("x"), Some(&null), false),
            (Condition::new("x", ConditionOperator::NotExists, SettingValue::Null), None, true),
        ];
        for (condition, current, expected) in cases {
            assert_eq!(
                evaluate(&condition, current),
                expected,
                "{:?} on {:?}",
                condition.operator,
                current
            );
        }
    }

    #[test]
    fn forward_references_see_nothing() {
        let descriptors = vec![
            SettingDescriptor::new(SettingKind::Text, "a", "A")
                .with_condition(Condition::exists("b")),
            SettingDescriptor::new(SettingKind::Text, "b", "B").with_default("set"),
        ];
        let visible = visible_settings(&settings_map([("b", "also set")]), &descriptors);
        assert_eq!(ids(&visible), vec!["b"]);
    }

    #[test]
    fn conditional_headings_are_filtered_too() {
        let descriptors = vec![
            SettingDescriptor::new(SettingKind::Checkbox, "show", "Show").with_default(false),
            SettingDescriptor::heading("Details").with_condition(Condition::equals("show", true)),
        ];
        assert_eq!(visible_settings(&SettingsMap::new(), &descriptors).len(), 1);
        assert_eq!(
            visible_settings(&settings_map([("show", true)]), &descriptors).len(),
            2
        );
    }

    #[test]
    fn groups_follow_panel_order() {
        let schema = products();
        let section = SectionInstance::new("p", "featured_products");
        let visible = visible_section_settings(&section, &schema);
        let groups = group_settings(&visible);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, SettingGroup::Content);
        assert_eq!(ids(&groups[0].1), vec!["product_source"]);
        assert_eq!(groups[1].0, SettingGroup::Behavior);
        assert_eq!(ids(&groups[1].1), vec!["show_view_all", "view_all_text"]);
    }
}
