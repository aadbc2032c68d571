//! Matching rules shared by binding and completion.
//!
//! Case-insensitive comparisons fold ASCII only.

use crate::descriptors::BoundAttributeDescriptor;
use crate::descriptors::BoundAttributeParameterDescriptor;
use crate::descriptors::NameComparison;
use crate::descriptors::RequiredAttributeDescriptor;
use crate::descriptors::TagMatchingRuleDescriptor;
use crate::descriptors::ValueComparison;
use crate::descriptors::OPT_OUT_CHARACTER;

/// Separates a directive attribute from its parameter (`@bind:format`).
const PARAMETER_SEPARATOR: char = ':';

pub(crate) fn names_equal(left: &str, right: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        left == right
    } else {
        left.eq_ignore_ascii_case(right)
    }
}

pub(crate) fn starts_with(value: &str, prefix: &str, case_sensitive: bool) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| names_equal(head, prefix, case_sensitive))
}

/// Strip `prefix` from `value` ignoring ASCII case.
pub(crate) fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    if starts_with(value, prefix, false) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

#[must_use]
pub fn satisfies_tag_name(rule: &TagMatchingRuleDescriptor, tag_name_without_prefix: &str) -> bool {
    if tag_name_without_prefix.is_empty() || tag_name_without_prefix.starts_with(OPT_OUT_CHARACTER) {
        return false;
    }

    rule.is_catch_all() || names_equal(rule.tag_name(), tag_name_without_prefix, rule.case_sensitive())
}

/// A rule without a parent requirement matches any parent, including the
/// document root (`None`).
#[must_use]
pub fn satisfies_parent_tag(rule: &TagMatchingRuleDescriptor, parent_tag_name: Option<&str>) -> bool {
    match rule.parent_tag() {
        None => true,
        Some(required) => {
            parent_tag_name.is_some_and(|parent| names_equal(required, parent, rule.case_sensitive()))
        }
    }
}

/// Every required attribute must be matched by one of `attributes`.
#[must_use]
pub fn satisfies_attributes(rule: &TagMatchingRuleDescriptor, attributes: &[(String, String)]) -> bool {
    rule.attributes().iter().all(|required| {
        attributes
            .iter()
            .any(|(name, value)| satisfies_required_attribute(required, name, value))
    })
}

#[must_use]
pub fn satisfies_required_attribute(
    required: &RequiredAttributeDescriptor,
    attribute_name: &str,
    attribute_value: &str,
) -> bool {
    let case_sensitive = required.case_sensitive();
    let name_matches = match required.name_comparison() {
        NameComparison::FullMatch => names_equal(attribute_name, required.name(), case_sensitive),
        NameComparison::PrefixMatch => {
            attribute_name.len() > required.name().len()
                && starts_with(attribute_name, required.name(), case_sensitive)
        }
    };
    if !name_matches {
        return false;
    }

    let expected = required.value().unwrap_or_default();
    match required.value_comparison() {
        ValueComparison::None => true,
        ValueComparison::FullMatch => attribute_value == expected,
        ValueComparison::PrefixMatch => attribute_value.starts_with(expected),
        ValueComparison::SuffixMatch => attribute_value.ends_with(expected),
    }
}

#[must_use]
pub fn satisfies_rule(
    rule: &TagMatchingRuleDescriptor,
    tag_name_without_prefix: &str,
    parent_tag_name_without_prefix: Option<&str>,
    attributes: &[(String, String)],
) -> bool {
    satisfies_tag_name(rule, tag_name_without_prefix)
        && satisfies_parent_tag(rule, parent_tag_name_without_prefix)
        && satisfies_attributes(rule, attributes)
}

/// Whether `name` refers to `attribute` by its own name, its indexer prefix or one
/// of its parameters.
#[must_use]
pub fn can_satisfy_bound_attribute(name: &str, attribute: &BoundAttributeDescriptor) -> bool {
    satisfies_bound_attribute_name(name, attribute)
        || satisfies_bound_attribute_indexer(name, attribute)
        || attribute
            .parameters()
            .iter()
            .any(|parameter| can_satisfy_bound_attribute_parameter(name, attribute, parameter))
}

#[must_use]
pub fn satisfies_bound_attribute_name(name: &str, attribute: &BoundAttributeDescriptor) -> bool {
    if attribute.name().is_empty() {
        return false;
    }

    let name = if attribute.is_directive_attribute() {
        split_parameter(name).map_or(name, |(base, _)| base)
    } else {
        name
    };
    names_equal(name, attribute.name(), attribute.case_sensitive())
}

#[must_use]
pub fn satisfies_bound_attribute_indexer(name: &str, attribute: &BoundAttributeDescriptor) -> bool {
    attribute.indexer_name_prefix().is_some_and(|prefix| {
        !satisfies_bound_attribute_name(name, attribute)
            && starts_with(name, prefix, attribute.case_sensitive())
    })
}

/// Match `name:parameter` against a directive attribute's parameter.
#[must_use]
pub fn can_satisfy_bound_attribute_parameter(
    name: &str,
    attribute: &BoundAttributeDescriptor,
    parameter: &BoundAttributeParameterDescriptor,
) -> bool {
    let Some((base, parameter_name)) = split_parameter(name) else {
        return false;
    };

    names_equal(base, attribute.name(), attribute.case_sensitive())
        && names_equal(parameter_name, parameter.name(), parameter.case_sensitive())
}

fn split_parameter(name: &str) -> Option<(&str, &str)> {
    name.split_once(PARAMETER_SEPARATOR)
        .filter(|(base, _)| !base.is_empty())
}

#[must_use]
pub fn is_directive_attribute(attribute: &BoundAttributeDescriptor) -> bool {
    attribute.is_directive_attribute()
}

/// Whether `name` binds a boolean value on `attribute`.
#[must_use]
pub fn is_boolean_property(name: &str, attribute: &BoundAttributeDescriptor) -> bool {
    if satisfies_bound_attribute_indexer(name, attribute) {
        attribute.is_indexer_boolean_property()
    } else {
        attribute.is_boolean_property()
    }
}

#[must_use]
pub fn is_indexer_boolean_property(attribute: &BoundAttributeDescriptor) -> bool {
    attribute.is_indexer_boolean_property()
}
