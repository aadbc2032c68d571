//! Immutable tag helper descriptors and the builders that produce them.
//!
//! Descriptors are built once, validated while building (problems become
//! [`RazorDiagnostic`](crate::RazorDiagnostic)s instead of failures) and then
//! shared by value. Each carries a checksum over all of its fields which backs
//! `PartialEq` and `Hash`.

mod allowed_child;
mod bound_attribute;
mod required_attribute;
mod rule;
mod tag_helper;

use std::collections::BTreeMap;

pub use allowed_child::AllowedChildTagDescriptor;
pub use allowed_child::AllowedChildTagDescriptorBuilder;
pub use bound_attribute::BoundAttributeDescriptor;
pub use bound_attribute::BoundAttributeDescriptorBuilder;
pub use bound_attribute::BoundAttributeFlags;
pub use bound_attribute::BoundAttributeParameterDescriptor;
pub use bound_attribute::BoundAttributeParameterDescriptorBuilder;
pub use bound_attribute::BoundAttributeParameterFlags;
pub use required_attribute::NameComparison;
pub use required_attribute::RequiredAttributeDescriptor;
pub use required_attribute::RequiredAttributeDescriptorBuilder;
pub use required_attribute::ValueComparison;
pub use rule::TagMatchingRuleDescriptor;
pub use rule::TagMatchingRuleDescriptorBuilder;
pub use rule::TagStructure;
pub use tag_helper::RuntimeKind;
pub use tag_helper::TagHelperDescriptor;
pub use tag_helper::TagHelperDescriptorBuilder;
pub use tag_helper::TagHelperFlags;
pub use tag_helper::TagHelperKind;

use crate::checksum::ChecksumBuilder;
use crate::diagnostics::RazorDiagnostic;
use crate::metadata::MetadataCollection;

/// Tag name that matches every element.
pub const CATCH_ALL_TAG_NAME: &str = "*";

/// Leading character that opts an element out of tag helper processing.
pub const OPT_OUT_CHARACTER: char = '!';

/// Characters no tag, attribute or child name may contain (besides whitespace).
const INVALID_NAME_CHARACTERS: &[char] = &['@', '!', '<', '/', '?', '[', '>', ']', '=', '"', '\'', '*'];

fn is_null_or_whitespace(name: Option<&str>) -> bool {
    name.is_none_or(|name| name.trim().is_empty())
}

/// First character of `name` that is not allowed in a target name.
///
/// A leading `@` is skipped for directive attributes.
fn first_invalid_character(name: &str, allow_leading_at: bool) -> Option<char> {
    let name = if allow_leading_at {
        name.strip_prefix('@').unwrap_or(name)
    } else {
        name
    };
    name.chars()
        .find(|c| c.is_whitespace() || INVALID_NAME_CHARACTERS.contains(c))
}

/// Key/value pairs collected by a builder; later writes to a key win.
#[derive(Debug, Default, Clone)]
struct MetadataBuilder(BTreeMap<String, Option<String>>);

impl MetadataBuilder {
    fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.insert(key.into(), value);
    }

    fn build(self) -> MetadataCollection {
        MetadataCollection::from_sorted_unique(self.0.into_iter().collect())
    }
}

fn append_diagnostics(builder: &mut ChecksumBuilder, diagnostics: &[RazorDiagnostic]) {
    builder.append_len(diagnostics.len());
    for diagnostic in diagnostics {
        diagnostic.append_to(builder);
    }
}
