use std::hash::Hash;
use std::hash::Hasher;

use super::append_diagnostics;
use super::first_invalid_character;
use super::is_null_or_whitespace;
use super::MetadataBuilder;
use crate::checksum::Checksum;
use crate::checksum::ChecksumBuilder;
use crate::diagnostics::codes;
use crate::diagnostics::RazorDiagnostic;
use crate::metadata::MetadataCollection;
use crate::metadata_keys;

const DATA_DASH_PREFIX: &str = "data-";

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BoundAttributeFlags: u16 {
        const CASE_SENSITIVE = 1 << 0;
        const STRING_PROPERTY = 1 << 1;
        const BOOLEAN_PROPERTY = 1 << 2;
        const INDEXER_STRING_PROPERTY = 1 << 3;
        const INDEXER_BOOLEAN_PROPERTY = 1 << 4;
        const ENUM = 1 << 5;
        const EDITOR_REQUIRED = 1 << 6;
        const DIRECTIVE_ATTRIBUTE = 1 << 7;
        const CHILD_CONTENT_PROPERTY = 1 << 8;
        const EVENT_CALLBACK_PROPERTY = 1 << 9;
        const GENERIC_TYPED_PROPERTY = 1 << 10;
        const WEAKLY_TYPED = 1 << 11;
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BoundAttributeParameterFlags: u8 {
        const CASE_SENSITIVE = 1 << 0;
        const STRING_PROPERTY = 1 << 1;
        const BOOLEAN_PROPERTY = 1 << 2;
        const ENUM = 1 << 3;
    }
}

fn is_string_type(type_name: Option<&str>) -> bool {
    matches!(type_name, Some("System.String" | "string"))
}

fn is_boolean_type(type_name: Option<&str>) -> bool {
    matches!(type_name, Some("System.Boolean" | "bool"))
}

/// An attribute a tag helper binds to one of its properties.
///
/// Dictionary-style attributes carry an indexer prefix (`asp-route-`) and bind
/// any attribute name that extends it.
#[derive(Debug, Clone)]
pub struct BoundAttributeDescriptor {
    name: String,
    property_name: Option<String>,
    type_name: Option<String>,
    indexer_name_prefix: Option<String>,
    indexer_type_name: Option<String>,
    display_name: String,
    documentation: Option<String>,
    flags: BoundAttributeFlags,
    parameters: Vec<BoundAttributeParameterDescriptor>,
    metadata: MetadataCollection,
    diagnostics: Vec<RazorDiagnostic>,
    checksum: Checksum,
}

impl BoundAttributeDescriptor {
    /// Attribute name; empty for indexer-only attributes.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    #[must_use]
    pub fn indexer_name_prefix(&self) -> Option<&str> {
        self.indexer_name_prefix.as_deref()
    }

    #[must_use]
    pub fn indexer_type_name(&self) -> Option<&str> {
        self.indexer_type_name.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    #[must_use]
    pub fn flags(&self) -> BoundAttributeFlags {
        self.flags
    }

    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::CASE_SENSITIVE)
    }

    #[must_use]
    pub fn is_string_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::STRING_PROPERTY)
    }

    #[must_use]
    pub fn is_boolean_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::BOOLEAN_PROPERTY)
    }

    #[must_use]
    pub fn is_indexer_string_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::INDEXER_STRING_PROPERTY)
    }

    #[must_use]
    pub fn is_indexer_boolean_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::INDEXER_BOOLEAN_PROPERTY)
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::ENUM)
    }

    #[must_use]
    pub fn is_editor_required(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::EDITOR_REQUIRED)
    }

    #[must_use]
    pub fn is_directive_attribute(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::DIRECTIVE_ATTRIBUTE)
    }

    #[must_use]
    pub fn is_child_content_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::CHILD_CONTENT_PROPERTY)
    }

    #[must_use]
    pub fn is_event_callback_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::EVENT_CALLBACK_PROPERTY)
    }

    #[must_use]
    pub fn is_generic_typed_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::GENERIC_TYPED_PROPERTY)
    }

    #[must_use]
    pub fn is_weakly_typed(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::WEAKLY_TYPED)
    }

    #[must_use]
    pub fn is_type_parameter(&self) -> bool {
        self.metadata.is_true(metadata_keys::TYPE_PARAMETER)
    }

    #[must_use]
    pub fn parameters(&self) -> &[BoundAttributeParameterDescriptor] {
        &self.parameters
    }

    #[must_use]
    pub fn metadata(&self) -> &MetadataCollection {
        &self.metadata
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[RazorDiagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(RazorDiagnostic::is_error)
            || self
                .parameters
                .iter()
                .any(BoundAttributeParameterDescriptor::has_errors)
    }

    #[must_use]
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }
}

impl PartialEq for BoundAttributeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for BoundAttributeDescriptor {}

impl Hash for BoundAttributeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

#[derive(Debug, Default, Clone)]
pub struct BoundAttributeDescriptorBuilder {
    name: Option<String>,
    property_name: Option<String>,
    type_name: Option<String>,
    indexer_name_prefix: Option<String>,
    indexer_type_name: Option<String>,
    display_name: Option<String>,
    documentation: Option<String>,
    flags: BoundAttributeFlags,
    parameters: Vec<BoundAttributeParameterDescriptorBuilder>,
    metadata: MetadataBuilder,
}

impl BoundAttributeDescriptorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn property_name(mut self, property_name: impl Into<String>) -> Self {
        self.property_name = Some(property_name.into());
        self
    }

    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Make this a dictionary attribute binding every name that starts with `prefix`.
    #[must_use]
    pub fn as_dictionary(mut self, prefix: impl Into<String>, value_type_name: impl Into<String>) -> Self {
        self.indexer_name_prefix = Some(prefix.into());
        self.indexer_type_name = Some(value_type_name.into());
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    #[must_use]
    pub fn is_enum(mut self, value: bool) -> Self {
        self.flags.set(BoundAttributeFlags::ENUM, value);
        self
    }

    #[must_use]
    pub fn editor_required(mut self, value: bool) -> Self {
        self.flags.set(BoundAttributeFlags::EDITOR_REQUIRED, value);
        self
    }

    #[must_use]
    pub fn directive_attribute(mut self, value: bool) -> Self {
        self.flags.set(BoundAttributeFlags::DIRECTIVE_ATTRIBUTE, value);
        self
    }

    #[must_use]
    pub fn child_content_property(mut self, value: bool) -> Self {
        self.flags.set(BoundAttributeFlags::CHILD_CONTENT_PROPERTY, value);
        self
    }

    #[must_use]
    pub fn event_callback_property(mut self, value: bool) -> Self {
        self.flags.set(BoundAttributeFlags::EVENT_CALLBACK_PROPERTY, value);
        self
    }

    #[must_use]
    pub fn generic_typed_property(mut self, value: bool) -> Self {
        self.flags.set(BoundAttributeFlags::GENERIC_TYPED_PROPERTY, value);
        self
    }

    #[must_use]
    pub fn weakly_typed(mut self, value: bool) -> Self {
        self.flags.set(BoundAttributeFlags::WEAKLY_TYPED, value);
        self
    }

    #[must_use]
    pub fn parameter(
        mut self,
        configure: impl FnOnce(BoundAttributeParameterDescriptorBuilder) -> BoundAttributeParameterDescriptorBuilder,
    ) -> Self {
        self.parameters
            .push(configure(BoundAttributeParameterDescriptorBuilder::new()));
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    fn validate(&self, tag_helper: &str, directive: bool) -> Vec<RazorDiagnostic> {
        let mut diagnostics = Vec::new();
        let property = self.property_name.as_deref().unwrap_or_default();

        match self.name.as_deref() {
            None if self.indexer_name_prefix.is_some() => {}
            name if is_null_or_whitespace(name) => {
                diagnostics.push(codes::invalid_bound_attribute_name(
                    tag_helper,
                    property,
                    name.unwrap_or_default(),
                    "the name cannot be null or whitespace",
                ));
            }
            Some(name) => {
                if !directive && starts_with_ignore_ascii_case(name, DATA_DASH_PREFIX) {
                    diagnostics.push(codes::invalid_bound_attribute_name(
                        tag_helper,
                        property,
                        name,
                        "the name starts with 'data-'",
                    ));
                } else if let Some(character) = first_invalid_character(name, directive) {
                    diagnostics.push(codes::invalid_bound_attribute_name(
                        tag_helper,
                        property,
                        name,
                        &format!("the name contains a '{character}' character"),
                    ));
                }
            }
            None => {}
        }

        if let Some(prefix) = self.indexer_name_prefix.as_deref() {
            if !directive && starts_with_ignore_ascii_case(prefix, DATA_DASH_PREFIX) {
                diagnostics.push(codes::invalid_bound_attribute_name(
                    tag_helper,
                    property,
                    prefix,
                    "the prefix starts with 'data-'",
                ));
            } else if let Some(character) = first_invalid_character(prefix, directive) {
                diagnostics.push(codes::invalid_bound_attribute_name(
                    tag_helper,
                    property,
                    prefix,
                    &format!("the prefix contains a '{character}' character"),
                ));
            }
        }

        diagnostics
    }

    pub(crate) fn build(mut self, tag_helper: &str, case_sensitive: bool) -> BoundAttributeDescriptor {
        let directive = self.flags.contains(BoundAttributeFlags::DIRECTIVE_ATTRIBUTE);
        let diagnostics = self.validate(tag_helper, directive);

        self.flags.set(BoundAttributeFlags::CASE_SENSITIVE, case_sensitive);
        self.flags.set(
            BoundAttributeFlags::STRING_PROPERTY,
            is_string_type(self.type_name.as_deref()),
        );
        self.flags.set(
            BoundAttributeFlags::BOOLEAN_PROPERTY,
            is_boolean_type(self.type_name.as_deref()),
        );
        self.flags.set(
            BoundAttributeFlags::INDEXER_STRING_PROPERTY,
            is_string_type(self.indexer_type_name.as_deref()),
        );
        self.flags.set(
            BoundAttributeFlags::INDEXER_BOOLEAN_PROPERTY,
            is_boolean_type(self.indexer_type_name.as_deref()),
        );

        let name = self.name.unwrap_or_default();
        let display_name = self.display_name.unwrap_or_else(|| {
            let type_name = self.type_name.as_deref().unwrap_or("object");
            match self.property_name.as_deref() {
                Some(property) => format!("{type_name} {tag_helper}.{property}"),
                None => name.clone(),
            }
        });
        let parameters: Vec<_> = self
            .parameters
            .into_iter()
            .map(|parameter| parameter.build(tag_helper, case_sensitive))
            .collect();
        let metadata = self.metadata.build();

        let mut checksum = ChecksumBuilder::new();
        checksum
            .append_str(&name)
            .append_opt_str(self.property_name.as_deref())
            .append_opt_str(self.type_name.as_deref())
            .append_opt_str(self.indexer_name_prefix.as_deref())
            .append_opt_str(self.indexer_type_name.as_deref())
            .append_str(&display_name)
            .append_opt_str(self.documentation.as_deref())
            .append_u32(u32::from(self.flags.bits()))
            .append_len(parameters.len());
        for parameter in &parameters {
            checksum.append_checksum(parameter.checksum());
        }
        checksum.append_checksum(metadata.checksum());
        append_diagnostics(&mut checksum, &diagnostics);

        BoundAttributeDescriptor {
            name,
            property_name: self.property_name,
            type_name: self.type_name,
            indexer_name_prefix: self.indexer_name_prefix,
            indexer_type_name: self.indexer_type_name,
            display_name,
            documentation: self.documentation,
            flags: self.flags,
            parameters,
            metadata,
            diagnostics,
            checksum: checksum.finish(),
        }
    }
}

fn starts_with_ignore_ascii_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// A `:parameter` of a directive attribute, such as the `format` in `@bind:format`.
#[derive(Debug, Clone)]
pub struct BoundAttributeParameterDescriptor {
    name: String,
    type_name: Option<String>,
    property_name: Option<String>,
    display_name: String,
    documentation: Option<String>,
    flags: BoundAttributeParameterFlags,
    metadata: MetadataCollection,
    diagnostics: Vec<RazorDiagnostic>,
    checksum: Checksum,
}

impl BoundAttributeParameterDescriptor {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    #[must_use]
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    #[must_use]
    pub fn flags(&self) -> BoundAttributeParameterFlags {
        self.flags
    }

    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.flags.contains(BoundAttributeParameterFlags::CASE_SENSITIVE)
    }

    #[must_use]
    pub fn is_boolean_property(&self) -> bool {
        self.flags.contains(BoundAttributeParameterFlags::BOOLEAN_PROPERTY)
    }

    #[must_use]
    pub fn metadata(&self) -> &MetadataCollection {
        &self.metadata
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[RazorDiagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(RazorDiagnostic::is_error)
    }

    #[must_use]
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }
}

impl PartialEq for BoundAttributeParameterDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for BoundAttributeParameterDescriptor {}

impl Hash for BoundAttributeParameterDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

#[derive(Debug, Default, Clone)]
pub struct BoundAttributeParameterDescriptorBuilder {
    name: Option<String>,
    type_name: Option<String>,
    property_name: Option<String>,
    display_name: Option<String>,
    documentation: Option<String>,
    is_enum: bool,
    metadata: MetadataBuilder,
}

impl BoundAttributeParameterDescriptorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn property_name(mut self, property_name: impl Into<String>) -> Self {
        self.property_name = Some(property_name.into());
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    #[must_use]
    pub fn is_enum(mut self, value: bool) -> Self {
        self.is_enum = value;
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    fn build(self, tag_helper: &str, case_sensitive: bool) -> BoundAttributeParameterDescriptor {
        let mut diagnostics = Vec::new();
        let property = self.property_name.as_deref().unwrap_or_default();
        if is_null_or_whitespace(self.name.as_deref()) {
            diagnostics.push(codes::invalid_bound_attribute_name(
                tag_helper,
                property,
                "",
                "the parameter name cannot be null or whitespace",
            ));
        } else if let Some(name) = self.name.as_deref() {
            if let Some(character) = first_invalid_character(name, false) {
                diagnostics.push(codes::invalid_bound_attribute_name(
                    tag_helper,
                    property,
                    name,
                    &format!("the parameter name contains a '{character}' character"),
                ));
            }
        }

        let mut flags = BoundAttributeParameterFlags::empty();
        flags.set(BoundAttributeParameterFlags::CASE_SENSITIVE, case_sensitive);
        flags.set(
            BoundAttributeParameterFlags::STRING_PROPERTY,
            is_string_type(self.type_name.as_deref()),
        );
        flags.set(
            BoundAttributeParameterFlags::BOOLEAN_PROPERTY,
            is_boolean_type(self.type_name.as_deref()),
        );
        flags.set(BoundAttributeParameterFlags::ENUM, self.is_enum);

        let name = self.name.unwrap_or_default();
        let display_name = self.display_name.unwrap_or_else(|| format!(":{name}"));
        let metadata = self.metadata.build();

        let mut checksum = ChecksumBuilder::new();
        checksum
            .append_str(&name)
            .append_opt_str(self.type_name.as_deref())
            .append_opt_str(self.property_name.as_deref())
            .append_str(&display_name)
            .append_opt_str(self.documentation.as_deref())
            .append_u32(u32::from(flags.bits()))
            .append_checksum(metadata.checksum());
        append_diagnostics(&mut checksum, &diagnostics);

        BoundAttributeParameterDescriptor {
            name,
            type_name: self.type_name,
            property_name: self.property_name,
            display_name,
            documentation: self.documentation,
            flags,
            metadata,
            diagnostics,
            checksum: checksum.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(
        configure: impl FnOnce(BoundAttributeDescriptorBuilder) -> BoundAttributeDescriptorBuilder,
    ) -> BoundAttributeDescriptor {
        configure(BoundAttributeDescriptorBuilder::new()).build("TestTagHelper", false)
    }

    #[test]
    fn test_type_flags_are_derived() {
        let attribute = build(|a| {
            a.name("bound-bool")
                .property_name("BoundBool")
                .type_name("System.Boolean")
                .as_dictionary("bool-prefix-", "System.String")
        });
        assert!(attribute.is_boolean_property());
        assert!(!attribute.is_string_property());
        assert!(attribute.is_indexer_string_property());
        assert!(!attribute.is_indexer_boolean_property());
        assert_eq!(attribute.display_name(), "System.Boolean TestTagHelper.BoundBool");
    }

    #[test]
    fn test_data_dash_names_are_reserved() {
        let attribute = build(|a| a.name("data-value").property_name("Value"));
        assert_eq!(attribute.diagnostics()[0].id(), codes::INVALID_BOUND_ATTRIBUTE_NAME);
        assert!(attribute.diagnostics()[0].message().contains("data-"));

        let prefix = build(|a| a.name("values").as_dictionary("DATA-", "System.String"));
        assert!(prefix.has_errors());
    }

    #[test]
    fn test_indexer_only_attribute_needs_no_name() {
        let attribute = build(|a| a.property_name("RouteValues").as_dictionary("asp-route-", "System.String"));
        assert!(!attribute.has_errors());
        assert_eq!(attribute.name(), "");
    }

    #[test]
    fn test_directive_attribute_allows_leading_at() {
        let attribute = build(|a| {
            a.name("@bind")
                .directive_attribute(true)
                .parameter(|p| p.name("format").type_name("System.String"))
        });
        assert!(!attribute.has_errors());
        assert_eq!(attribute.parameters()[0].display_name(), ":format");

        let plain = build(|a| a.name("@bind"));
        assert!(plain.has_errors());
    }

    #[test]
    fn test_parameter_errors_propagate() {
        let attribute = build(|a| {
            a.name("@bind")
                .directive_attribute(true)
                .parameter(|p| p.name("for mat"))
        });
        assert!(attribute.diagnostics().is_empty());
        assert!(attribute.has_errors());
    }

    #[test]
    fn test_type_parameter_metadata() {
        let attribute = build(|a| {
            a.name("TItem")
                .metadata(metadata_keys::TYPE_PARAMETER, Some("True".to_string()))
        });
        assert!(attribute.is_type_parameter());
    }
}
