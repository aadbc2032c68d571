use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use super::append_diagnostics;
use super::AllowedChildTagDescriptor;
use super::AllowedChildTagDescriptorBuilder;
use super::BoundAttributeDescriptor;
use super::BoundAttributeDescriptorBuilder;
use super::MetadataBuilder;
use super::TagMatchingRuleDescriptor;
use super::TagMatchingRuleDescriptorBuilder;
use crate::checksum::Checksum;
use crate::checksum::ChecksumBuilder;
use crate::diagnostics::RazorDiagnostic;
use crate::metadata::MetadataCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagHelperKind {
    /// A classic tag helper class.
    TagHelper,
    Component,
    ChildContent,
    EventHandler,
    Bind,
    Key,
    Ref,
    Splat,
    FormName,
    RenderMode,
}

impl TagHelperKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TagHelperKind::TagHelper => "tag-helper",
            TagHelperKind::Component => "component",
            TagHelperKind::ChildContent => "child-content",
            TagHelperKind::EventHandler => "event-handler",
            TagHelperKind::Bind => "bind",
            TagHelperKind::Key => "key",
            TagHelperKind::Ref => "ref",
            TagHelperKind::Splat => "splat",
            TagHelperKind::FormName => "form-name",
            TagHelperKind::RenderMode => "render-mode",
        }
    }

    fn default_runtime_kind(self) -> RuntimeKind {
        match self {
            TagHelperKind::TagHelper => RuntimeKind::TagHelper,
            TagHelperKind::Component | TagHelperKind::ChildContent => RuntimeKind::Component,
            _ => RuntimeKind::None,
        }
    }
}

impl fmt::Display for TagHelperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeKind {
    TagHelper,
    Component,
    None,
}

impl RuntimeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeKind::TagHelper => "tag-helper",
            RuntimeKind::Component => "component",
            RuntimeKind::None => "none",
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TagHelperFlags: u8 {
        const CASE_SENSITIVE = 1 << 0;
        /// Only matches when the element is written with the full type name.
        const FULLY_QUALIFIED_NAME_MATCH = 1 << 1;
        /// Binds attributes without taking over the element.
        const CLASSIFY_ATTRIBUTES_ONLY = 1 << 2;
        const CHILD_CONTENT = 1 << 3;
        const GENERIC_TYPED = 1 << 4;
    }
}

/// Metadata describing how a tag helper binds to tags and attributes.
#[derive(Clone)]
pub struct TagHelperDescriptor {
    kind: TagHelperKind,
    runtime_kind: RuntimeKind,
    name: String,
    assembly_name: String,
    display_name: String,
    type_name: Option<String>,
    type_namespace: Option<String>,
    type_name_identifier: Option<String>,
    documentation: Option<String>,
    tag_output_hint: Option<String>,
    flags: TagHelperFlags,
    tag_matching_rules: Vec<TagMatchingRuleDescriptor>,
    bound_attributes: Vec<BoundAttributeDescriptor>,
    allowed_child_tags: Vec<AllowedChildTagDescriptor>,
    metadata: MetadataCollection,
    diagnostics: Vec<RazorDiagnostic>,
    checksum: Checksum,
}

impl TagHelperDescriptor {
    #[must_use]
    pub fn kind(&self) -> TagHelperKind {
        self.kind
    }

    #[must_use]
    pub fn runtime_kind(&self) -> RuntimeKind {
        self.runtime_kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    #[must_use]
    pub fn type_namespace(&self) -> Option<&str> {
        self.type_namespace.as_deref()
    }

    #[must_use]
    pub fn type_name_identifier(&self) -> Option<&str> {
        self.type_name_identifier.as_deref()
    }

    #[must_use]
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Tag the helper renders in place of the matched element, if known.
    #[must_use]
    pub fn tag_output_hint(&self) -> Option<&str> {
        self.tag_output_hint.as_deref()
    }

    #[must_use]
    pub fn flags(&self) -> TagHelperFlags {
        self.flags
    }

    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.flags.contains(TagHelperFlags::CASE_SENSITIVE)
    }

    #[must_use]
    pub fn is_fully_qualified_name_match(&self) -> bool {
        self.flags.contains(TagHelperFlags::FULLY_QUALIFIED_NAME_MATCH)
    }

    #[must_use]
    pub fn classify_attributes_only(&self) -> bool {
        self.flags.contains(TagHelperFlags::CLASSIFY_ATTRIBUTES_ONLY)
    }

    #[must_use]
    pub fn is_child_content(&self) -> bool {
        self.flags.contains(TagHelperFlags::CHILD_CONTENT)
    }

    #[must_use]
    pub fn is_generic_typed(&self) -> bool {
        self.flags.contains(TagHelperFlags::GENERIC_TYPED)
    }

    #[must_use]
    pub fn is_component(&self) -> bool {
        self.kind == TagHelperKind::Component
    }

    #[must_use]
    pub fn tag_matching_rules(&self) -> &[TagMatchingRuleDescriptor] {
        &self.tag_matching_rules
    }

    #[must_use]
    pub fn bound_attributes(&self) -> &[BoundAttributeDescriptor] {
        &self.bound_attributes
    }

    #[must_use]
    pub fn allowed_child_tags(&self) -> &[AllowedChildTagDescriptor] {
        &self.allowed_child_tags
    }

    #[must_use]
    pub fn metadata(&self) -> &MetadataCollection {
        &self.metadata
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[RazorDiagnostic] {
        &self.diagnostics
    }

    /// Whether this descriptor or anything nested in it carries an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(RazorDiagnostic::is_error)
            || self
                .tag_matching_rules
                .iter()
                .any(TagMatchingRuleDescriptor::has_errors)
            || self
                .bound_attributes
                .iter()
                .any(BoundAttributeDescriptor::has_errors)
            || self
                .allowed_child_tags
                .iter()
                .any(AllowedChildTagDescriptor::has_errors)
    }

    /// Every diagnostic on this descriptor and its nested descriptors.
    #[must_use]
    pub fn all_diagnostics(&self) -> Vec<&RazorDiagnostic> {
        let mut diagnostics: Vec<&RazorDiagnostic> = self.diagnostics.iter().collect();
        for rule in &self.tag_matching_rules {
            diagnostics.extend(rule.diagnostics());
            for attribute in rule.attributes() {
                diagnostics.extend(attribute.diagnostics());
            }
        }
        for attribute in &self.bound_attributes {
            diagnostics.extend(attribute.diagnostics());
            for parameter in attribute.parameters() {
                diagnostics.extend(parameter.diagnostics());
            }
        }
        for child in &self.allowed_child_tags {
            diagnostics.extend(child.diagnostics());
        }
        diagnostics
    }

    #[must_use]
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }
}

impl PartialEq for TagHelperDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for TagHelperDescriptor {}

impl Hash for TagHelperDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

impl fmt::Debug for TagHelperDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagHelperDescriptor")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("assembly_name", &self.assembly_name)
            .field("checksum", &self.checksum)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct TagHelperDescriptorBuilder {
    kind: TagHelperKind,
    runtime_kind: RuntimeKind,
    name: String,
    assembly_name: String,
    display_name: Option<String>,
    type_name: Option<String>,
    type_namespace: Option<String>,
    type_name_identifier: Option<String>,
    documentation: Option<String>,
    tag_output_hint: Option<String>,
    flags: TagHelperFlags,
    tag_matching_rules: Vec<TagMatchingRuleDescriptorBuilder>,
    bound_attributes: Vec<BoundAttributeDescriptorBuilder>,
    allowed_child_tags: Vec<AllowedChildTagDescriptorBuilder>,
    metadata: MetadataBuilder,
    diagnostics: Vec<RazorDiagnostic>,
}

impl TagHelperDescriptorBuilder {
    #[must_use]
    pub fn new(kind: TagHelperKind, name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        Self {
            kind,
            runtime_kind: kind.default_runtime_kind(),
            name: name.into(),
            assembly_name: assembly_name.into(),
            display_name: None,
            type_name: None,
            type_namespace: None,
            type_name_identifier: None,
            documentation: None,
            tag_output_hint: None,
            flags: TagHelperFlags::empty(),
            tag_matching_rules: Vec::new(),
            bound_attributes: Vec::new(),
            allowed_child_tags: Vec::new(),
            metadata: MetadataBuilder::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Start a classic tag helper whose name is its type name.
    #[must_use]
    pub fn tag_helper(type_name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::new(TagHelperKind::TagHelper, type_name.clone(), assembly_name).type_name(type_name)
    }

    #[must_use]
    pub fn runtime_kind(mut self, runtime_kind: RuntimeKind) -> Self {
        self.runtime_kind = runtime_kind;
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the full type name; namespace and identifier are derived from it
    /// unless set explicitly.
    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn type_namespace(mut self, type_namespace: impl Into<String>) -> Self {
        self.type_namespace = Some(type_namespace.into());
        self
    }

    #[must_use]
    pub fn type_name_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.type_name_identifier = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    #[must_use]
    pub fn tag_output_hint(mut self, hint: impl Into<String>) -> Self {
        self.tag_output_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.flags.set(TagHelperFlags::CASE_SENSITIVE, value);
        self
    }

    #[must_use]
    pub fn fully_qualified_name_match(mut self, value: bool) -> Self {
        self.flags.set(TagHelperFlags::FULLY_QUALIFIED_NAME_MATCH, value);
        self
    }

    #[must_use]
    pub fn classify_attributes_only(mut self, value: bool) -> Self {
        self.flags.set(TagHelperFlags::CLASSIFY_ATTRIBUTES_ONLY, value);
        self
    }

    #[must_use]
    pub fn child_content(mut self, value: bool) -> Self {
        self.flags.set(TagHelperFlags::CHILD_CONTENT, value);
        self
    }

    #[must_use]
    pub fn generic_typed(mut self, value: bool) -> Self {
        self.flags.set(TagHelperFlags::GENERIC_TYPED, value);
        self
    }

    #[must_use]
    pub fn tag_matching_rule(
        mut self,
        configure: impl FnOnce(TagMatchingRuleDescriptorBuilder) -> TagMatchingRuleDescriptorBuilder,
    ) -> Self {
        self.tag_matching_rules
            .push(configure(TagMatchingRuleDescriptorBuilder::new()));
        self
    }

    #[must_use]
    pub fn bound_attribute(
        mut self,
        configure: impl FnOnce(BoundAttributeDescriptorBuilder) -> BoundAttributeDescriptorBuilder,
    ) -> Self {
        self.bound_attributes
            .push(configure(BoundAttributeDescriptorBuilder::new()));
        self
    }

    #[must_use]
    pub fn allowed_child_tag(
        mut self,
        configure: impl FnOnce(AllowedChildTagDescriptorBuilder) -> AllowedChildTagDescriptorBuilder,
    ) -> Self {
        self.allowed_child_tags
            .push(configure(AllowedChildTagDescriptorBuilder::new()));
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    #[must_use]
    pub fn diagnostic(mut self, diagnostic: RazorDiagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    #[must_use]
    pub fn build(self) -> TagHelperDescriptor {
        let case_sensitive = self.flags.contains(TagHelperFlags::CASE_SENSITIVE);
        let display_name = self
            .display_name
            .or_else(|| self.type_name.clone())
            .unwrap_or_else(|| self.name.clone());
        let (derived_namespace, derived_identifier) = match self.type_name.as_deref() {
            Some(type_name) => match type_name.rsplit_once('.') {
                Some((namespace, identifier)) => {
                    (Some(namespace.to_string()), Some(identifier.to_string()))
                }
                None => (None, Some(type_name.to_string())),
            },
            None => (None, None),
        };
        let type_namespace = self.type_namespace.or(derived_namespace);
        let type_name_identifier = self.type_name_identifier.or(derived_identifier);

        let tag_matching_rules: Vec<_> = self
            .tag_matching_rules
            .into_iter()
            .map(|rule| rule.build(case_sensitive))
            .collect();
        let bound_attributes: Vec<_> = self
            .bound_attributes
            .into_iter()
            .map(|attribute| attribute.build(&self.name, case_sensitive))
            .collect();
        let allowed_child_tags: Vec<_> = self
            .allowed_child_tags
            .into_iter()
            .map(|child| child.build(&self.name))
            .collect();
        let metadata = self.metadata.build();

        let mut checksum = ChecksumBuilder::new();
        checksum
            .append_str(self.kind.as_str())
            .append_str(self.runtime_kind.as_str())
            .append_str(&self.name)
            .append_str(&self.assembly_name)
            .append_str(&display_name)
            .append_opt_str(self.type_name.as_deref())
            .append_opt_str(type_namespace.as_deref())
            .append_opt_str(type_name_identifier.as_deref())
            .append_opt_str(self.documentation.as_deref())
            .append_opt_str(self.tag_output_hint.as_deref())
            .append_u32(u32::from(self.flags.bits()));
        checksum.append_len(tag_matching_rules.len());
        for rule in &tag_matching_rules {
            checksum.append_checksum(rule.checksum());
        }
        checksum.append_len(bound_attributes.len());
        for attribute in &bound_attributes {
            checksum.append_checksum(attribute.checksum());
        }
        checksum.append_len(allowed_child_tags.len());
        for child in &allowed_child_tags {
            checksum.append_checksum(child.checksum());
        }
        checksum.append_checksum(metadata.checksum());
        append_diagnostics(&mut checksum, &self.diagnostics);

        TagHelperDescriptor {
            kind: self.kind,
            runtime_kind: self.runtime_kind,
            name: self.name,
            assembly_name: self.assembly_name,
            display_name,
            type_name: self.type_name,
            type_namespace,
            type_name_identifier,
            documentation: self.documentation,
            tag_output_hint: self.tag_output_hint,
            flags: self.flags,
            tag_matching_rules,
            bound_attributes,
            allowed_child_tags,
            metadata,
            diagnostics: self.diagnostics,
            checksum: checksum.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::codes;

    fn anchor_helper() -> TagHelperDescriptorBuilder {
        TagHelperDescriptorBuilder::tag_helper("Microsoft.AspNetCore.Mvc.TagHelpers.AnchorTagHelper", "Microsoft.AspNetCore.Mvc.TagHelpers")
            .tag_matching_rule(|rule| rule.tag_name("a").require_attribute(|a| a.name("asp-action")))
            .tag_matching_rule(|rule| rule.tag_name("a").require_attribute(|a| a.name("asp-controller")))
            .bound_attribute(|a| a.name("asp-action").property_name("Action").type_name("System.String"))
            .bound_attribute(|a| {
                a.name("asp-all-route-data")
                    .property_name("RouteValues")
                    .type_name("System.Collections.Generic.IDictionary<System.String, System.String>")
                    .as_dictionary("asp-route-", "System.String")
            })
    }

    #[test]
    fn test_independent_builds_are_equal() {
        let first = anchor_helper().build();
        let second = anchor_helper().build();
        assert_eq!(first, second);
        assert_eq!(first.checksum(), second.checksum());
    }

    #[test]
    fn test_metadata_order_does_not_change_checksum() {
        let first = anchor_helper()
            .metadata("a", Some("1".to_string()))
            .metadata("b", None)
            .build();
        let second = anchor_helper()
            .metadata("b", None)
            .metadata("a", Some("1".to_string()))
            .build();
        assert_eq!(first, second);
    }

    #[test]
    fn test_any_field_changes_checksum() {
        let base = anchor_helper().build();
        assert_ne!(base, anchor_helper().tag_output_hint("a").build());
        assert_ne!(base, anchor_helper().case_sensitive(true).build());
        assert_ne!(base, anchor_helper().documentation("docs").build());
        assert_ne!(
            base,
            anchor_helper()
                .allowed_child_tag(|child| child.name("span"))
                .build()
        );
    }

    #[test]
    fn test_rule_order_changes_checksum() {
        let forward = TagHelperDescriptorBuilder::tag_helper("T", "A")
            .tag_matching_rule(|rule| rule.tag_name("a"))
            .tag_matching_rule(|rule| rule.tag_name("b"))
            .build();
        let reversed = TagHelperDescriptorBuilder::tag_helper("T", "A")
            .tag_matching_rule(|rule| rule.tag_name("b"))
            .tag_matching_rule(|rule| rule.tag_name("a"))
            .build();
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_type_name_parts_are_derived() {
        let descriptor = anchor_helper().build();
        assert_eq!(
            descriptor.type_namespace(),
            Some("Microsoft.AspNetCore.Mvc.TagHelpers")
        );
        assert_eq!(descriptor.type_name_identifier(), Some("AnchorTagHelper"));
        assert_eq!(
            descriptor.display_name(),
            "Microsoft.AspNetCore.Mvc.TagHelpers.AnchorTagHelper"
        );
        assert_eq!(descriptor.runtime_kind(), RuntimeKind::TagHelper);
    }

    #[test]
    fn test_case_sensitivity_flows_to_rules() {
        let descriptor = TagHelperDescriptorBuilder::new(TagHelperKind::Component, "Counter", "App")
            .case_sensitive(true)
            .tag_matching_rule(|rule| rule.tag_name("Counter"))
            .bound_attribute(|a| a.name("IncrementAmount").property_name("IncrementAmount"))
            .build();
        assert!(descriptor.tag_matching_rules()[0].case_sensitive());
        assert!(descriptor.bound_attributes()[0].case_sensitive());
        assert_eq!(descriptor.runtime_kind(), RuntimeKind::Component);
    }

    #[test]
    fn test_nested_diagnostics_are_collected() {
        let descriptor = TagHelperDescriptorBuilder::tag_helper("T", "A")
            .tag_matching_rule(|rule| rule.tag_name("my tag"))
            .bound_attribute(|a| a.name("data-x").property_name("X"))
            .allowed_child_tag(|child| child.name(" "))
            .build();
        assert!(descriptor.has_errors());

        let ids: Vec<_> = descriptor
            .all_diagnostics()
            .iter()
            .map(|diagnostic| diagnostic.id())
            .collect();
        assert_eq!(
            ids,
            [
                codes::INVALID_TAG_NAME,
                codes::INVALID_BOUND_ATTRIBUTE_NAME,
                codes::INVALID_ALLOWED_CHILD_TAG_NAME
            ]
        );
    }
}
