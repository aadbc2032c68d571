use std::hash::Hash;
use std::hash::Hasher;

use super::append_diagnostics;
use super::first_invalid_character;
use super::is_null_or_whitespace;
use super::RequiredAttributeDescriptor;
use super::RequiredAttributeDescriptorBuilder;
use super::CATCH_ALL_TAG_NAME;
use crate::checksum::Checksum;
use crate::checksum::ChecksumBuilder;
use crate::diagnostics::codes;
use crate::diagnostics::RazorDiagnostic;

/// How the matched element may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TagStructure {
    #[default]
    Unspecified,
    NormalOrSelfClosing,
    WithoutEndTag,
}

/// One way a tag helper can match an element. A descriptor applies when any of
/// its rules is satisfied.
#[derive(Debug, Clone)]
pub struct TagMatchingRuleDescriptor {
    tag_name: String,
    parent_tag: Option<String>,
    tag_structure: TagStructure,
    attributes: Vec<RequiredAttributeDescriptor>,
    case_sensitive: bool,
    diagnostics: Vec<RazorDiagnostic>,
    checksum: Checksum,
}

impl TagMatchingRuleDescriptor {
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.tag_name == CATCH_ALL_TAG_NAME
    }

    #[must_use]
    pub fn parent_tag(&self) -> Option<&str> {
        self.parent_tag.as_deref()
    }

    #[must_use]
    pub fn tag_structure(&self) -> TagStructure {
        self.tag_structure
    }

    #[must_use]
    pub fn attributes(&self) -> &[RequiredAttributeDescriptor] {
        &self.attributes
    }

    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[RazorDiagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(RazorDiagnostic::is_error)
            || self.attributes.iter().any(RequiredAttributeDescriptor::has_errors)
    }

    #[must_use]
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }
}

impl PartialEq for TagMatchingRuleDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for TagMatchingRuleDescriptor {}

impl Hash for TagMatchingRuleDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

#[derive(Debug, Default, Clone)]
pub struct TagMatchingRuleDescriptorBuilder {
    tag_name: Option<String>,
    parent_tag: Option<String>,
    tag_structure: TagStructure,
    attributes: Vec<RequiredAttributeDescriptorBuilder>,
}

impl TagMatchingRuleDescriptorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    #[must_use]
    pub fn parent_tag(mut self, parent_tag: impl Into<String>) -> Self {
        self.parent_tag = Some(parent_tag.into());
        self
    }

    #[must_use]
    pub fn tag_structure(mut self, tag_structure: TagStructure) -> Self {
        self.tag_structure = tag_structure;
        self
    }

    #[must_use]
    pub fn require_attribute(
        mut self,
        configure: impl FnOnce(RequiredAttributeDescriptorBuilder) -> RequiredAttributeDescriptorBuilder,
    ) -> Self {
        self.attributes
            .push(configure(RequiredAttributeDescriptorBuilder::new()));
        self
    }

    pub(crate) fn build(self, case_sensitive: bool) -> TagMatchingRuleDescriptor {
        let mut diagnostics = Vec::new();

        if is_null_or_whitespace(self.tag_name.as_deref()) {
            diagnostics.push(codes::tag_name_null_or_whitespace());
        } else if let Some(tag_name) = self.tag_name.as_deref() {
            if tag_name != CATCH_ALL_TAG_NAME {
                if let Some(character) = first_invalid_character(tag_name, false) {
                    diagnostics.push(codes::invalid_tag_name(tag_name, character));
                }
            }
        }

        if let Some(parent_tag) = self.parent_tag.as_deref() {
            if is_null_or_whitespace(Some(parent_tag)) {
                diagnostics.push(codes::invalid_parent_tag_name(parent_tag, None));
            } else if let Some(character) = first_invalid_character(parent_tag, false) {
                diagnostics.push(codes::invalid_parent_tag_name(parent_tag, Some(character)));
            }
        }

        let tag_name = self.tag_name.unwrap_or_default();
        let attributes: Vec<_> = self
            .attributes
            .into_iter()
            .map(|attribute| attribute.build(case_sensitive))
            .collect();

        let mut checksum = ChecksumBuilder::new();
        checksum
            .append_str(&tag_name)
            .append_opt_str(self.parent_tag.as_deref())
            .append_u32(self.tag_structure as u32)
            .append_bool(case_sensitive)
            .append_len(attributes.len());
        for attribute in &attributes {
            checksum.append_checksum(attribute.checksum());
        }
        append_diagnostics(&mut checksum, &diagnostics);

        TagMatchingRuleDescriptor {
            tag_name,
            parent_tag: self.parent_tag,
            tag_structure: self.tag_structure,
            attributes,
            case_sensitive,
            diagnostics,
            checksum: checksum.finish(),
        }
    }
}
