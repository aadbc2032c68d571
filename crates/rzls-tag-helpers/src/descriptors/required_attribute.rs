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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NameComparison {
    /// The attribute name must equal the required name.
    #[default]
    FullMatch,
    /// The attribute name must start with, and be longer than, the required name.
    PrefixMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueComparison {
    #[default]
    None,
    FullMatch,
    PrefixMatch,
    SuffixMatch,
}

/// An attribute an element must carry for a rule to match.
#[derive(Debug, Clone)]
pub struct RequiredAttributeDescriptor {
    name: String,
    name_comparison: NameComparison,
    value: Option<String>,
    value_comparison: ValueComparison,
    display_name: String,
    case_sensitive: bool,
    directive_attribute: bool,
    metadata: MetadataCollection,
    diagnostics: Vec<RazorDiagnostic>,
    checksum: Checksum,
}

impl RequiredAttributeDescriptor {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn name_comparison(&self) -> NameComparison {
        self.name_comparison
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[must_use]
    pub fn value_comparison(&self) -> ValueComparison {
        self.value_comparison
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    #[must_use]
    pub fn is_directive_attribute(&self) -> bool {
        self.directive_attribute
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

impl PartialEq for RequiredAttributeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for RequiredAttributeDescriptor {}

impl Hash for RequiredAttributeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

#[derive(Debug, Default, Clone)]
pub struct RequiredAttributeDescriptorBuilder {
    name: Option<String>,
    name_comparison: NameComparison,
    value: Option<String>,
    value_comparison: ValueComparison,
    display_name: Option<String>,
    directive_attribute: bool,
    metadata: MetadataBuilder,
}

impl RequiredAttributeDescriptorBuilder {
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
    pub fn name_comparison(mut self, comparison: NameComparison) -> Self {
        self.name_comparison = comparison;
        self
    }

    /// Require a value; defaults the comparison to a full match when none was set.
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        if self.value_comparison == ValueComparison::None {
            self.value_comparison = ValueComparison::FullMatch;
        }
        self
    }

    #[must_use]
    pub fn value_comparison(mut self, comparison: ValueComparison) -> Self {
        self.value_comparison = comparison;
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn directive_attribute(mut self, directive_attribute: bool) -> Self {
        self.directive_attribute = directive_attribute;
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub(crate) fn build(self, case_sensitive: bool) -> RequiredAttributeDescriptor {
        let mut diagnostics = Vec::new();
        if is_null_or_whitespace(self.name.as_deref()) {
            diagnostics.push(codes::invalid_required_attribute_name("", None));
        } else if let Some(name) = &self.name {
            if let Some(character) = first_invalid_character(name, self.directive_attribute) {
                diagnostics.push(codes::invalid_required_attribute_name(name, Some(character)));
            }
        }

        let name = self.name.unwrap_or_default();
        let display_name = self.display_name.unwrap_or_else(|| match self.name_comparison {
            NameComparison::FullMatch => name.clone(),
            NameComparison::PrefixMatch => format!("{name}..."),
        });
        let metadata = self.metadata.build();

        let mut checksum = ChecksumBuilder::new();
        checksum
            .append_str(&name)
            .append_u32(self.name_comparison as u32)
            .append_opt_str(self.value.as_deref())
            .append_u32(self.value_comparison as u32)
            .append_str(&display_name)
            .append_bool(case_sensitive)
            .append_bool(self.directive_attribute)
            .append_checksum(metadata.checksum());
        append_diagnostics(&mut checksum, &diagnostics);

        RequiredAttributeDescriptor {
            name,
            name_comparison: self.name_comparison,
            value: self.value,
            value_comparison: self.value_comparison,
            display_name,
            case_sensitive,
            directive_attribute: self.directive_attribute,
            metadata,
            diagnostics,
            checksum: checksum.finish(),
        }
    }
}
