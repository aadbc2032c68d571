use std::hash::Hash;
use std::hash::Hasher;

use super::append_diagnostics;
use super::first_invalid_character;
use super::is_null_or_whitespace;
use crate::checksum::Checksum;
use crate::checksum::ChecksumBuilder;
use crate::diagnostics::codes;
use crate::diagnostics::RazorDiagnostic;

/// A tag name permitted as a child when the owning tag helper applies to the parent.
#[derive(Debug, Clone)]
pub struct AllowedChildTagDescriptor {
    name: String,
    display_name: String,
    diagnostics: Vec<RazorDiagnostic>,
    checksum: Checksum,
}

impl AllowedChildTagDescriptor {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
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

impl PartialEq for AllowedChildTagDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for AllowedChildTagDescriptor {}

impl Hash for AllowedChildTagDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

#[derive(Debug, Default, Clone)]
pub struct AllowedChildTagDescriptorBuilder {
    name: Option<String>,
    display_name: Option<String>,
}

impl AllowedChildTagDescriptorBuilder {
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
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub(crate) fn build(self, tag_helper: &str) -> AllowedChildTagDescriptor {
        let mut diagnostics = Vec::new();
        if is_null_or_whitespace(self.name.as_deref()) {
            diagnostics.push(codes::invalid_allowed_child_tag_name(tag_helper, "", None));
        } else if let Some(name) = self.name.as_deref() {
            if let Some(character) = first_invalid_character(name, false) {
                diagnostics.push(codes::invalid_allowed_child_tag_name(
                    tag_helper,
                    name,
                    Some(character),
                ));
            }
        }

        let name = self.name.unwrap_or_default();
        let display_name = self.display_name.unwrap_or_else(|| name.clone());

        let mut checksum = ChecksumBuilder::new();
        checksum.append_str(&name).append_str(&display_name);
        append_diagnostics(&mut checksum, &diagnostics);

        AllowedChildTagDescriptor {
            name,
            display_name,
            diagnostics,
            checksum: checksum.finish(),
        }
    }
}
