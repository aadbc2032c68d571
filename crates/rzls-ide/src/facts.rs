//! Host-specific completion behaviour.
//!
//! Legacy editors and LSP clients share the completion algorithms but differ in
//! whether the markup provider's completions seed the element list and whether
//! attribute rules filter element suggestions.

use std::sync::Arc;

use rzls_conf::CompletionHost;
use rzls_conf::CompletionSettings;
use rzls_tag_helpers::conventions;
use rzls_tag_helpers::descriptors::TagMatchingRuleDescriptor;
use rzls_tag_helpers::TagHelperBinding;
use rzls_tag_helpers::TagHelperDescriptor;
use rzls_tag_helpers::TagHelperDocumentContext;

pub trait CompletionFacts: Send + Sync {
    fn try_get_tag_helper_binding(
        &self,
        context: &TagHelperDocumentContext,
        tag_name: &str,
        attributes: &[(String, String)],
        parent_tag_name: Option<&str>,
        parent_is_tag_helper: bool,
    ) -> Option<TagHelperBinding> {
        context
            .binder()
            .get_binding(tag_name, attributes, parent_tag_name, parent_is_tag_helper)
    }

    fn get_tag_helpers_given_tag(
        &self,
        context: &TagHelperDocumentContext,
        tag_name: &str,
        parent_tag_name: Option<&str>,
    ) -> Vec<Arc<TagHelperDescriptor>> {
        context
            .binder()
            .get_tag_helpers_given_tag(tag_name, parent_tag_name)
    }

    fn get_tag_helpers_given_parent(
        &self,
        context: &TagHelperDocumentContext,
        parent_tag_name: Option<&str>,
    ) -> Vec<Arc<TagHelperDescriptor>> {
        context.binder().get_tag_helpers_given_parent(parent_tag_name)
    }

    fn satisfies_parent_tag(
        &self,
        rule: &TagMatchingRuleDescriptor,
        parent_tag_name: Option<&str>,
    ) -> bool {
        conventions::satisfies_parent_tag(rule, parent_tag_name)
    }

    /// Whether element suggestions must satisfy the attributes already written.
    fn should_check_attribute_rules(&self) -> bool;

    /// Whether the markup provider's element labels seed the result.
    fn initialize_with_existing_completions(&self) -> bool;
}

/// Behaviour of the in-process editor integration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyCompletionFacts;

impl CompletionFacts for LegacyCompletionFacts {
    fn should_check_attribute_rules(&self) -> bool {
        false
    }

    fn initialize_with_existing_completions(&self) -> bool {
        true
    }
}

/// Behaviour for language server clients.
#[derive(Debug, Clone, Copy)]
pub struct LspCompletionFacts {
    check_attribute_rules: bool,
}

impl LspCompletionFacts {
    #[must_use]
    pub fn new(check_attribute_rules: bool) -> Self {
        Self {
            check_attribute_rules,
        }
    }
}

impl Default for LspCompletionFacts {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CompletionFacts for LspCompletionFacts {
    fn should_check_attribute_rules(&self) -> bool {
        self.check_attribute_rules
    }

    fn initialize_with_existing_completions(&self) -> bool {
        false
    }
}

/// The facts implementation selected by the completion settings.
#[must_use]
pub fn completion_facts(settings: &CompletionSettings) -> Arc<dyn CompletionFacts> {
    match settings.host {
        CompletionHost::Legacy => Arc::new(LegacyCompletionFacts),
        CompletionHost::Lsp => Arc::new(LspCompletionFacts::new(settings.check_attribute_rules)),
    }
}
