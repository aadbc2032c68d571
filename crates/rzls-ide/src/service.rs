use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::attributes::attribute_completions;
use crate::attributes::AttributeCompletionContext;
use crate::attributes::AttributeCompletions;
use crate::elements::element_completions;
use crate::elements::ElementCompletionContext;
use crate::elements::ElementCompletions;
use crate::facts::CompletionFacts;
use crate::facts::LspCompletionFacts;
use crate::html::HtmlFacts;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("tag name must not be empty")]
    EmptyTagName,
    #[error("attribute names must not be empty")]
    EmptyAttributeName,
    #[error("completion request was cancelled")]
    Cancelled,
}

/// Element and attribute name completions backed by tag helper descriptors.
#[derive(Clone)]
pub struct TagHelperCompletionService {
    facts: Arc<dyn CompletionFacts>,
    html: HtmlFacts,
}

impl TagHelperCompletionService {
    #[must_use]
    pub fn new(facts: Arc<dyn CompletionFacts>) -> Self {
        Self {
            facts,
            html: HtmlFacts,
        }
    }

    #[must_use]
    pub fn facts(&self) -> &dyn CompletionFacts {
        self.facts.as_ref()
    }

    pub fn attribute_completions(
        &self,
        context: &AttributeCompletionContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<AttributeCompletions, CompletionError> {
        if cancel.is_cancelled() {
            return Err(CompletionError::Cancelled);
        }
        if context.current_tag_name.is_empty() {
            return Err(CompletionError::EmptyTagName);
        }
        check_parent(context.current_parent_tag_name.as_deref())?;
        check_attributes(&context.attributes)?;

        let completions = attribute_completions(self.facts(), self.html, context);
        tracing::trace!(
            tag = %context.current_tag_name,
            count = completions.len(),
            "Computed attribute completions"
        );
        Ok(completions)
    }

    pub fn element_completions(
        &self,
        context: &ElementCompletionContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<ElementCompletions, CompletionError> {
        if cancel.is_cancelled() {
            return Err(CompletionError::Cancelled);
        }
        check_parent(context.containing_parent_tag_name.as_deref())?;
        check_attributes(&context.attributes)?;
        check_attributes(&context.containing_parent_attributes)?;

        let completions = element_completions(self.facts(), self.html, context);
        tracing::trace!(
            parent = ?context.containing_parent_tag_name,
            count = completions.len(),
            "Computed element completions"
        );
        Ok(completions)
    }
}

impl Default for TagHelperCompletionService {
    fn default() -> Self {
        Self::new(Arc::new(LspCompletionFacts::default()))
    }
}

impl std::fmt::Debug for TagHelperCompletionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagHelperCompletionService")
            .field("check_attribute_rules", &self.facts.should_check_attribute_rules())
            .field(
                "initialize_with_existing_completions",
                &self.facts.initialize_with_existing_completions(),
            )
            .finish_non_exhaustive()
    }
}

fn check_parent(parent: Option<&str>) -> Result<(), CompletionError> {
    match parent {
        Some("") => Err(CompletionError::EmptyTagName),
        _ => Ok(()),
    }
}

fn check_attributes(attributes: &[(String, String)]) -> Result<(), CompletionError> {
    if attributes.iter().any(|(name, _)| name.is_empty()) {
        return Err(CompletionError::EmptyAttributeName);
    }
    Ok(())
}
