use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use rzls_tag_helpers::conventions;
use rzls_tag_helpers::TagHelperDescriptor;
use rzls_tag_helpers::TagHelperDocumentContext;

use crate::facts::CompletionFacts;
use crate::html::HtmlFacts;

/// Inputs for completing the name of the element under the caret.
#[derive(Debug)]
pub struct ElementCompletionContext<'a> {
    pub document_context: &'a TagHelperDocumentContext,
    /// Element names the markup provider already proposes.
    pub existing_completions: Vec<String>,
    /// The partially typed name of the element being completed.
    pub containing_tag_name: Option<String>,
    /// Attributes already written on the element being completed.
    pub attributes: Vec<(String, String)>,
    pub containing_parent_tag_name: Option<String>,
    pub containing_parent_attributes: Vec<(String, String)>,
    pub containing_parent_is_tag_helper: bool,
}

/// Element labels mapped to the tag helpers that would bind them.
///
/// Labels compare ordinally so `div` and `DIV` stay distinct entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCompletions {
    entries: IndexMap<String, IndexSet<Arc<TagHelperDescriptor>>>,
}

impl ElementCompletions {
    fn entry(&mut self, label: &str) -> &mut IndexSet<Arc<TagHelperDescriptor>> {
        self.entries.entry(label.to_string()).or_default()
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&IndexSet<Arc<TagHelperDescriptor>>> {
        self.entries.get(label)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<Arc<TagHelperDescriptor>>)> + '_ {
        self.entries
            .iter()
            .map(|(label, descriptors)| (label.as_str(), descriptors))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn element_completions(
    facts: &dyn CompletionFacts,
    html: HtmlFacts,
    context: &ElementCompletionContext<'_>,
) -> ElementCompletions {
    let mut completions = ElementCompletions::default();

    if add_allowed_children(facts, context, &mut completions) {
        return completions;
    }

    if facts.initialize_with_existing_completions() {
        for label in &context.existing_completions {
            completions.entry(label);
        }
    }

    let document = context.document_context;
    let prefix = document.prefix().unwrap_or_default();
    let parent = context.containing_parent_tag_name.as_deref();
    let check_attributes_enabled = facts.should_check_attribute_rules();

    let candidates = filter_fully_qualified(facts.get_tag_helpers_given_parent(document, parent));
    let mut catch_alls: IndexSet<Arc<TagHelperDescriptor>> = IndexSet::new();

    for descriptor in candidates {
        if only_directive_attributes(&descriptor) {
            continue;
        }
        let output_hint = descriptor.tag_output_hint();

        for rule in descriptor.tag_matching_rules() {
            if !facts.satisfies_parent_tag(rule, parent) {
                continue;
            }

            let tag_name = rule.tag_name();
            let mut check_attributes = true;
            let add = if rule.is_catch_all() {
                catch_alls.insert(Arc::clone(&descriptor));
                false
            } else if is_proposed(&completions, context, tag_name) {
                true
            } else if let Some(hint) = output_hint {
                // Only offered where the element it renders as would be offered.
                is_proposed(&completions, context, hint)
            } else if !html.is_exact_html_tag_name(tag_name) {
                // Custom elements, and HTML names in non-schema casing, have
                // nothing existing to agree with.
                check_attributes = false;
                true
            } else {
                false
            };

            if add {
                let attributes_ok = !check_attributes
                    || !check_attributes_enabled
                    || conventions::satisfies_attributes(rule, &context.attributes);
                if attributes_ok {
                    completions
                        .entry(&format!("{prefix}{tag_name}"))
                        .insert(Arc::clone(&descriptor));
                }
                break;
            }
        }
    }

    // Catch-alls attach last so they see every label added above.
    if !catch_alls.is_empty() {
        let labels: Vec<String> = completions
            .entries
            .iter()
            .filter(|(label, descriptors)| {
                !descriptors.is_empty()
                    || (!prefix.is_empty() && starts_with_ignore_case(label, prefix))
            })
            .map(|(label, _)| label.clone())
            .collect();
        for label in labels {
            completions.entry(&label).extend(catch_alls.iter().cloned());
        }
    }

    completions
}

/// Restrict results to the children the enclosing tag helper allows.
///
/// Returns `true` when the restriction applies and produced entries.
fn add_allowed_children(
    facts: &dyn CompletionFacts,
    context: &ElementCompletionContext<'_>,
    completions: &mut ElementCompletions,
) -> bool {
    let Some(parent) = context.containing_parent_tag_name.as_deref() else {
        return false;
    };
    if !context.containing_parent_is_tag_helper {
        return false;
    }

    let document = context.document_context;
    let Some(binding) = facts.try_get_tag_helper_binding(
        document,
        parent,
        &context.containing_parent_attributes,
        None,
        false,
    ) else {
        return false;
    };

    let prefix = document.prefix().unwrap_or_default();
    for descriptor in binding.descriptors() {
        for child in descriptor.allowed_child_tags() {
            let prefixed = format!("{prefix}{}", child.name());
            let descriptors = facts.get_tag_helpers_given_tag(document, &prefixed, Some(parent));
            completions.entry(&prefixed).extend(descriptors);
        }
    }

    !completions.is_empty()
}

/// Drop fully-qualified-name component matches when the same component is
/// also reachable by its short name.
fn filter_fully_qualified(
    mut descriptors: Vec<Arc<TagHelperDescriptor>>,
) -> Vec<Arc<TagHelperDescriptor>> {
    let short_names: FxHashSet<(String, String)> = descriptors
        .iter()
        .filter(|d| !d.is_fully_qualified_name_match())
        .map(|d| (d.name().to_string(), d.assembly_name().to_string()))
        .collect();

    descriptors.retain(|d| {
        !(d.is_fully_qualified_name_match()
            && short_names.contains(&(d.name().to_string(), d.assembly_name().to_string())))
    });
    descriptors
}

fn is_proposed(completions: &ElementCompletions, context: &ElementCompletionContext<'_>, label: &str) -> bool {
    completions.contains(label) || context.existing_completions.iter().any(|c| c == label)
}

fn only_directive_attributes(descriptor: &TagHelperDescriptor) -> bool {
    let attributes = descriptor.bound_attributes();
    !attributes.is_empty() && attributes.iter().all(conventions::is_directive_attribute)
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
