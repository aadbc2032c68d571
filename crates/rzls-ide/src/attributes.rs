use indexmap::IndexMap;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use rzls_tag_helpers::descriptors::BoundAttributeDescriptor;
use rzls_tag_helpers::TagHelperDocumentContext;

use crate::facts::CompletionFacts;
use crate::html::HtmlFacts;
use crate::INDEXER_MARKER;

/// Inputs for completing attribute names inside a start tag.
#[derive(Debug)]
pub struct AttributeCompletionContext<'a> {
    pub document_context: &'a TagHelperDocumentContext,
    /// Attribute names the markup provider already proposes.
    pub existing_completions: Vec<String>,
    pub current_tag_name: String,
    /// The attribute under the caret, if any.
    pub current_attribute_name: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub current_parent_tag_name: Option<String>,
    pub current_parent_is_tag_helper: bool,
}

/// Attribute labels mapped to the bound attributes that produce them.
///
/// Labels compare ASCII case-insensitively; the first spelling seen is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeCompletions {
    entries: IndexMap<String, (String, IndexSet<BoundAttributeDescriptor>)>,
}

impl AttributeCompletions {
    fn entry(&mut self, label: &str) -> &mut IndexSet<BoundAttributeDescriptor> {
        &mut self
            .entries
            .entry(label.to_ascii_lowercase())
            .or_insert_with(|| (label.to_string(), IndexSet::new()))
            .1
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&IndexSet<BoundAttributeDescriptor>> {
        self.entries
            .get(&label.to_ascii_lowercase())
            .map(|(_, descriptors)| descriptors)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(&label.to_ascii_lowercase())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.values().map(|(label, _)| label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<BoundAttributeDescriptor>)> + '_ {
        self.entries
            .values()
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

pub(crate) fn attribute_completions(
    facts: &dyn CompletionFacts,
    html: HtmlFacts,
    context: &AttributeCompletionContext<'_>,
) -> AttributeCompletions {
    let mut completions = AttributeCompletions::default();
    for label in &context.existing_completions {
        completions.entry(label);
    }

    let document = context.document_context;
    let descriptors_for_tag = facts.get_tag_helpers_given_tag(
        document,
        &context.current_tag_name,
        context.current_parent_tag_name.as_deref(),
    );
    if descriptors_for_tag.is_empty() {
        return completions;
    }

    let applicable: Vec<_> = facts
        .try_get_tag_helper_binding(
            document,
            &context.current_tag_name,
            &context.attributes,
            context.current_parent_tag_name.as_deref(),
            context.current_parent_is_tag_helper,
        )
        .map(|binding| binding.descriptors().cloned().collect())
        .unwrap_or_default();

    let prefix_len = document.prefix().map_or(0, str::len);
    let unprefixed_tag_name = context
        .current_tag_name
        .get(prefix_len..)
        .unwrap_or(&context.current_tag_name);
    if !html.is_html_tag_name(unprefixed_tag_name)
        && applicable
            .iter()
            .all(|descriptor| descriptor.tag_output_hint().is_none())
    {
        // Not an HTML element and nothing renders as one: HTML attributes don't apply.
        completions = AttributeCompletions::default();
    }

    let mut update = |label: &str, descriptor: Option<&BoundAttributeDescriptor>| {
        let already_present = context
            .attributes
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(label));
        let is_current = context
            .current_attribute_name
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(label));
        if already_present && !is_current {
            return;
        }

        let descriptors = completions.entry(label);
        if let Some(descriptor) = descriptor {
            descriptors.insert(descriptor.clone());
        }
    };

    for descriptor in &descriptors_for_tag {
        if applicable.contains(descriptor) {
            for attribute in descriptor.bound_attributes() {
                if !attribute.name().is_empty() {
                    update(attribute.name(), Some(attribute));
                }
                if let Some(prefix) = attribute.indexer_name_prefix().filter(|p| !p.is_empty()) {
                    update(&format!("{prefix}{INDEXER_MARKER}"), Some(attribute));
                }
            }
        } else {
            let mut by_html_name: FxHashMap<String, &BoundAttributeDescriptor> = FxHashMap::default();
            for attribute in descriptor.bound_attributes() {
                by_html_name.insert(attribute.name().to_ascii_lowercase(), attribute);
                if let Some(prefix) = attribute.indexer_name_prefix() {
                    by_html_name.insert(prefix.to_ascii_lowercase(), attribute);
                }
            }

            for rule in descriptor.tag_matching_rules() {
                for required in rule.attributes() {
                    let bound = by_html_name
                        .get(&required.name().to_ascii_lowercase())
                        .copied();
                    match bound {
                        Some(attribute) => update(required.display_name(), Some(attribute)),
                        None => update(required.name(), None),
                    }
                }
            }
        }
    }

    completions
}
