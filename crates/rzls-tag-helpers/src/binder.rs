use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::collection::TagHelperCollection;
use crate::conventions::satisfies_parent_tag;
use crate::conventions::satisfies_rule;
use crate::conventions::satisfies_tag_name;
use crate::conventions::strip_prefix_ignore_case;
use crate::descriptors::TagHelperDescriptor;
use crate::descriptors::TagMatchingRuleDescriptor;

/// Lookup structure answering "which tag helpers apply here" for one document.
///
/// Rules are indexed up front by their prefixed tag name (ASCII-case-folded), with
/// catch-all rules kept in a separate list, so a query only inspects descriptors
/// that could possibly match.
#[derive(Debug)]
pub struct TagHelperBinder {
    prefix: Option<String>,
    descriptors: TagHelperCollection,
    by_tag_name: FxHashMap<String, Vec<usize>>,
    catch_all: Vec<usize>,
}

impl TagHelperBinder {
    #[must_use]
    pub fn new(prefix: Option<&str>, descriptors: TagHelperCollection) -> Self {
        let prefix = prefix.filter(|prefix| !prefix.is_empty()).map(str::to_string);
        let mut by_tag_name: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        let mut catch_all = Vec::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            for rule in descriptor.tag_matching_rules() {
                let bucket = if rule.is_catch_all() {
                    &mut catch_all
                } else {
                    let key = format!("{}{}", prefix.as_deref().unwrap_or_default(), rule.tag_name())
                        .to_ascii_lowercase();
                    by_tag_name.entry(key).or_default()
                };
                if bucket.last() != Some(&index) {
                    bucket.push(index);
                }
            }
        }

        Self {
            prefix,
            descriptors,
            by_tag_name,
            catch_all,
        }
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    #[must_use]
    pub fn descriptors(&self) -> &TagHelperCollection {
        &self.descriptors
    }

    /// Indices of descriptors with a rule for `tag_name` or a catch-all rule, in
    /// catalog order.
    fn candidates(&self, tag_name: &str) -> Vec<usize> {
        let named = self
            .by_tag_name
            .get(&tag_name.to_ascii_lowercase())
            .map_or(&[][..], Vec::as_slice);

        let mut merged = Vec::with_capacity(named.len() + self.catch_all.len());
        let (mut left, mut right) = (0, 0);
        while left < named.len() || right < self.catch_all.len() {
            let next = match (named.get(left), self.catch_all.get(right)) {
                (Some(&a), Some(&b)) if a == b => {
                    left += 1;
                    right += 1;
                    a
                }
                (Some(&a), Some(&b)) if a < b => {
                    left += 1;
                    a
                }
                (_, Some(&b)) => {
                    right += 1;
                    b
                }
                (Some(&a), None) => {
                    left += 1;
                    a
                }
                (None, None) => break,
            };
            merged.push(next);
        }
        merged
    }

    fn strip_prefix<'a>(&self, name: &'a str) -> Option<&'a str> {
        match self.prefix.as_deref() {
            None => Some(name),
            Some(prefix) => strip_prefix_ignore_case(name, prefix),
        }
    }

    /// Bind an element to the tag helpers whose rules it satisfies.
    ///
    /// Returns `None` when the name lacks the document prefix, starts with the
    /// opt-out character, or no rule matches.
    #[must_use]
    pub fn get_binding(
        &self,
        tag_name: &str,
        attributes: &[(String, String)],
        parent_tag_name: Option<&str>,
        parent_is_tag_helper: bool,
    ) -> Option<TagHelperBinding> {
        let tag_name_without_prefix = self.strip_prefix(tag_name).filter(|name| !name.is_empty())?;
        let parent_without_prefix = if parent_is_tag_helper {
            parent_tag_name.map(|parent| self.strip_prefix(parent).unwrap_or(parent))
        } else {
            parent_tag_name
        };

        let mut mappings = Vec::new();
        for index in self.candidates(tag_name) {
            let descriptor = &self.descriptors[index];
            let rules: Vec<usize> = descriptor
                .tag_matching_rules()
                .iter()
                .enumerate()
                .filter(|(_, rule)| {
                    satisfies_rule(rule, tag_name_without_prefix, parent_without_prefix, attributes)
                })
                .map(|(rule_index, _)| rule_index)
                .collect();
            if !rules.is_empty() {
                mappings.push((Arc::clone(descriptor), rules));
            }
        }

        if mappings.is_empty() {
            return None;
        }

        Some(TagHelperBinding {
            tag_name: tag_name.to_string(),
            parent_tag_name: parent_tag_name.map(str::to_string),
            attributes: attributes.to_vec(),
            tag_helper_prefix: self.prefix.clone(),
            mappings,
        })
    }

    /// Descriptors with a rule matching `tag_name` under `parent_tag_name`,
    /// ignoring attributes. Empty when the name lacks the document prefix.
    #[must_use]
    pub fn get_tag_helpers_given_tag(
        &self,
        tag_name: &str,
        parent_tag_name: Option<&str>,
    ) -> Vec<Arc<TagHelperDescriptor>> {
        let Some(tag_name_without_prefix) = self.strip_prefix(tag_name) else {
            return Vec::new();
        };

        self.candidates(tag_name)
            .into_iter()
            .map(|index| &self.descriptors[index])
            .filter(|descriptor| {
                descriptor.tag_matching_rules().iter().any(|rule| {
                    satisfies_tag_name(rule, tag_name_without_prefix)
                        && satisfies_parent_tag(rule, parent_tag_name)
                })
            })
            .cloned()
            .collect()
    }

    /// Every descriptor with at least one rule accepting `parent_tag_name`.
    #[must_use]
    pub fn get_tag_helpers_given_parent(
        &self,
        parent_tag_name: Option<&str>,
    ) -> Vec<Arc<TagHelperDescriptor>> {
        self.descriptors
            .iter()
            .filter(|descriptor| {
                descriptor
                    .tag_matching_rules()
                    .iter()
                    .any(|rule| satisfies_parent_tag(rule, parent_tag_name))
            })
            .cloned()
            .collect()
    }
}

/// The tag helpers bound to one element, with the rules each one matched by.
#[derive(Debug, Clone)]
pub struct TagHelperBinding {
    tag_name: String,
    parent_tag_name: Option<String>,
    attributes: Vec<(String, String)>,
    tag_helper_prefix: Option<String>,
    mappings: Vec<(Arc<TagHelperDescriptor>, Vec<usize>)>,
}

impl TagHelperBinding {
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    #[must_use]
    pub fn parent_tag_name(&self) -> Option<&str> {
        self.parent_tag_name.as_deref()
    }

    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    #[must_use]
    pub fn tag_helper_prefix(&self) -> Option<&str> {
        self.tag_helper_prefix.as_deref()
    }

    /// Bound descriptors in catalog order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<TagHelperDescriptor>> + '_ {
        self.mappings.iter().map(|(descriptor, _)| descriptor)
    }

    /// Rules of `descriptor` the element satisfied; empty if it is not bound.
    #[must_use]
    pub fn rules_for(&self, descriptor: &TagHelperDescriptor) -> Vec<&TagMatchingRuleDescriptor> {
        self.mappings
            .iter()
            .find(|(bound, _)| **bound == *descriptor)
            .map(|(bound, rules)| {
                rules
                    .iter()
                    .map(|&index| &bound.tag_matching_rules()[index])
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn mappings(
        &self,
    ) -> impl Iterator<Item = (&Arc<TagHelperDescriptor>, Vec<&TagMatchingRuleDescriptor>)> + '_ {
        self.mappings.iter().map(|(descriptor, rules)| {
            let rules = rules
                .iter()
                .map(|&index| &descriptor.tag_matching_rules()[index])
                .collect();
            (descriptor, rules)
        })
    }

    /// Whether every bound descriptor only classifies attributes.
    #[must_use]
    pub fn is_attribute_match(&self) -> bool {
        self.mappings
            .iter()
            .all(|(descriptor, _)| descriptor.classify_attributes_only())
    }
}
