use rzls_source::LineCol;
use rzls_source::LineIndex;
use rzls_source::Span;
use serde::Serialize;

use crate::attributes::AttributeCompletions;
use crate::commit::CommitCharacters;
use crate::elements::ElementCompletions;
use crate::INDEXER_MARKER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionItemKind {
    Element,
    Attribute,
    /// A dictionary attribute prefix such as `asp-route-...`.
    IndexerAttribute,
}

/// An editor-ready completion entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagHelperCompletionItem {
    pub label: String,
    pub insert_text: String,
    pub kind: CompletionItemKind,
    /// Display names of the descriptors behind this entry.
    pub descriptors: Vec<String>,
    pub commit_characters: Vec<char>,
    pub replacement: Span,
    pub start: LineCol,
    pub end: LineCol,
}

#[must_use]
pub fn element_completion_items(
    completions: &ElementCompletions,
    replacement: Span,
    line_index: &LineIndex,
    commit: &CommitCharacters,
) -> Vec<TagHelperCompletionItem> {
    let (start, end) = replacement.to_line_col(line_index);
    completions
        .iter()
        .map(|(label, descriptors)| TagHelperCompletionItem {
            label: label.to_string(),
            insert_text: label.to_string(),
            kind: CompletionItemKind::Element,
            descriptors: descriptors
                .iter()
                .map(|descriptor| descriptor.display_name().to_string())
                .collect(),
            commit_characters: commit.element().to_vec(),
            replacement,
            start,
            end,
        })
        .collect()
}

#[must_use]
pub fn attribute_completion_items(
    completions: &AttributeCompletions,
    replacement: Span,
    line_index: &LineIndex,
    commit: &CommitCharacters,
) -> Vec<TagHelperCompletionItem> {
    let (start, end) = replacement.to_line_col(line_index);
    completions
        .iter()
        .map(|(label, descriptors)| {
            let (kind, insert_text) = match label.strip_suffix(INDEXER_MARKER) {
                Some(prefix) => (CompletionItemKind::IndexerAttribute, prefix.to_string()),
                None => (CompletionItemKind::Attribute, label.to_string()),
            };
            TagHelperCompletionItem {
                label: label.to_string(),
                insert_text,
                kind,
                descriptors: descriptors
                    .iter()
                    .map(|descriptor| descriptor.display_name().to_string())
                    .collect(),
                commit_characters: commit.attribute(label, descriptors).to_vec(),
                replacement,
                start,
                end,
            }
        })
        .collect()
}
