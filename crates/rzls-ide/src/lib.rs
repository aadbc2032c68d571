//! Completion services over tag helper descriptors.
//!
//! [`TagHelperCompletionService`] answers element and attribute name
//! completions for a [`rzls_tag_helpers::TagHelperDocumentContext`]; the
//! [`syntax`] module extracts its inputs from a markup tree and [`items`]
//! turns its results into editor entries.

mod attributes;
mod commit;
mod elements;
mod facts;
mod html;
pub mod items;
mod service;
pub mod syntax;

pub use attributes::AttributeCompletionContext;
pub use attributes::AttributeCompletions;
pub use commit::CommitCharacters;
pub use elements::ElementCompletionContext;
pub use elements::ElementCompletions;
pub use facts::completion_facts;
pub use facts::CompletionFacts;
pub use facts::LegacyCompletionFacts;
pub use facts::LspCompletionFacts;
pub use html::HtmlFacts;
pub use items::TagHelperCompletionItem;
pub use service::CompletionError;
pub use service::TagHelperCompletionService;

/// Suffix marking a dictionary attribute prefix in attribute completions.
pub const INDEXER_MARKER: &str = "...";
