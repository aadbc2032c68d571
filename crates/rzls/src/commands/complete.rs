use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Args as ClapArgs;
use clap::Subcommand;
use rzls_ide::completion_facts;
use rzls_ide::AttributeCompletionContext;
use rzls_ide::CommitCharacters;
use rzls_ide::ElementCompletionContext;
use rzls_ide::TagHelperCompletionService;
use rzls_tag_helpers::TagHelperDocumentContext;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::setup;
use super::Command;
use crate::args::Args;
use crate::catalog::load_catalog;
use crate::exit::Exit;

#[derive(Debug, Subcommand)]
pub enum Complete {
    /// Element names valid at a position
    Elements(Elements),
    /// Attribute names valid on an element
    Attributes(Attributes),
}

#[derive(Debug, ClapArgs)]
pub struct Shared {
    /// Tag helper catalog (JSON).
    catalog: Utf8PathBuf,

    /// Tag helper prefix in effect for the document.
    #[arg(long)]
    prefix: Option<String>,

    /// Name of the enclosing element.
    #[arg(long)]
    parent: Option<String>,

    /// Whether the enclosing element is itself a tag helper.
    #[arg(long, requires = "parent")]
    parent_is_tag_helper: bool,

    /// Completions the editor already offers, comma separated.
    #[arg(long, value_delimiter = ',')]
    existing: Vec<String>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, ClapArgs)]
pub struct Elements {
    #[command(flatten)]
    shared: Shared,

    /// Partially typed element name.
    #[arg(long)]
    tag: Option<String>,

    /// Attributes present on the element, as name=value.
    #[arg(long = "attr", value_parser = parse_attribute)]
    attributes: Vec<(String, String)>,

    /// Attributes present on the enclosing element, as name=value.
    #[arg(long = "parent-attr", value_parser = parse_attribute)]
    parent_attributes: Vec<(String, String)>,
}

#[derive(Debug, ClapArgs)]
pub struct Attributes {
    #[command(flatten)]
    shared: Shared,

    /// Element the attributes belong to.
    #[arg(long)]
    tag: String,

    /// Attribute name under the caret.
    #[arg(long)]
    current: Option<String>,

    /// Attributes present on the element, as name=value.
    #[arg(long = "attr", value_parser = parse_attribute)]
    attributes: Vec<(String, String)>,
}

/// One printed completion.
#[derive(Debug, Serialize)]
struct CompletionEntry {
    label: String,
    descriptors: Vec<String>,
    commit_characters: Vec<char>,
}

impl Command for Complete {
    async fn execute(&self, args: &Args) -> Result<Exit> {
        let (settings, _guard) = setup(args)?;
        let service = TagHelperCompletionService::new(completion_facts(&settings.completion));
        let commit = CommitCharacters::from_settings(&settings.completion);
        let cancel = CancellationToken::new();

        let shared = match self {
            Complete::Elements(elements) => &elements.shared,
            Complete::Attributes(attributes) => &attributes.shared,
        };
        let catalog = load_catalog(&shared.catalog)?;
        let prefix = shared.prefix.as_deref().or(settings.tag_helpers.prefix.as_deref());
        let document = TagHelperDocumentContext::create(prefix, catalog);

        let entries = match self {
            Complete::Elements(elements) => {
                let context = elements.context(&document);
                let completions = service.element_completions(&context, &cancel)?;
                completions
                    .iter()
                    .map(|(label, descriptors)| CompletionEntry {
                        label: label.to_string(),
                        descriptors: descriptors.iter().map(|d| d.display_name().to_string()).collect(),
                        commit_characters: commit.element().to_vec(),
                    })
                    .collect::<Vec<_>>()
            }
            Complete::Attributes(attributes) => {
                let context = attributes.context(&document);
                let completions = service.attribute_completions(&context, &cancel)?;
                completions
                    .iter()
                    .map(|(label, descriptors)| CompletionEntry {
                        label: label.to_string(),
                        descriptors: descriptors.iter().map(|d| d.display_name().to_string()).collect(),
                        commit_characters: commit.attribute(label, descriptors).to_vec(),
                    })
                    .collect()
            }
        };

        if shared.json {
            let json = serde_json::to_string_pretty(&entries).context("Failed to serialize completions")?;
            println!("{json}");
        } else {
            for entry in &entries {
                if entry.descriptors.is_empty() {
                    println!("{}", entry.label);
                } else {
                    println!("{}  ({})", entry.label, entry.descriptors.join(", "));
                }
            }
        }
        Ok(Exit::success())
    }
}

impl Elements {
    fn context<'a>(&self, document: &'a TagHelperDocumentContext) -> ElementCompletionContext<'a> {
        ElementCompletionContext {
            document_context: document,
            existing_completions: self.shared.existing.clone(),
            containing_tag_name: self.tag.clone(),
            attributes: self.attributes.clone(),
            containing_parent_tag_name: self.shared.parent.clone(),
            containing_parent_attributes: self.parent_attributes.clone(),
            containing_parent_is_tag_helper: self.shared.parent_is_tag_helper,
        }
    }
}

impl Attributes {
    fn context<'a>(&self, document: &'a TagHelperDocumentContext) -> AttributeCompletionContext<'a> {
        AttributeCompletionContext {
            document_context: document,
            existing_completions: self.shared.existing.clone(),
            current_tag_name: self.tag.clone(),
            current_attribute_name: self.current.clone(),
            attributes: self.attributes.clone(),
            current_parent_tag_name: self.shared.parent.clone(),
            current_parent_is_tag_helper: self.shared.parent_is_tag_helper,
        }
    }
}

fn parse_attribute(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, _)) if name.is_empty() => Err(format!("missing attribute name in {value:?}")),
        Some((name, value)) => Ok((name.to_string(), value.trim_matches('"').to_string())),
        None if value.is_empty() => Err("empty attribute".to_string()),
        None => Ok((value.to_string(), String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute() {
        assert_eq!(parse_attribute("asp-for=Name"), Ok(("asp-for".to_string(), "Name".to_string())));
        assert_eq!(parse_attribute("asp-for=\"Name\""), Ok(("asp-for".to_string(), "Name".to_string())));
        assert_eq!(parse_attribute("disabled"), Ok(("disabled".to_string(), String::new())));
        assert!(parse_attribute("=x").is_err());
        assert!(parse_attribute("").is_err());
    }
}
