//! JSON tag helper catalogs.
//!
//! A catalog file is a JSON array of tag helper entries:
//!
//! ```json
//! [
//!   {
//!     "name": "Microsoft.AspNetCore.Mvc.TagHelpers.AnchorTagHelper",
//!     "assembly": "Microsoft.AspNetCore.Mvc.TagHelpers",
//!     "rules": [{ "tag": "a", "attributes": [{ "name": "asp-action" }] }],
//!     "attributes": [
//!       { "name": "asp-action", "property": "Action", "type": "System.String" },
//!       { "name": "asp-all-route-data", "property": "RouteValues",
//!         "indexer": { "prefix": "asp-route-", "type": "System.String" } }
//!     ]
//!   }
//! ]
//! ```

use std::collections::BTreeMap;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use rzls_tag_helpers::descriptors::BoundAttributeDescriptorBuilder;
use rzls_tag_helpers::descriptors::NameComparison;
use rzls_tag_helpers::descriptors::RequiredAttributeDescriptorBuilder;
use rzls_tag_helpers::descriptors::TagMatchingRuleDescriptorBuilder;
use rzls_tag_helpers::descriptors::TagStructure;
use rzls_tag_helpers::descriptors::ValueComparison;
use rzls_tag_helpers::TagHelperCollection;
use rzls_tag_helpers::TagHelperDescriptor;
use rzls_tag_helpers::TagHelperDescriptorBuilder;
use rzls_tag_helpers::TagHelperKind;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    TagHelper,
    Component,
    ChildContent,
}

impl From<CatalogKind> for TagHelperKind {
    fn from(kind: CatalogKind) -> Self {
        match kind {
            CatalogKind::TagHelper => TagHelperKind::TagHelper,
            CatalogKind::Component => TagHelperKind::Component,
            CatalogKind::ChildContent => TagHelperKind::ChildContent,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogStructure {
    NormalOrSelfClosing,
    WithoutEndTag,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogValueComparison {
    Full,
    Prefix,
    Suffix,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogTagHelper {
    pub name: String,
    pub assembly: String,
    pub kind: Option<CatalogKind>,
    pub display_name: Option<String>,
    pub documentation: Option<String>,
    pub output_hint: Option<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub fully_qualified_name_match: bool,
    #[serde(default)]
    pub rules: Vec<CatalogRule>,
    #[serde(default)]
    pub attributes: Vec<CatalogBoundAttribute>,
    #[serde(default)]
    pub allowed_children: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogRule {
    pub tag: String,
    pub parent: Option<String>,
    pub structure: Option<CatalogStructure>,
    #[serde(default)]
    pub attributes: Vec<CatalogRequiredAttribute>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogRequiredAttribute {
    pub name: String,
    /// Match any attribute starting with `name`.
    #[serde(default)]
    pub prefix: bool,
    pub value: Option<String>,
    pub value_match: Option<CatalogValueComparison>,
    #[serde(default)]
    pub directive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogBoundAttribute {
    pub name: String,
    pub property: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub indexer: Option<CatalogIndexer>,
    pub documentation: Option<String>,
    #[serde(default)]
    pub directive: bool,
    #[serde(default, rename = "enum")]
    pub is_enum: bool,
    #[serde(default)]
    pub editor_required: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogIndexer {
    pub prefix: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl CatalogTagHelper {
    #[must_use]
    pub fn build(self) -> TagHelperDescriptor {
        let mut builder = match self.kind.map(TagHelperKind::from) {
            None | Some(TagHelperKind::TagHelper) => {
                TagHelperDescriptorBuilder::tag_helper(self.name, self.assembly)
            }
            Some(kind) => TagHelperDescriptorBuilder::new(kind, self.name, self.assembly),
        }
        .case_sensitive(self.case_sensitive)
        .fully_qualified_name_match(self.fully_qualified_name_match);

        if let Some(display_name) = self.display_name {
            builder = builder.display_name(display_name);
        }
        if let Some(documentation) = self.documentation {
            builder = builder.documentation(documentation);
        }
        if let Some(hint) = self.output_hint {
            builder = builder.tag_output_hint(hint);
        }
        for rule in self.rules {
            builder = builder.tag_matching_rule(|r| rule.configure(r));
        }
        for attribute in self.attributes {
            builder = builder.bound_attribute(|a| attribute.configure(a));
        }
        for child in self.allowed_children {
            builder = builder.allowed_child_tag(|c| c.name(child));
        }
        for (key, value) in self.metadata {
            builder = builder.metadata(key, value);
        }
        builder.build()
    }
}

impl CatalogRule {
    fn configure(self, mut rule: TagMatchingRuleDescriptorBuilder) -> TagMatchingRuleDescriptorBuilder {
        rule = rule.tag_name(self.tag);
        if let Some(parent) = self.parent {
            rule = rule.parent_tag(parent);
        }
        rule = rule.tag_structure(match self.structure {
            None => TagStructure::Unspecified,
            Some(CatalogStructure::NormalOrSelfClosing) => TagStructure::NormalOrSelfClosing,
            Some(CatalogStructure::WithoutEndTag) => TagStructure::WithoutEndTag,
        });
        for attribute in self.attributes {
            rule = rule.require_attribute(|a| attribute.configure(a));
        }
        rule
    }
}

impl CatalogRequiredAttribute {
    fn configure(self, mut attribute: RequiredAttributeDescriptorBuilder) -> RequiredAttributeDescriptorBuilder {
        attribute = attribute
            .name(self.name)
            .directive_attribute(self.directive)
            .name_comparison(if self.prefix {
                NameComparison::PrefixMatch
            } else {
                NameComparison::FullMatch
            });
        if let Some(value) = self.value {
            attribute = attribute
                .value(value)
                .value_comparison(match self.value_match {
                    None | Some(CatalogValueComparison::Full) => ValueComparison::FullMatch,
                    Some(CatalogValueComparison::Prefix) => ValueComparison::PrefixMatch,
                    Some(CatalogValueComparison::Suffix) => ValueComparison::SuffixMatch,
                });
        }
        attribute
    }
}

impl CatalogBoundAttribute {
    fn configure(self, mut attribute: BoundAttributeDescriptorBuilder) -> BoundAttributeDescriptorBuilder {
        attribute = attribute
            .name(self.name)
            .directive_attribute(self.directive)
            .is_enum(self.is_enum)
            .editor_required(self.editor_required);
        if let Some(property) = self.property {
            attribute = attribute.property_name(property);
        }
        if let Some(type_name) = self.type_name {
            attribute = attribute.type_name(type_name);
        }
        if let Some(indexer) = self.indexer {
            attribute = attribute.as_dictionary(indexer.prefix, indexer.type_name);
        }
        if let Some(documentation) = self.documentation {
            attribute = attribute.documentation(documentation);
        }
        attribute
    }
}

pub fn parse_catalog(json: &str) -> Result<Vec<TagHelperDescriptor>> {
    let entries: Vec<CatalogTagHelper> =
        serde_json::from_str(json).context("Invalid tag helper catalog")?;
    Ok(entries.into_iter().map(CatalogTagHelper::build).collect())
}

/// Read every descriptor in the catalog at `path`, duplicates included.
pub fn read_catalog(path: &Utf8Path) -> Result<Vec<TagHelperDescriptor>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {path}"))?;
    let descriptors = parse_catalog(&json).with_context(|| format!("Failed to parse {path}"))?;
    tracing::debug!(%path, count = descriptors.len(), "Read tag helper catalog");
    Ok(descriptors)
}

pub fn load_catalog(path: &Utf8Path) -> Result<TagHelperCollection> {
    Ok(read_catalog(path)?.into_iter().collect())
}
