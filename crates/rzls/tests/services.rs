use std::sync::Arc;

use async_trait::async_trait;
use rzls::catalog::parse_catalog;
use rzls::LanguageServices;
use rzls_conf::Settings;
use rzls_ide::items::CompletionItemKind;
use rzls_ide::syntax::MarkupElement;
use rzls_ide::syntax::MarkupTree;
use rzls_source::ByteOffset;
use rzls_source::LineCol;
use rzls_source::SourceText;
use rzls_source::Span;
use rzls_tag_helpers::TagHelperCollection;
use rzls_workspace::HostDocument;
use rzls_workspace::HostProject;
use rzls_workspace::ProjectConfiguration;
use rzls_workspace::ProjectKey;
use rzls_workspace::ProjectSnapshot;
use rzls_workspace::ResolveError;
use rzls_workspace::StaticTextLoader;
use rzls_workspace::TagHelperResolver;
use tokio_util::sync::CancellationToken;

const PROJECT: &str = "/app/App.csproj";
const INDEX: &str = "/app/Pages/Index.cshtml";
const IMPORTS: &str = "/app/_ViewImports.cshtml";

/// `<div><a ></a></div>`
const TEXT: &str = "<div><a ></a></div>";

const CATALOG: &str = r#"[
    {
        "name": "AnchorTagHelper",
        "assembly": "Mvc",
        "rules": [{ "tag": "a" }],
        "attributes": [
            { "name": "asp-action", "property": "Action", "type": "System.String" },
            { "name": "asp-all-route-data", "property": "RouteValues",
              "indexer": { "prefix": "asp-route-", "type": "System.String" } }
        ]
    },
    { "name": "CardTagHelper", "assembly": "App", "rules": [{ "tag": "card" }] }
]"#;

struct FixedResolver(TagHelperCollection);

#[async_trait]
impl TagHelperResolver for FixedResolver {
    async fn resolve(
        &self,
        _project: &ProjectSnapshot,
        _cancel: &CancellationToken,
    ) -> Result<TagHelperCollection, ResolveError> {
        Ok(self.0.clone())
    }
}

fn key() -> ProjectKey {
    ProjectKey::new(PROJECT)
}

fn tree() -> MarkupTree {
    let mut tree = MarkupTree::new();
    let div = tree.push(
        None,
        MarkupElement::new("div", Span::new(1, 3), Span::new(0, 4), Span::new(0, 19)),
    );
    tree.push(
        Some(div),
        MarkupElement::new("a", Span::new(6, 1), Span::new(5, 3), Span::new(5, 8)),
    );
    tree
}

async fn services() -> LanguageServices {
    let services = LanguageServices::new(&Settings::default());
    services
        .manager()
        .update(|updater| {
            updater.add_project(HostProject::new(PROJECT, ProjectConfiguration::default(), None))?;
            updater.add_document(
                &key(),
                HostDocument::new(INDEX, "Pages/Index.cshtml"),
                Arc::new(StaticTextLoader::new(SourceText::new(TEXT))),
            )
        })
        .unwrap();

    let catalog: TagHelperCollection = parse_catalog(CATALOG).unwrap().into_iter().collect();
    services
        .refresh_tag_helpers(&key(), &FixedResolver(catalog), &CancellationToken::new())
        .await
        .unwrap();
    services
}

#[tokio::test]
async fn element_completions_at_tag_name() {
    let services = services().await;
    let items = services
        .element_completions(INDEX, &tree(), ByteOffset::new(6), Vec::new(), &CancellationToken::new())
        .await
        .unwrap();

    let labels: Vec<_> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, ["card"]);
    assert_eq!(items[0].kind, CompletionItemKind::Element);
    assert_eq!(items[0].descriptors, ["CardTagHelper"]);
    assert_eq!(items[0].commit_characters, ['>', ' ']);
    assert_eq!(items[0].replacement, Span::new(6, 1));
    assert_eq!(items[0].start, LineCol::new(0, 6));
    services.shutdown();
}

#[tokio::test]
async fn attribute_completions_inside_start_tag() {
    let services = services().await;
    let items = services
        .attribute_completions(INDEX, &tree(), ByteOffset::new(8), Vec::new(), &CancellationToken::new())
        .await
        .unwrap();

    let labels: Vec<_> = items.iter().map(|item| item.label.as_str()).collect();
    insta::assert_snapshot!(labels.join(" "), @"asp-action asp-all-route-data asp-route-...");

    let indexer = &items[2];
    assert_eq!(indexer.kind, CompletionItemKind::IndexerAttribute);
    assert_eq!(indexer.insert_text, "asp-route-");
    assert!(indexer.commit_characters.is_empty());
    assert_eq!(items[0].commit_characters, ['=']);
    assert_eq!(items[0].replacement, Span::new(8, 0));
}

#[tokio::test]
async fn positions_outside_targets_complete_nothing() {
    let services = services().await;
    let cancel = CancellationToken::new();
    let elements = services
        .element_completions(INDEX, &tree(), ByteOffset::new(8), Vec::new(), &cancel)
        .await
        .unwrap();
    let attributes = services
        .attribute_completions(INDEX, &tree(), ByteOffset::new(16), Vec::new(), &cancel)
        .await
        .unwrap();
    assert!(elements.is_empty());
    assert!(attributes.is_empty());
}

#[tokio::test]
async fn document_context_follows_imports() {
    let services = services().await;
    let cancel = CancellationToken::new();
    assert_eq!(services.document_context(INDEX, &cancel).await.unwrap().prefix(), None);

    services
        .manager()
        .update(|updater| {
            updater.add_document(
                &key(),
                HostDocument::new(IMPORTS, "_ViewImports.cshtml"),
                Arc::new(StaticTextLoader::new(SourceText::new("@tagHelperPrefix th:"))),
            )
        })
        .unwrap();

    let context = services.document_context(INDEX, &cancel).await.unwrap();
    assert_eq!(context.prefix(), Some("th:"));
    assert_eq!(context.tag_helpers().len(), 2);
}

#[tokio::test]
async fn unknown_documents_are_errors() {
    let services = services().await;
    let result = services
        .document_context("/elsewhere/Page.cshtml", &CancellationToken::new())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn cancelled_queries_fail() {
    let services = services().await;
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = services
        .element_completions(INDEX, &tree(), ByteOffset::new(6), Vec::new(), &cancel)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn equal_catalog_refresh_keeps_state() {
    let services = services().await;
    let version = services.manager().current().version();

    let catalog: TagHelperCollection = parse_catalog(CATALOG).unwrap().into_iter().collect();
    services
        .refresh_tag_helpers(&key(), &FixedResolver(catalog), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(services.manager().current().version(), version);
}
