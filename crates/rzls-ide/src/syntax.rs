//! Read-only access to a parsed markup document.
//!
//! Completion only needs a few facts about the element under the caret. Hosts
//! expose their own tree through [`MarkupSyntax`], or fill a [`MarkupTree`].

use rzls_source::ByteOffset;
use rzls_source::Span;
use rzls_tag_helpers::TagHelperDocumentContext;

use crate::attributes::AttributeCompletionContext;
use crate::elements::ElementCompletionContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupAttribute {
    pub name: String,
    pub value: String,
    pub name_span: Span,
    pub value_span: Option<Span>,
}

pub trait MarkupSyntax {
    type Element: Copy;

    /// The innermost element whose span contains `offset`.
    fn element_at(&self, offset: ByteOffset) -> Option<Self::Element>;

    fn parent(&self, element: Self::Element) -> Option<Self::Element>;

    fn tag_name(&self, element: Self::Element) -> &str;

    fn tag_name_span(&self, element: Self::Element) -> Span;

    /// From `<` up to, not including, the closing `>` or `/>`.
    fn start_tag_span(&self, element: Self::Element) -> Span;

    fn attributes(&self, element: Self::Element) -> &[MarkupAttribute];

    /// Whether the host bound this element to tag helpers.
    fn is_tag_helper(&self, element: Self::Element) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    tag_name: String,
    tag_name_span: Span,
    start_tag_span: Span,
    span: Span,
    attributes: Vec<MarkupAttribute>,
    is_tag_helper: bool,
    parent: Option<ElementId>,
}

impl MarkupElement {
    #[must_use]
    pub fn new(tag_name: impl Into<String>, tag_name_span: Span, start_tag_span: Span, span: Span) -> Self {
        Self {
            tag_name: tag_name.into(),
            tag_name_span,
            start_tag_span,
            span,
            attributes: Vec::new(),
            is_tag_helper: false,
            parent: None,
        }
    }

    #[must_use]
    pub fn attribute(mut self, attribute: MarkupAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn tag_helper(mut self, is_tag_helper: bool) -> Self {
        self.is_tag_helper = is_tag_helper;
        self
    }
}

/// An owned element arena.
#[derive(Debug, Clone, Default)]
pub struct MarkupTree {
    elements: Vec<MarkupElement>,
}

impl MarkupTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, parent: Option<ElementId>, mut element: MarkupElement) -> ElementId {
        element.parent = parent;
        let id = ElementId(u32::try_from(self.elements.len()).unwrap_or(u32::MAX));
        self.elements.push(element);
        id
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> &MarkupElement {
        &self.elements[id.0 as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl MarkupSyntax for MarkupTree {
    type Element = ElementId;

    fn element_at(&self, offset: ByteOffset) -> Option<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.span.contains(offset))
            .min_by_key(|(_, element)| element.span.length())
            .and_then(|(index, _)| u32::try_from(index).ok())
            .map(ElementId)
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.get(element).parent
    }

    fn tag_name(&self, element: ElementId) -> &str {
        &self.get(element).tag_name
    }

    fn tag_name_span(&self, element: ElementId) -> Span {
        self.get(element).tag_name_span
    }

    fn start_tag_span(&self, element: ElementId) -> Span {
        self.get(element).start_tag_span
    }

    fn attributes(&self, element: ElementId) -> &[MarkupAttribute] {
        &self.get(element).attributes
    }

    fn is_tag_helper(&self, element: ElementId) -> bool {
        self.get(element).is_tag_helper
    }
}

fn attribute_pairs(attributes: &[MarkupAttribute]) -> Vec<(String, String)> {
    attributes
        .iter()
        .map(|attribute| (attribute.name.clone(), attribute.value.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ParentInfo {
    tag_name: Option<String>,
    attributes: Vec<(String, String)>,
    is_tag_helper: bool,
}

fn parent_info<S: MarkupSyntax>(tree: &S, element: S::Element) -> ParentInfo {
    match tree.parent(element) {
        Some(parent) => ParentInfo {
            tag_name: Some(tree.tag_name(parent).to_string()),
            attributes: attribute_pairs(tree.attributes(parent)),
            is_tag_helper: tree.is_tag_helper(parent),
        },
        None => ParentInfo::default(),
    }
}

/// The caret is on an element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementCompletionLocation {
    pub tag_name: String,
    pub attributes: Vec<(String, String)>,
    pub parent_tag_name: Option<String>,
    pub parent_attributes: Vec<(String, String)>,
    pub parent_is_tag_helper: bool,
    /// The range a chosen completion replaces.
    pub replacement: Span,
}

impl ElementCompletionLocation {
    pub fn at<S: MarkupSyntax>(tree: &S, offset: ByteOffset) -> Option<Self> {
        let element = tree.element_at(offset)?;
        let replacement = tree.tag_name_span(element);
        if !replacement.contains(offset) {
            return None;
        }

        let parent = parent_info(tree, element);
        Some(Self {
            tag_name: tree.tag_name(element).to_string(),
            attributes: attribute_pairs(tree.attributes(element)),
            parent_tag_name: parent.tag_name,
            parent_attributes: parent.attributes,
            parent_is_tag_helper: parent.is_tag_helper,
            replacement,
        })
    }

    #[must_use]
    pub fn into_context(
        self,
        document_context: &TagHelperDocumentContext,
        existing_completions: Vec<String>,
    ) -> ElementCompletionContext<'_> {
        ElementCompletionContext {
            document_context,
            existing_completions,
            containing_tag_name: Some(self.tag_name),
            attributes: self.attributes,
            containing_parent_tag_name: self.parent_tag_name,
            containing_parent_attributes: self.parent_attributes,
            containing_parent_is_tag_helper: self.parent_is_tag_helper,
        }
    }
}

/// The caret is inside a start tag, past its name and outside any value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeCompletionLocation {
    pub tag_name: String,
    pub current_attribute_name: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub parent_tag_name: Option<String>,
    pub parent_is_tag_helper: bool,
    pub replacement: Span,
}

impl AttributeCompletionLocation {
    pub fn at<S: MarkupSyntax>(tree: &S, offset: ByteOffset) -> Option<Self> {
        let element = tree.element_at(offset)?;
        if !tree.start_tag_span(element).contains(offset)
            || *offset <= tree.tag_name_span(element).end()
        {
            return None;
        }

        let attributes = tree.attributes(element);
        if attributes
            .iter()
            .filter_map(|attribute| attribute.value_span)
            .any(|span| span.contains(offset))
        {
            return None;
        }

        let current = attributes
            .iter()
            .find(|attribute| attribute.name_span.contains(offset));
        let parent = parent_info(tree, element);
        Some(Self {
            tag_name: tree.tag_name(element).to_string(),
            current_attribute_name: current.map(|attribute| attribute.name.clone()),
            attributes: attribute_pairs(attributes),
            parent_tag_name: parent.tag_name,
            parent_is_tag_helper: parent.is_tag_helper,
            replacement: current.map_or(Span::new(*offset, 0), |attribute| attribute.name_span),
        })
    }

    #[must_use]
    pub fn into_context(
        self,
        document_context: &TagHelperDocumentContext,
        existing_completions: Vec<String>,
    ) -> AttributeCompletionContext<'_> {
        AttributeCompletionContext {
            document_context,
            existing_completions,
            current_tag_name: self.tag_name,
            current_attribute_name: self.current_attribute_name,
            attributes: self.attributes,
            current_parent_tag_name: self.parent_tag_name,
            current_parent_is_tag_helper: self.parent_is_tag_helper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `<div class="x"><a asp-for="Name" hr></a></div>`
    fn tree() -> MarkupTree {
        let mut tree = MarkupTree::new();
        let div = tree.push(
            None,
            MarkupElement::new("div", Span::new(1, 3), Span::new(0, 14), Span::new(0, 46)).attribute(
                MarkupAttribute {
                    name: "class".to_string(),
                    value: "x".to_string(),
                    name_span: Span::new(5, 5),
                    value_span: Some(Span::new(12, 1)),
                },
            ),
        );
        tree.push(
            Some(div),
            MarkupElement::new("a", Span::new(16, 1), Span::new(15, 20), Span::new(15, 25))
                .attribute(MarkupAttribute {
                    name: "asp-for".to_string(),
                    value: "Name".to_string(),
                    name_span: Span::new(18, 7),
                    value_span: Some(Span::new(27, 4)),
                })
                .attribute(MarkupAttribute {
                    name: "hr".to_string(),
                    value: String::new(),
                    name_span: Span::new(33, 2),
                    value_span: None,
                })
                .tag_helper(true),
        );
        tree
    }

    #[test]
    fn test_element_location_on_tag_name() {
        let tree = tree();
        let location = ElementCompletionLocation::at(&tree, ByteOffset::new(17)).unwrap();
        assert_eq!(location.tag_name, "a");
        assert_eq!(location.parent_tag_name.as_deref(), Some("div"));
        assert_eq!(location.parent_attributes, [("class".to_string(), "x".to_string())]);
        assert!(!location.parent_is_tag_helper);
        assert_eq!(location.replacement, Span::new(16, 1));

        assert!(ElementCompletionLocation::at(&tree, ByteOffset::new(20)).is_none());
    }

    #[test]
    fn test_attribute_location_on_name() {
        let tree = tree();
        let location = AttributeCompletionLocation::at(&tree, ByteOffset::new(35)).unwrap();
        assert_eq!(location.tag_name, "a");
        assert_eq!(location.current_attribute_name.as_deref(), Some("hr"));
        assert_eq!(location.attributes.len(), 2);
        assert_eq!(location.replacement, Span::new(33, 2));
    }

    #[test]
    fn test_attribute_location_in_whitespace() {
        let tree = tree();
        let location = AttributeCompletionLocation::at(&tree, ByteOffset::new(32)).unwrap();
        assert_eq!(location.current_attribute_name, None);
        assert_eq!(location.replacement, Span::new(32, 0));
    }

    #[test]
    fn test_no_attribute_location_inside_value_or_name() {
        let tree = tree();
        assert!(AttributeCompletionLocation::at(&tree, ByteOffset::new(29)).is_none());
        assert!(AttributeCompletionLocation::at(&tree, ByteOffset::new(16)).is_none());
    }
}
