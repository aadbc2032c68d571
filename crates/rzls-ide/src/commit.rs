use rzls_conf::CompletionSettings;
use rzls_tag_helpers::conventions;
use rzls_tag_helpers::descriptors::BoundAttributeDescriptor;

const ELEMENT: &[char] = &['>'];
const ELEMENT_WITH_SPACE: &[char] = &['>', ' '];
const ATTRIBUTE: &[char] = &['='];
const BOOLEAN_ATTRIBUTE: &[char] = &[' '];

/// Characters that accept a completion item, chosen once per settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitCharacters {
    element: &'static [char],
}

impl CommitCharacters {
    #[must_use]
    pub fn new(commit_elements_with_space: bool) -> Self {
        Self {
            element: if commit_elements_with_space {
                ELEMENT_WITH_SPACE
            } else {
                ELEMENT
            },
        }
    }

    #[must_use]
    pub fn from_settings(settings: &CompletionSettings) -> Self {
        Self::new(settings.commit_elements_with_space)
    }

    #[must_use]
    pub fn element(&self) -> &'static [char] {
        self.element
    }

    /// Indexer forms (`asp-route-...`) expect more typing, so they commit on nothing.
    /// Labels whose descriptors are all boolean take no value.
    #[must_use]
    pub fn attribute<'a>(
        &self,
        label: &str,
        descriptors: impl IntoIterator<Item = &'a BoundAttributeDescriptor>,
    ) -> &'static [char] {
        if label.ends_with(crate::INDEXER_MARKER) {
            return &[];
        }

        let mut descriptors = descriptors.into_iter().peekable();
        if descriptors.peek().is_none() {
            return ATTRIBUTE;
        }
        if descriptors.all(|descriptor| conventions::is_boolean_property(label, descriptor)) {
            BOOLEAN_ATTRIBUTE
        } else {
            ATTRIBUTE
        }
    }
}

impl Default for CommitCharacters {
    fn default() -> Self {
        Self::new(true)
    }
}
