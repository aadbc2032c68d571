use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::checksum::Checksum;
use crate::checksum::ChecksumBuilder;
use crate::descriptors::TagHelperDescriptor;

/// An immutable, shareable catalog of tag helpers.
///
/// Cloning is cheap. Two collections are equal when they hold the same
/// descriptors, by value, in the same order.
#[derive(Clone)]
pub struct TagHelperCollection {
    items: Arc<[Arc<TagHelperDescriptor>]>,
    checksum: Checksum,
}

impl TagHelperCollection {
    #[must_use]
    pub fn empty() -> Self {
        TagHelperCollectionBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> TagHelperCollectionBuilder {
        TagHelperCollectionBuilder::new()
    }

    #[must_use]
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    #[must_use]
    pub fn contains(&self, descriptor: &TagHelperDescriptor) -> bool {
        self.items.iter().any(|item| **item == *descriptor)
    }

    /// Whether both handles share the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl Default for TagHelperCollection {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for TagHelperCollection {
    type Target = [Arc<TagHelperDescriptor>];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a> IntoIterator for &'a TagHelperCollection {
    type Item = &'a Arc<TagHelperDescriptor>;
    type IntoIter = std::slice::Iter<'a, Arc<TagHelperDescriptor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Arc<TagHelperDescriptor>> for TagHelperCollection {
    fn from_iter<T: IntoIterator<Item = Arc<TagHelperDescriptor>>>(iter: T) -> Self {
        let mut builder = TagHelperCollectionBuilder::new();
        builder.extend(iter);
        builder.build()
    }
}

impl FromIterator<TagHelperDescriptor> for TagHelperCollection {
    fn from_iter<T: IntoIterator<Item = TagHelperDescriptor>>(iter: T) -> Self {
        iter.into_iter().map(Arc::new).collect()
    }
}

impl PartialEq for TagHelperCollection {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for TagHelperCollection {}

impl Hash for TagHelperCollection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

impl fmt::Debug for TagHelperCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.items.iter().map(|item| item.name()))
            .finish()
    }
}

/// Collects descriptors in insertion order, dropping any already seen by value.
#[derive(Default)]
pub struct TagHelperCollectionBuilder {
    items: IndexMap<Checksum, Arc<TagHelperDescriptor>>,
}

impl TagHelperCollectionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor; returns `false` when an equal one is already present.
    pub fn add(&mut self, descriptor: impl Into<Arc<TagHelperDescriptor>>) -> bool {
        let descriptor = descriptor.into();
        let checksum = descriptor.checksum();
        if self.items.contains_key(&checksum) {
            return false;
        }
        self.items.insert(checksum, descriptor);
        true
    }

    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = Arc<TagHelperDescriptor>>) {
        for descriptor in descriptors {
            self.add(descriptor);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn build(self) -> TagHelperCollection {
        let mut checksum = ChecksumBuilder::new();
        checksum.append_len(self.items.len());
        for key in self.items.keys() {
            checksum.append_checksum(*key);
        }

        TagHelperCollection {
            items: self.items.into_values().collect(),
            checksum: checksum.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::TagHelperDescriptorBuilder;

    fn helper(name: &str, tag: &str) -> TagHelperDescriptor {
        let tag = tag.to_string();
        TagHelperDescriptorBuilder::tag_helper(name, "TestAssembly")
            .tag_matching_rule(|rule| rule.tag_name(tag))
            .build()
    }

    #[test]
    fn test_builder_deduplicates_by_value() {
        let mut builder = TagHelperCollection::builder();
        assert!(builder.add(helper("A", "a")));
        assert!(builder.add(helper("B", "b")));
        assert!(!builder.add(helper("A", "a")));

        let collection = builder.build();
        let names: Vec<_> = collection.iter().map(|d| d.name()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_value_equal_collections_compare_equal() {
        let first: TagHelperCollection = [helper("A", "a"), helper("B", "b")].into_iter().collect();
        let second: TagHelperCollection = [helper("A", "a"), helper("B", "b")].into_iter().collect();
        assert!(!first.ptr_eq(&second));
        assert_eq!(first, second);

        let reordered: TagHelperCollection = [helper("B", "b"), helper("A", "a")].into_iter().collect();
        assert_ne!(first, reordered);
    }

    #[test]
    fn test_contains_uses_value_equality() {
        let collection: TagHelperCollection = [helper("A", "a")].into_iter().collect();
        assert!(collection.contains(&helper("A", "a")));
        assert!(!collection.contains(&helper("A", "b")));
    }

    #[test]
    fn test_empty_collections_are_equal() {
        assert_eq!(TagHelperCollection::empty(), TagHelperCollection::default());
        assert!(TagHelperCollection::empty().is_empty());
    }
}
