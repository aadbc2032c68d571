use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Index;

use thiserror::Error;

use crate::checksum::Checksum;
use crate::checksum::ChecksumBuilder;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("An item with the same key has already been added. Key: {0}")]
    DuplicateKey(String),
    #[error("The given key '{0}' was not present in the metadata collection.")]
    KeyNotFound(String),
}

type Entry = (String, Option<String>);

/// Maximum number of entries stored inline before switching to sorted arrays.
const INLINE_CAPACITY: usize = 3;

/// An immutable string map attached to descriptors.
///
/// Entries are sorted by key at construction. Up to three entries live in an
/// inline array scanned linearly; larger collections keep parallel key and value
/// arrays searched with a binary search. Equality and hashing use a checksum over
/// the sorted pairs, so construction order and representation never matter.
#[derive(Clone)]
pub struct MetadataCollection {
    storage: Storage,
    checksum: Checksum,
}

#[derive(Clone)]
enum Storage {
    Empty,
    Inline {
        len: usize,
        entries: [Entry; INLINE_CAPACITY],
    },
    Sorted {
        keys: Box<[String]>,
        values: Box<[Option<String>]>,
    },
}

impl MetadataCollection {
    /// Build a collection from key/value pairs in any order.
    pub fn new<I, K, V>(pairs: I) -> Result<Self, MetadataError>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<Entry> = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.map(Into::into)))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        if let Some(window) = entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(MetadataError::DuplicateKey(window[0].0.clone()));
        }

        Ok(Self::from_sorted_unique(entries))
    }

    /// Build from entries already sorted by key with no duplicates.
    pub(crate) fn from_sorted_unique(entries: Vec<Entry>) -> Self {
        debug_assert!(entries.windows(2).all(|pair| pair[0].0 < pair[1].0));

        let checksum = Self::compute_checksum(&entries);
        let storage = match entries.len() {
            0 => Storage::Empty,
            len if len <= INLINE_CAPACITY => {
                let mut inline: [Entry; INLINE_CAPACITY] = Default::default();
                for (slot, entry) in inline.iter_mut().zip(entries) {
                    *slot = entry;
                }
                Storage::Inline {
                    len,
                    entries: inline,
                }
            }
            _ => {
                let (keys, values): (Vec<String>, Vec<Option<String>>) =
                    entries.into_iter().unzip();
                Storage::Sorted {
                    keys: keys.into_boxed_slice(),
                    values: values.into_boxed_slice(),
                }
            }
        };

        Self { storage, checksum }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            storage: Storage::Empty,
            checksum: Self::compute_checksum(&[]),
        }
    }

    fn compute_checksum(entries: &[Entry]) -> Checksum {
        let mut builder = ChecksumBuilder::new();
        builder.append_len(entries.len());
        for (key, value) in entries {
            builder.append_str(key).append_opt_str(value.as_deref());
        }
        builder.finish()
    }

    fn position(&self, key: &str) -> Option<usize> {
        match &self.storage {
            Storage::Empty => None,
            Storage::Inline { len, entries } => entries[..*len].iter().position(|(k, _)| k == key),
            Storage::Sorted { keys, .. } => keys.binary_search_by(|k| k.as_str().cmp(key)).ok(),
        }
    }

    fn entry(&self, index: usize) -> (&str, &Option<String>) {
        match &self.storage {
            Storage::Empty => unreachable!("empty metadata has no entries"),
            Storage::Inline { entries, .. } => (entries[index].0.as_str(), &entries[index].1),
            Storage::Sorted { keys, values } => (keys[index].as_str(), &values[index]),
        }
    }

    /// `None` when the key is absent, `Some(None)` when it maps to a null value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.position(key)
            .map(|index| self.entry(index).1.as_deref())
    }

    pub fn value(&self, key: &str) -> Result<Option<&str>, MetadataError> {
        self.get(key)
            .ok_or_else(|| MetadataError::KeyNotFound(key.to_string()))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Whether `key` is present with the value `"True"` (ASCII-case-insensitive).
    #[must_use]
    pub fn is_true(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Some(value)) if value.eq_ignore_ascii_case("true"))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Empty => 0,
            Storage::Inline { len, .. } => *len,
            Storage::Sorted { keys, .. } => keys.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in ascending ordinal order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).map(|index| self.entry(index).0)
    }

    /// Pairs in ascending ordinal key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        (0..self.len()).map(|index| {
            let (key, value) = self.entry(index);
            (key, value.as_deref())
        })
    }

    #[must_use]
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }
}

impl Default for MetadataCollection {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<&str> for MetadataCollection {
    type Output = Option<String>;

    fn index(&self, key: &str) -> &Self::Output {
        match self.position(key) {
            Some(index) => self.entry(index).1,
            None => panic!("{}", MetadataError::KeyNotFound(key.to_string())),
        }
    }
}

impl PartialEq for MetadataCollection {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for MetadataCollection {}

impl Hash for MetadataCollection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

impl fmt::Debug for MetadataCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(count: usize) -> Vec<(String, Option<String>)> {
        (0..count)
            .map(|i| (format!("key{i}"), Some(format!("value{i}"))))
            .collect()
    }

    #[test]
    fn test_keys_are_sorted_regardless_of_input_order() {
        let metadata = MetadataCollection::new([
            ("delta", Some("4")),
            ("alpha", Some("1")),
            ("echo", Some("5")),
            ("charlie", Some("3")),
            ("bravo", Some("2")),
        ])
        .unwrap();

        let keys: Vec<_> = metadata.keys().collect();
        assert_eq!(keys, ["alpha", "bravo", "charlie", "delta", "echo"]);
        assert_eq!(metadata["charlie"].as_deref(), Some("3"));
    }

    #[test]
    #[should_panic(expected = "missing-key")]
    fn test_index_missing_key_panics() {
        let metadata = MetadataCollection::new(pairs(5)).unwrap();
        let _ = &metadata["missing-key"];
    }

    #[test]
    fn test_value_missing_key_errors() {
        let metadata = MetadataCollection::new(pairs(2)).unwrap();
        assert_eq!(
            metadata.value("missing-key"),
            Err(MetadataError::KeyNotFound("missing-key".to_string()))
        );
        assert_eq!(metadata.value("key1"), Ok(Some("value1")));
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        for size in [2, 3, 6] {
            let mut entries = pairs(size);
            entries.push(("key0".to_string(), None));
            assert_eq!(
                MetadataCollection::new(entries).unwrap_err(),
                MetadataError::DuplicateKey("key0".to_string())
            );
        }
    }

    #[test]
    fn test_null_values_are_distinct_from_missing() {
        let metadata = MetadataCollection::new([("present", None::<String>)]).unwrap();
        assert_eq!(metadata.get("present"), Some(None));
        assert_eq!(metadata.get("absent"), None);
        assert!(metadata.contains_key("present"));
    }

    #[test]
    fn test_equality_ignores_construction_order() {
        for size in 0..=6 {
            let forward = MetadataCollection::new(pairs(size)).unwrap();
            let mut reversed_pairs = pairs(size);
            reversed_pairs.reverse();
            let reversed = MetadataCollection::new(reversed_pairs).unwrap();

            assert_eq!(forward, reversed);
            assert_eq!(forward.checksum(), reversed.checksum());
            assert_eq!(forward.len(), size);
        }
    }

    #[test]
    fn test_lookup_in_every_representation() {
        for size in 1..=6 {
            let metadata = MetadataCollection::new(pairs(size)).unwrap();
            for i in 0..size {
                let expected = format!("value{i}");
                assert_eq!(
                    metadata.get(&format!("key{i}")),
                    Some(Some(expected.as_str()))
                );
            }
            assert_eq!(metadata.get("zzz"), None);
        }
    }

    #[test]
    fn test_empty_matches_default() {
        let built = MetadataCollection::new(Vec::<(String, Option<String>)>::new()).unwrap();
        assert_eq!(built, MetadataCollection::default());
        assert!(built.is_empty());
    }
}
