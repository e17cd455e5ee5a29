//! Key/value pair list data model.
//!
//! A list is stored on disk as an array of single-key objects:
//! `[{"a": "1"}, {"": ""}]`. In memory every entry is an explicit pair.

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single key/value pair. An empty key means "not yet named".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = Entry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object with exactly one string key")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Entry, A::Error> {
                let Some((key, value)) = map.next_entry::<String, String>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };
                if let Some(extra) = map.next_key::<String>()? {
                    map.next_value::<IgnoredAny>()?;
                    return Err(de::Error::custom(format!(
                        "entry '{key}' has a second key '{extra}'"
                    )));
                }
                Ok(Entry { key, value })
            }
        }

        deserializer.deserialize_map(EntryVisitor)
    }
}

/// An ordered list of entries. Updates never modify `self`; they build a new list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairList(Vec<Entry>);

impl PairList {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self(entries)
    }

    /// The cleared list: a single unnamed, empty entry.
    pub fn blank() -> Self {
        Self(vec![Entry::default()])
    }

    pub fn entries(&self) -> &[Entry] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the last entry, which carries the append control.
    pub fn last_index(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    /// Returns a copy with the key at `index` replaced, keeping its value.
    pub fn with_key(&self, index: usize, key: impl Into<String>) -> Option<Self> {
        let entry = self.0.get(index)?;
        let replaced = Entry::new(key, entry.value.clone());
        Some(self.replacing(index, replaced))
    }

    /// Returns a copy with the value at `index` replaced, keeping its key.
    pub fn with_value(&self, index: usize, value: impl Into<String>) -> Option<Self> {
        let entry = self.0.get(index)?;
        let replaced = Entry::new(entry.key.clone(), value);
        Some(self.replacing(index, replaced))
    }

    /// Returns a copy with an empty entry at the end.
    pub fn appended(&self) -> Self {
        let mut entries = Vec::with_capacity(self.0.len() + 1);
        entries.extend(self.0.iter().cloned());
        entries.push(Entry::default());
        Self::new(entries)
    }

    /// Returns a copy without the entry at `index`.
    pub fn without(&self, index: usize) -> Option<Self> {
        if index >= self.0.len() {
            return None;
        }
        let entries = self
            .0
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, e)| e.clone())
            .collect();
        Some(Self::new(entries))
    }

    fn replacing(&self, index: usize, replacement: Entry) -> Self {
        let entries = self
            .0
            .iter()
            .enumerate()
            .map(|(i, e)| if i == index { replacement.clone() } else { e.clone() })
            .collect();
        Self(entries)
    }

    /// Whether two entries share a non-empty key (compared after trimming).
    pub fn has_duplicate_keys(&self) -> bool {
        let mut seen = HashSet::new();
        self.0
            .iter()
            .map(|e| e.key.trim())
            .filter(|k| !k.is_empty())
            .any(|k| !seen.insert(k))
    }

    /// Flattens the list into a JSON object. Later entries win; unnamed entries are skipped.
    pub fn to_object(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for entry in self.0.iter().filter(|e| !e.key.is_empty()) {
            map.insert(entry.key.clone(), Value::String(entry.value.clone()));
        }
        map
    }
}
