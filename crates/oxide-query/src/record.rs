//! Insertion-ordered record.
//!
//! `OrderedRecord` is the currency shared by every stage: the filter compiler
//! returns its bind arguments in one, the rewriter looks placeholders up in
//! one, and callers use it for result rows.
//!
//! ```rust
//! use oxide_query::{OrderedRecord, SqlValue};
//!
//! let mut record = OrderedRecord::new();
//! record.insert(":b", SqlValue::Int(2));
//! record.insert(":a", SqlValue::Int(1));
//! record.insert(":b", SqlValue::Int(3));
//!
//! let keys: Vec<&str> = record.keys().collect();
//! assert_eq!(keys, vec![":b", ":a"]);
//! assert_eq!(record.get(":b"), Some(&SqlValue::Int(3)));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::SqlValue;

const UNDECLARED_LABEL: &str = "[Undeclared]";

/// A string-keyed map that iterates in first-insertion order.
///
/// Re-inserting an existing key replaces the value in place; removing a key
/// and inserting it again moves it to the end.
#[derive(Clone, PartialEq)]
pub struct OrderedRecord<V = SqlValue> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
    label: Option<String>,
}

impl<V> OrderedRecord<V> {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            label: None,
        }
    }

    /// Creates an empty record with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            label: None,
        }
    }

    /// Returns the label (usually the table the record belongs to).
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(UNDECLARED_LABEL)
    }

    /// Sets the label.
    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        if let Some(&pos) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[pos].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Returns a mutable reference to the value for a key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let pos = *self.index.get(key)?;
        Some(&mut self.entries[pos].1)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry; the label is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &V)> + ExactSizeIterator {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Returns the oldest entry.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &V)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the newest entry.
    #[must_use]
    pub fn last(&self) -> Option<(&str, &V)> {
        self.entries.last().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys with every `:` removed.
    #[must_use]
    pub fn keys_without_colon(&self) -> Vec<String> {
        self.keys().map(|k| k.replace(':', "")).collect()
    }

    /// Keys prefixed with `:` unless they already start with `:` or `@`.
    #[must_use]
    pub fn keys_with_colon(&self) -> Vec<String> {
        self.keys()
            .map(|k| {
                if k.starts_with(':') || k.starts_with('@') {
                    String::from(k)
                } else {
                    format!(":{k}")
                }
            })
            .collect()
    }

    /// Keys joined with `delimiter`.
    #[must_use]
    pub fn keys_joined(&self, delimiter: &str) -> String {
        self.keys().collect::<Vec<_>>().join(delimiter)
    }
}

impl<V: Clone> OrderedRecord<V> {
    /// Copies every entry of `other` into this record.
    pub fn extend_from(&mut self, other: &Self) -> &mut Self {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
        self
    }
}

impl<V: fmt::Display> OrderedRecord<V> {
    /// Display form of a value, or an empty string when absent.
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.get_string_or(key, "")
    }

    /// Display form of a value, or `fallback` when absent or empty.
    #[must_use]
    pub fn get_string_or(&self, key: &str, fallback: &str) -> String {
        match self.get(key).map(ToString::to_string) {
            Some(s) if !s.is_empty() => s,
            _ => String::from(fallback),
        }
    }
}

impl<V> Default for OrderedRecord<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for OrderedRecord<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Index<&str> for OrderedRecord<V> {
    type Output = V;

    fn index(&self, key: &str) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in record: {key}"),
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedRecord<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        record.extend(iter);
        record
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for OrderedRecord<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<V> IntoIterator for OrderedRecord<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

type PairRef<'a, V> = fn(&'a (String, V)) -> (&'a str, &'a V);

impl<'a, V> IntoIterator for &'a OrderedRecord<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (String, V)>, PairRef<'a, V>>;

    fn into_iter(self) -> Self::IntoIter {
        let as_pair: PairRef<'a, V> = |entry| (entry.0.as_str(), &entry.1);
        self.entries.iter().map(as_pair)
    }
}

/// Serializes as a JSON object in insertion order.
impl<V: Serialize> Serialize for OrderedRecord<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrderedRecord {
        let mut record = OrderedRecord::new();
        record.insert("c", SqlValue::Int(3));
        record.insert("a", SqlValue::Int(1));
        record.insert("b", SqlValue::Int(2));
        record
    }

    #[test]
    fn test_iteration_follows_insertion() {
        let record = sample();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut record = sample();
        let old = record.insert("c", SqlValue::Int(30));
        assert_eq!(old, Some(SqlValue::Int(3)));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(record["c"], SqlValue::Int(30));
    }

    #[test]
    fn test_remove_and_reinsert_moves_to_end() {
        let mut record = sample();
        assert_eq!(record.remove("c"), Some(SqlValue::Int(3)));
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("b"), Some(&SqlValue::Int(2)));
        record.insert("c", SqlValue::Int(4));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(record.get("a"), Some(&SqlValue::Int(1)));
    }

    #[test]
    fn test_remove_missing() {
        let mut record = sample();
        assert_eq!(record.remove("zzz"), None);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_clone_is_independent() {
        let record = sample();
        let mut copy = record.clone();
        copy.insert("d", SqlValue::Int(4));
        assert_eq!(record.len(), 3);
        assert_eq!(copy.len(), 4);
    }

    #[test]
    fn test_extend_from() {
        let mut record = sample();
        let other: OrderedRecord = [("a", SqlValue::Int(10)), ("z", SqlValue::Null)]
            .into_iter()
            .collect();
        record.extend_from(&other);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["c", "a", "b", "z"]);
        assert_eq!(record["a"], SqlValue::Int(10));
    }

    #[test]
    fn test_key_views() {
        let mut record: OrderedRecord = OrderedRecord::new();
        record.insert(":name", SqlValue::Null);
        record.insert("age", SqlValue::Null);
        record.insert("@id", SqlValue::Null);
        assert_eq!(record.keys_without_colon(), vec!["name", "age", "@id"]);
        assert_eq!(record.keys_with_colon(), vec![":name", ":age", "@id"]);
        assert_eq!(record.keys_joined(","), ":name,age,@id");
    }

    #[test]
    fn test_string_getters() {
        let mut record = sample();
        record.insert("empty", SqlValue::Null);
        assert_eq!(record.get_string("a"), "1");
        assert_eq!(record.get_string("missing"), "");
        assert_eq!(record.get_string_or("empty", "n/a"), "n/a");
    }

    #[test]
    fn test_label() {
        let mut record = sample();
        assert_eq!(record.label(), "[Undeclared]");
        record.set_label("users");
        assert_eq!(record.label(), "users");
    }

    #[test]
    fn test_serialize_preserves_order() {
        let record = sample();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"c":3,"a":1,"b":2}"#
        );
    }
}
