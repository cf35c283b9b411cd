//! Ordered keyed collection of child states
//!
//! [`KeyedList`] holds (key, element) pairs in insertion order with O(1)
//! amortized lookup by key. Keys are unique and stable across mutation;
//! iteration order is the insertion order, which is what a list UI renders.
//!
//! The [`ForEach`] combinator routes element actions through this container
//! and diffs its key set before/after the parent reducer runs to detect
//! removed elements.
//!
//! [`ForEach`]: crate::ForEach

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::Index;

use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// An ordered sequence of (key, element) pairs with unique keys.
#[derive(Clone)]
pub struct KeyedList<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> KeyedList<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert an element.
    ///
    /// If the key is already present the element is replaced in place and
    /// the old value returned; the key keeps its position. Otherwise the
    /// pair is appended.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&at) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[at].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Look up an element by key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&at| &self.entries[at].1)
    }

    /// Look up an element by key, mutably.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let at = *self.index.get(key)?;
        Some(&mut self.entries[at].1)
    }

    /// Remove an element by key, preserving the order of the rest.
    ///
    /// Returns `None` if the key is absent.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let at = self.index.remove(key)?;
        let (_, value) = self.entries.remove(at);
        for slot in self.index.values_mut() {
            if *slot > at {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Whether the key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// (key, element) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// (key, element) pairs in insertion order, elements mutable.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.entries.iter_mut().map(|(key, value)| (&*key, value))
    }

    /// Elements in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all elements.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Keep only the elements for which the predicate holds, preserving
    /// order.
    pub fn retain(&mut self, mut keep: impl FnMut(&K, &mut V) -> bool) {
        self.entries.retain_mut(|(key, value)| keep(key, value));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (at, (key, _)) in self.entries.iter().enumerate() {
            self.index.insert(key.clone(), at);
        }
    }
}

impl<K: Clone + Eq + Hash, V> Default for KeyedList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for KeyedList<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, value)| (key, value)))
            .finish()
    }
}

impl<K, V> PartialEq for KeyedList<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq> Eq for KeyedList<K, V> {}

impl<K: Clone + Eq + Hash, V> FromIterator<(K, V)> for KeyedList<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<K: Clone + Eq + Hash, V> Extend<(K, V)> for KeyedList<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for KeyedList<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a KeyedList<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (K, V)>, fn(&'a (K, V)) -> (&'a K, &'a V)>;

    fn into_iter(self) -> Self::IntoIter {
        let project: fn(&'a (K, V)) -> (&'a K, &'a V) = |(key, value)| (key, value);
        self.entries.iter().map(project)
    }
}

impl<K: Clone + Eq + Hash, V> Index<&K> for KeyedList<K, V> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no element for key")
    }
}

impl<K, V> Serialize for KeyedList<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

impl<'de, K, V> Deserialize<'de> for KeyedList<K, V>
where
    K: Clone + Eq + Hash + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ListVisitor<K, V>(std::marker::PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for ListVisitor<K, V>
        where
            K: Clone + Eq + Hash + Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = KeyedList<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence of (key, element) pairs")
            }

            fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
                let mut list = KeyedList::new();
                while let Some((key, value)) = seq.next_element::<(K, V)>()? {
                    list.insert(key, value);
                }
                Ok(list)
            }
        }

        deserializer.deserialize_seq(ListVisitor(std::marker::PhantomData))
    }
}
