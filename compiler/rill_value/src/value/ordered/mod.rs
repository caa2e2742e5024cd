//! Insertion-ordered hash index.
//!
//! Backs Object values and the Map/Set native resources. Lookups go through
//! a hash index from key to slot; iteration walks the slot sequence, so it
//! follows insertion order regardless of hash order.
//!
//! # Deletion
//!
//! Removing a key leaves a tombstone in its slot. Once tombstones outnumber
//! live entries the sequence is compacted and the index rebuilt, which keeps
//! deletion O(1) amortized without disturbing the order of the survivors.

use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Compaction is skipped below this many slots.
const MIN_COMPACT_SLOTS: usize = 16;

/// Hash index with insertion-order iteration.
#[derive(Clone, Debug)]
pub struct OrderedIndex<K, V> {
    slots: Vec<Option<(K, V)>>,
    positions: FxHashMap<K, usize>,
}

impl<K, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        OrderedIndex {
            slots: Vec::new(),
            positions: FxHashMap::default(),
        }
    }
}

impl<K: Hash + Eq + Clone, V> OrderedIndex<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&pos) = self.positions.get(&key) {
            if let Some((_, slot_value)) = self.slots[pos].as_mut() {
                return Some(std::mem::replace(slot_value, value));
            }
        }
        self.positions.insert(key.clone(), self.slots.len());
        self.slots.push(Some((key, value)));
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = *self.positions.get(key)?;
        self.slots[pos].as_ref().map(|(_, v)| v)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = *self.positions.get(key)?;
        self.slots[pos].as_mut().map(|(_, v)| v)
    }

    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.positions.contains_key(key)
    }

    /// Remove a key, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = self.positions.remove(key)?;
        let removed = self.slots[pos].take().map(|(_, v)| v);
        self.maybe_compact();
        removed
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.positions.clear();
    }

    /// Iterate live entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(k, v)| (k, v)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    fn maybe_compact(&mut self) {
        let tombstones = self.slots.len() - self.positions.len();
        if self.slots.len() < MIN_COMPACT_SLOTS || tombstones <= self.positions.len() {
            return;
        }
        self.slots.retain(Option::is_some);
        for (pos, slot) in self.slots.iter().enumerate() {
            if let Some((key, _)) = slot {
                if let Some(entry) = self.positions.get_mut(key) {
                    *entry = pos;
                }
            }
        }
    }
}

impl<K: Hash + Eq + Clone, V> FromIterator<(K, V)> for OrderedIndex<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut index = OrderedIndex::new();
        for (k, v) in iter {
            index.insert(k, v);
        }
        index
    }
}

#[cfg(test)]
mod tests;
