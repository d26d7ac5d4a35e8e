//! Sparse counting map keyed by type identifiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sparse mapping from a typed key to an integer count.
///
/// Absent keys count as zero. [`increment_count`](Self::increment_count)
/// never leaves a zero entry behind: a delta that brings a stored count to
/// zero removes the key. [`put_all`](Self::put_all) is a raw overwrite and
/// may store zeros.
///
/// Keys iterate in ascending order so that any computation driven by the map
/// is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCountMap<K: Ord> {
    values: BTreeMap<K, i32>,
}

impl<K: Ord> Default for TypeCountMap<K> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> TypeCountMap<K> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for a key, zero if absent.
    #[must_use]
    pub fn count(&self, key: K) -> i32 {
        self.values.get(&key).copied().unwrap_or(0)
    }

    /// Add `delta` to the count for `key`.
    ///
    /// Returns the previously stored value, if any. A zero delta on an
    /// absent key stores nothing. Counts saturate at the `i32` range.
    pub fn increment_count(&mut self, key: K, delta: i32) -> Option<i32> {
        match self.values.get(&key).copied() {
            None => {
                if delta != 0 {
                    self.values.insert(key, delta);
                }
                None
            }
            Some(old) => {
                let new = old.saturating_add(delta);
                if new == 0 {
                    self.values.remove(&key);
                } else {
                    self.values.insert(key, new);
                }
                Some(old)
            }
        }
    }

    /// Increment this map by every entry of `other`.
    pub fn add(&mut self, other: &Self) {
        for (&key, &value) in &other.values {
            self.increment_count(key, value);
        }
    }

    /// Overwrite entries with those of `other`, without increment semantics.
    pub fn put_all(&mut self, other: &Self) {
        for (&key, &value) in &other.values {
            self.values.insert(key, value);
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Whether the key has a stored entry.
    #[must_use]
    pub fn contains_key(&self, key: K) -> bool {
        self.values.contains_key(&key)
    }

    /// Stored keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.values.keys().copied()
    }

    /// Stored counts in key order.
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.values().copied()
    }

    /// Stored `(key, count)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, i32)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<K: Ord + Copy> FromIterator<(K, i32)> for TypeCountMap<K> {
    fn from_iter<I: IntoIterator<Item = (K, i32)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, delta) in iter {
            map.increment_count(key, delta);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goods::GoodsTypeId;

    const LUMBER: GoodsTypeId = GoodsTypeId(3);
    const TOOLS: GoodsTypeId = GoodsTypeId(5);

    #[test]
    fn test_absent_key_counts_zero() {
        let map: TypeCountMap<GoodsTypeId> = TypeCountMap::new();
        assert_eq!(map.count(LUMBER), 0);
        assert!(!map.contains_key(LUMBER));
        assert!(map.is_empty());
    }

    #[test]
    fn test_increment_returns_previous() {
        let mut map = TypeCountMap::new();
        assert_eq!(map.increment_count(LUMBER, 10), None);
        assert_eq!(map.increment_count(LUMBER, -4), Some(10));
        assert_eq!(map.count(LUMBER), 6);
    }

    #[test]
    fn test_cancelling_increment_removes_key() {
        let mut map = TypeCountMap::new();
        map.increment_count(LUMBER, 10);
        assert_eq!(map.increment_count(LUMBER, -10), Some(10));
        assert!(!map.contains_key(LUMBER));
        assert_eq!(map.count(LUMBER), 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_overshooting_decrement_keeps_negative() {
        let mut map = TypeCountMap::new();
        map.increment_count(LUMBER, 7);
        map.increment_count(LUMBER, -10);
        assert_eq!(map.count(LUMBER), -3);
        assert!(map.contains_key(LUMBER));
    }

    #[test]
    fn test_increment_saturates() {
        let mut map = TypeCountMap::new();
        map.increment_count(LUMBER, i32::MAX - 1);
        map.increment_count(LUMBER, 10);
        assert_eq!(map.count(LUMBER), i32::MAX);

        map.increment_count(TOOLS, i32::MIN);
        map.increment_count(TOOLS, -1);
        assert_eq!(map.count(TOOLS), i32::MIN);
    }

    #[test]
    fn test_zero_delta_on_absent_key_stores_nothing() {
        let mut map = TypeCountMap::new();
        map.increment_count(TOOLS, 0);
        assert!(!map.contains_key(TOOLS));
    }

    #[test]
    fn test_add_merges_by_increment() {
        let mut a: TypeCountMap<GoodsTypeId> = [(LUMBER, 5), (TOOLS, 2)].into_iter().collect();
        let b: TypeCountMap<GoodsTypeId> = [(LUMBER, -5), (TOOLS, 3)].into_iter().collect();

        a.add(&b);

        assert!(!a.contains_key(LUMBER));
        assert_eq!(a.count(TOOLS), 5);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_put_all_overwrites() {
        let mut a: TypeCountMap<GoodsTypeId> = [(LUMBER, 5), (TOOLS, 2)].into_iter().collect();
        let mut b = TypeCountMap::new();
        b.increment_count(LUMBER, 40);

        a.put_all(&b);

        assert_eq!(a.count(LUMBER), 40);
        assert_eq!(a.count(TOOLS), 2);
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let map: TypeCountMap<GoodsTypeId> = [(TOOLS, 1), (LUMBER, 2), (GoodsTypeId(0), 3)]
            .into_iter()
            .collect();

        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec![GoodsTypeId(0), LUMBER, TOOLS]);
        let values: Vec<_> = map.values().collect();
        assert_eq!(values, vec![3, 2, 1]);
    }

    #[test]
    fn test_clear() {
        let mut map: TypeCountMap<GoodsTypeId> = [(TOOLS, 1)].into_iter().collect();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }
}
