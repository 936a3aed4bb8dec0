//! Bulk operations over whole [`HashTable`]s.
//!
//! These walk the index table of one table and either probe another table for
//! each live row, or copy rows wholesale into a new table. Rows copied into a
//! table built from the same key semantics keep their stored hash, so only
//! probes into a *different* table hash keys again.

use alloc::vec::Vec;

use crate::error::Result;
use crate::hash_table::HashTable;
use crate::hash_table::scramble;

impl<K, V> HashTable<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Returns a copy of `self` with every entry of `other` inserted into it.
    ///
    /// `rehash` hashes keys of `other` with `self`'s key semantics, and
    /// `merge(stored, incoming)` resolves keys present in both.
    pub(crate) fn try_merge(
        &self,
        other: &HashTable<K, V>,
        rehash: impl Fn(&K) -> u64,
        eq: impl Fn(&K, &K) -> bool,
        mut merge: impl FnMut(&mut V, V),
    ) -> Result<Self> {
        let mut result = self.clone();
        result.try_grow(
            self.len()
                .saturating_add(other.len())
                .min(crate::MAX_CAPACITY),
        )?;

        for row in other.rows().iter().filter(|row| row.is_populated()) {
            let (key, value) = &other.entries()[row.entry_index()];
            result.try_insert_scrambled(
                scramble(rehash(key)),
                key.clone(),
                value.clone(),
                &eq,
                |stored, incoming| merge(stored, incoming),
            )?;
        }

        Ok(result)
    }

    /// Builds a table holding the entries of `self` whose key is found in
    /// `other` exactly when `keep_found` is `true`.
    ///
    /// `probe_hash` and `probe_eq` are `other`'s key semantics. Several keys
    /// of `self` may match one key of `other` under those semantics, so the
    /// result is sized for every entry of `self` either way.
    pub(crate) fn combine<V2>(
        &self,
        other: &HashTable<K, V2>,
        probe_hash: impl Fn(&K) -> u64,
        probe_eq: impl Fn(&K, &K) -> bool,
        keep_found: bool,
    ) -> Self {
        let mut result = HashTable::with_capacity(self.len());

        for row in self.rows().iter().filter(|row| row.is_populated()) {
            let (key, value) = &self.entries()[row.entry_index()];
            let found = other
                .find_scrambled(scramble(probe_hash(key)), |k| probe_eq(key, k))
                .is_some();
            if found == keep_found {
                result.push_unique(row.hash(), key.clone(), value.clone());
            }
        }

        result
    }

    /// Partitions the table into at most `parts` tables by slicing the index
    /// table into contiguous blocks of rows.
    ///
    /// The last block absorbs the remainder, and blocks without live rows
    /// produce no table.
    pub(crate) fn split(&self, parts: usize) -> Vec<Self> {
        let parts = parts.max(1).min(self.len());
        if parts == 0 {
            return Vec::new();
        }
        if parts == 1 {
            return alloc::vec![self.clone()];
        }

        let rows = self.rows();
        let block = rows.len() / parts;
        let mut tables = Vec::with_capacity(parts);

        for p in 0..parts {
            let start = p * block;
            let end = if p == parts - 1 { rows.len() } else { start + block };
            let block_rows = &rows[start..end];

            let populated = block_rows.iter().filter(|row| row.is_populated()).count();
            if populated == 0 {
                continue;
            }

            let mut table = HashTable::with_capacity(populated);
            for row in block_rows.iter().filter(|row| row.is_populated()) {
                let (key, value) = &self.entries()[row.entry_index()];
                table.push_unique(row.hash(), key.clone(), value.clone());
            }
            tables.push(table);
        }

        tables
    }
}

impl<K, V> HashTable<K, V> {
    /// Returns `true` if every key of `self` is found in `other`.
    ///
    /// `probe_hash` and `probe_eq` are `other`'s key semantics.
    pub(crate) fn is_subset<V2>(
        &self,
        other: &HashTable<K, V2>,
        probe_hash: impl Fn(&K) -> u64,
        probe_eq: impl Fn(&K, &K) -> bool,
    ) -> bool {
        self.rows()
            .iter()
            .filter(|row| row.is_populated())
            .all(|row| {
                let key = &self.entries()[row.entry_index()].0;
                other
                    .find_scrambled(scramble(probe_hash(key)), |k| probe_eq(key, k))
                    .is_some()
            })
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::hash_table::tests::HashState;
    use crate::hash_table::tests::check_invariants;

    fn build(state: &HashState, keys: impl IntoIterator<Item = u64>) -> HashTable<u64, u64> {
        let mut table = HashTable::with_capacity(0);
        for k in keys {
            table.insert_with(state.hash(&k), k, k * 10, |a, b| a == b, |old, new| {
                *old = new
            });
        }
        table
    }

    fn sorted_keys<V>(table: &HashTable<u64, V>) -> Vec<u64> {
        let mut keys: Vec<u64> = table.entries().iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn merge_keeps_both_sides() {
        let state = HashState::default();
        let a = build(&state, 0..50);
        let b = build(&state, 25..100);

        let merged = a
            .try_merge(&b, |k| state.hash(k), |x, y| x == y, |old, new| *old += new)
            .unwrap();
        assert_eq!(merged.len(), 100);
        assert_eq!(sorted_keys(&merged), (0..100).collect::<Vec<_>>());
        for (k, v) in merged.entries() {
            let expected = if (25..50).contains(k) { k * 20 } else { k * 10 };
            assert_eq!(*v, expected, "key {k}");
        }
        check_invariants(&merged, |k| state.hash(k));

        // inputs untouched
        assert_eq!(a.len(), 50);
        assert_eq!(b.len(), 75);
    }

    #[test]
    fn combine_partitions_keys() {
        let state = HashState::default();
        let a = build(&state, 0..40);
        let b = build(&state, 30..60);

        let inter = a.combine(&b, |k| state.hash(k), |x, y| x == y, true);
        let diff = a.combine(&b, |k| state.hash(k), |x, y| x == y, false);

        assert_eq!(sorted_keys(&inter), (30..40).collect::<Vec<_>>());
        assert_eq!(sorted_keys(&diff), (0..30).collect::<Vec<_>>());
        check_invariants(&inter, |k| state.hash(k));
        check_invariants(&diff, |k| state.hash(k));
    }

    #[test]
    fn intersection_with_coarser_equality() {
        let state = HashState::default();
        let mut a: HashTable<u64, u64> = HashTable::with_capacity(0);
        for k in 0..40u64 {
            a.insert_with(state.hash(&k), k, k, |x, y| x == y, |_, _| {});
        }
        // `other` sees keys equal modulo 10, so one of its keys matches four of `a`
        let mut b: HashTable<u64, ()> = HashTable::with_capacity(0);
        for k in [3u64, 7] {
            b.insert_with(k % 10, k, (), |x, y| x % 10 == y % 10, |_, _| {});
        }

        let inter = a.combine(&b, |k| k % 10, |x, y| x % 10 == y % 10, true);
        assert_eq!(inter.len(), 8);
        assert!(inter.entries().iter().all(|(k, _)| k % 10 == 3 || k % 10 == 7));
        check_invariants(&inter, |k| state.hash(k));
    }

    #[test]
    fn subset() {
        let state = HashState::default();
        let small = build(&state, 10..20);
        let big = build(&state, 0..100);

        assert!(small.is_subset(&big, |k| state.hash(k), |x, y| x == y));
        assert!(!big.is_subset(&small, |k| state.hash(k), |x, y| x == y));
        assert!(small.is_subset(&small, |k| state.hash(k), |x, y| x == y));

        let empty = build(&state, []);
        assert!(empty.is_subset(&small, |k| state.hash(k), |x, y| x == y));
    }

    #[test]
    fn split_covers_every_entry_once() {
        let state = HashState::default();
        let table = build(&state, 0..1000);

        for parts in [1, 2, 3, 7, 16, 64] {
            let split = table.split(parts);
            assert!(split.len() <= parts);
            assert!(split.iter().all(|t| !t.is_empty()));

            let mut keys: Vec<u64> = split.iter().flat_map(sorted_keys).collect();
            keys.sort_unstable();
            assert_eq!(keys, (0..1000).collect::<Vec<_>>(), "parts = {parts}");

            for t in &split {
                check_invariants(t, |k| state.hash(k));
            }
        }
    }

    #[test]
    fn split_small_tables() {
        let state = HashState::default();
        assert!(build(&state, []).split(4).is_empty());
        assert_eq!(build(&state, [1]).split(4).len(), 1);
        assert_eq!(build(&state, [1, 2, 3]).split(0).len(), 1);
        assert!(build(&state, [1, 2, 3]).split(3).len() <= 3);
    }
}
