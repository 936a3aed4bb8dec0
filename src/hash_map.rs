use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::MAX_CAPACITY;
use crate::associative::AssociativeMap;
use crate::error::Error;
use crate::error::Result;
use crate::error::fail;
use crate::hash_set::LinearSet;
use crate::hash_table::HashTable;
use crate::key_hasher::KeyHasher;
use crate::key_hasher::Standard;

/// Capacity of maps created without an explicit one.
const DEFAULT_CAPACITY: usize = 16;

/// A single-owner hash map using Robin Hood hashing over a dense entry store.
///
/// `LinearMap<K, V, S>` hashes and compares keys through a [`KeyHasher`]
/// `S`: by default the key's own `Hash` and `Eq` with a [`DefaultHashBuilder`],
/// but any pair of hash and equality functions can be injected with
/// [`FnHasher`].
///
/// Mutating methods take `&mut self` and the chaining ones (`put`, `remove`,
/// `update`) return it. Bulk operations (`merge`, `difference`,
/// `intersection`, `split`) leave their inputs untouched and build new maps.
///
/// # Performance Characteristics
///
/// - **Memory**: 8 bytes per index row (about 1.05 rows per entry, rounded up
///   to a power of two), plus the size of `(K, V)` per entry.
/// - **Clone and iteration**: a copy of, or a walk over, a contiguous array.
///
/// [`FnHasher`]: crate::FnHasher
#[derive(Clone)]
pub struct LinearMap<K, V, S = Standard<DefaultHashBuilder>> {
    table: HashTable<K, V>,
    key_hasher: S,
}

impl<K, V, S> Debug for LinearMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.table.entries().iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<K, V> LinearMap<K, V>
where
    K: Hash + Eq,
{
    /// Creates an empty map with room for 16 entries, using the
    /// [`DefaultHashBuilder`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let map: LinearMap<i32, String> = LinearMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_key_hasher(Standard::default())
    }

    /// Creates an empty map with room for `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is larger than [`MAX_CAPACITY`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let map: LinearMap<i32, String> = LinearMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_key_hasher(capacity, Standard::default())
    }

    /// Creates an empty map with room for `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if `capacity` is larger than
    /// [`MAX_CAPACITY`].
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::try_with_capacity_and_key_hasher(capacity, Standard::default())
    }
}

impl<K, V, S> LinearMap<K, V, Standard<S>>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty map hashing keys with `hash_builder`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::hash_map::RandomState;
    ///
    /// use linear_hash::LinearMap;
    ///
    /// let mut map = LinearMap::with_hasher(RandomState::new());
    /// map.put(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_key_hasher(Standard::new(hash_builder))
    }

    /// Creates an empty map with room for `capacity` entries, hashing keys
    /// with `hash_builder`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is larger than [`MAX_CAPACITY`].
    #[track_caller]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_and_key_hasher(capacity, Standard::new(hash_builder))
    }
}

impl<K, V, S> LinearMap<K, V, S>
where
    S: KeyHasher<K>,
{
    /// Creates an empty map with the given key semantics.
    pub fn with_key_hasher(key_hasher: S) -> Self {
        Self::with_capacity_and_key_hasher(DEFAULT_CAPACITY, key_hasher)
    }

    /// Creates an empty map with room for `capacity` entries and the given
    /// key semantics.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is larger than [`MAX_CAPACITY`].
    #[track_caller]
    pub fn with_capacity_and_key_hasher(capacity: usize, key_hasher: S) -> Self {
        Self::try_with_capacity_and_key_hasher(capacity, key_hasher).unwrap_or_else(|e| fail(e))
    }

    /// Creates an empty map with room for `capacity` entries and the given
    /// key semantics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if `capacity` is larger than
    /// [`MAX_CAPACITY`].
    pub fn try_with_capacity_and_key_hasher(capacity: usize, key_hasher: S) -> Result<Self> {
        Ok(Self {
            table: HashTable::try_with_capacity(capacity)?,
            key_hasher,
        })
    }

    /// Returns the key semantics of the map.
    pub fn key_hasher(&self) -> &S {
        &self.key_hasher
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of entries the map holds before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removes all entries, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Ensures room for `additional` more entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the map would need to hold more
    /// than [`MAX_CAPACITY`] entries. The map is left unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.table.try_reserve(additional)
    }

    /// Ensures room for `additional` more entries.
    ///
    /// # Panics
    ///
    /// Panics if the map would need to hold more than [`MAX_CAPACITY`]
    /// entries.
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        if let Err(e) = self.try_reserve(additional) {
            fail(e)
        }
    }

    #[inline]
    fn find(&self, key: &K) -> Option<usize> {
        self.table.find_index(self.key_hasher.hash_key(key), |k| {
            self.key_hasher.eq_keys(key, k)
        })
    }

    /// Returns `true` if the map contains an entry for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns the value stored for `key`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let mut map = LinearMap::new();
    /// map.put(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|index| &self.table.entries()[index].1)
    }

    /// Returns the value stored for `key`, or `default` when absent.
    ///
    /// A stored value equal to `default` is still reported as stored; use
    /// [`get`] when presence matters.
    ///
    /// [`get`]: LinearMap::get
    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Returns the stored key and value for `key`, if any.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find(key).map(|index| {
            let (k, v) = &self.table.entries()[index];
            (k, v)
        })
    }

    /// Returns a mutable reference to the value stored for `key`, if any.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.find(key)?;
        Some(self.table.value_at_mut(index))
    }

    /// Inserts an entry, returning the value previously stored for the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the key is new and the map
    /// already holds [`MAX_CAPACITY`] entries.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let hash = self.key_hasher.hash_key(&key);
        let mut previous = None;
        self.table.try_insert_with(
            hash,
            key,
            value,
            |a, b| self.key_hasher.eq_keys(a, b),
            |stored, value| previous = Some(core::mem::replace(stored, value)),
        )?;
        Ok(previous)
    }

    /// Inserts an entry, returning the value previously stored for the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and the map already holds [`MAX_CAPACITY`]
    /// entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let mut map = LinearMap::new();
    /// assert_eq!(map.insert(1, "a"), None);
    /// assert_eq!(map.insert(1, "b"), Some("a"));
    /// ```
    #[track_caller]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.try_insert(key, value).unwrap_or_else(|e| fail(e))
    }

    /// Inserts an entry, combining with the stored value when the key is
    /// already present.
    ///
    /// `merge(stored, incoming)` updates the stored value in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the key is new and the map
    /// already holds [`MAX_CAPACITY`] entries.
    pub fn try_put_with(
        &mut self,
        key: K,
        value: V,
        merge: impl FnOnce(&mut V, V),
    ) -> Result<&mut Self> {
        let hash = self.key_hasher.hash_key(&key);
        self.table.try_insert_with(
            hash,
            key,
            value,
            |a, b| self.key_hasher.eq_keys(a, b),
            merge,
        )?;
        Ok(self)
    }

    /// Inserts an entry, combining with the stored value when the key is
    /// already present.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and the map already holds [`MAX_CAPACITY`]
    /// entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let mut counts = LinearMap::new();
    /// for word in ["a", "b", "a"] {
    ///     counts.put_with(word, 1, |n, m| *n += m);
    /// }
    /// assert_eq!(counts.get(&"a"), Some(&2));
    /// ```
    #[track_caller]
    pub fn put_with(&mut self, key: K, value: V, merge: impl FnOnce(&mut V, V)) -> &mut Self {
        match self.try_put_with(key, value, merge) {
            Ok(map) => map,
            Err(e) => fail(e),
        }
    }

    /// Inserts an entry, replacing the stored value when the key is already
    /// present.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and the map already holds [`MAX_CAPACITY`]
    /// entries.
    #[track_caller]
    pub fn put(&mut self, key: K, value: V) -> &mut Self {
        self.put_with(key, value, |stored, value| *stored = value)
    }

    /// Removes the entry for `key`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let mut map = LinearMap::new();
    /// map.put(1, "a").put(2, "b").remove(&1);
    /// assert!(!map.contains_key(&1));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn remove(&mut self, key: &K) -> &mut Self {
        self.take(key);
        self
    }

    /// Removes the entry for `key`, returning it.
    pub fn take(&mut self, key: &K) -> Option<(K, V)> {
        let key_hasher = &self.key_hasher;
        self.table.remove(
            key_hasher.hash_key(key),
            |k| key_hasher.eq_keys(key, k),
            |k| key_hasher.hash_key(k),
        )
    }

    /// Replaces the value for `key` with `f(Some(stored))`, or inserts
    /// `f(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the key is new and the map
    /// already holds [`MAX_CAPACITY`] entries.
    pub fn try_update(&mut self, key: K, f: impl FnOnce(Option<&V>) -> V) -> Result<&mut Self> {
        let hash = self.key_hasher.hash_key(&key);
        match self
            .table
            .find_index(hash, |k| self.key_hasher.eq_keys(&key, k))
        {
            Some(index) => {
                let value = f(Some(&self.table.entries()[index].1));
                *self.table.value_at_mut(index) = value;
            }
            None => {
                let value = f(None);
                self.table.try_insert_with(
                    hash,
                    key,
                    value,
                    |a, b| self.key_hasher.eq_keys(a, b),
                    |stored, value| *stored = value,
                )?;
            }
        }
        Ok(self)
    }

    /// Replaces the value for `key` with `f(Some(stored))`, or inserts
    /// `f(None)` when absent.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and the map already holds [`MAX_CAPACITY`]
    /// entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let mut map = LinearMap::new();
    /// map.update("hits", |n| n.map_or(1, |n| n + 1));
    /// map.update("hits", |n| n.map_or(1, |n| n + 1));
    /// assert_eq!(map.get(&"hits"), Some(&2));
    /// ```
    #[track_caller]
    pub fn update(&mut self, key: K, f: impl FnOnce(Option<&V>) -> V) -> &mut Self {
        match self.try_update(key, f) {
            Ok(map) => map,
            Err(e) => fail(e),
        }
    }

    /// Returns the entries as a dense slice.
    ///
    /// Indexing is O(1), and the slice can be cut into disjoint ranges (e.g.
    /// with [`split_at`]) for parallel reads. The order is unspecified.
    ///
    /// [`split_at`]: slice::split_at
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let map: LinearMap<u32, u32> = (0..10).map(|i| (i, i * i)).collect();
    /// let (head, tail) = map.entries().split_at(4);
    /// assert_eq!(head.len() + tail.len(), map.len());
    /// ```
    pub fn entries(&self) -> &[(K, V)] {
        self.table.entries()
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.entries().iter(),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns `true` if every key of `self` has an entry in `other`.
    pub fn is_subset<V2, S2>(&self, other: &LinearMap<K, V2, S2>) -> bool
    where
        S2: KeyHasher<K>,
    {
        self.table.is_subset(
            &other.table,
            |k| other.key_hasher.hash_key(k),
            |a, b| other.key_hasher.eq_keys(a, b),
        )
    }

    /// Returns `true` if every key of `other` has an entry in `self`.
    pub fn contains_all<V2, S2>(&self, other: &LinearMap<K, V2, S2>) -> bool
    where
        S2: KeyHasher<K>,
    {
        other.is_subset(self)
    }

    /// Returns `true` if every element of `keys` has an entry in `self`.
    pub fn contains_all_keys<S2>(&self, keys: &LinearSet<K, S2>) -> bool
    where
        S2: KeyHasher<K>,
    {
        self.contains_all(keys.as_map())
    }

    /// Computes occupancy statistics of the underlying table.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    /// Computes a histogram of probe distances of the underlying table.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> crate::hash_table::ProbeHistogram {
        self.table.probe_histogram()
    }
}

impl<K, V, S> LinearMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: KeyHasher<K> + Clone,
{
    /// Returns a new map holding the entries of both maps.
    ///
    /// For keys present in both, `merge(mine, theirs)` combines the value
    /// from `self` with the value from `other`. The larger map is copied and
    /// the smaller one inserted into the copy; the result adopts the key
    /// semantics of whichever map was copied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the result would hold more than
    /// [`MAX_CAPACITY`] entries.
    pub fn try_merge(&self, other: &Self, mut merge: impl FnMut(&mut V, V)) -> Result<Self> {
        if other.len() > self.len() {
            let table = other.table.try_merge(
                &self.table,
                |k| other.key_hasher.hash_key(k),
                |a, b| other.key_hasher.eq_keys(a, b),
                |stored, mine| {
                    let theirs = core::mem::replace(stored, mine);
                    merge(stored, theirs);
                },
            )?;
            return Ok(Self {
                table,
                key_hasher: other.key_hasher.clone(),
            });
        }

        let table = self.table.try_merge(
            &other.table,
            |k| self.key_hasher.hash_key(k),
            |a, b| self.key_hasher.eq_keys(a, b),
            merge,
        )?;
        Ok(Self {
            table,
            key_hasher: self.key_hasher.clone(),
        })
    }

    /// Returns a new map holding the entries of both maps.
    ///
    /// # Panics
    ///
    /// Panics if the result would hold more than [`MAX_CAPACITY`] entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let a: LinearMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    /// let b: LinearMap<&str, i32> = [("b", 20), ("c", 3)].into_iter().collect();
    ///
    /// let sum = a.merge(&b, |mine, theirs| *mine += theirs);
    /// assert_eq!(sum.get(&"b"), Some(&22));
    /// assert_eq!(sum.len(), 3);
    /// ```
    #[track_caller]
    pub fn merge(&self, other: &Self, merge: impl FnMut(&mut V, V)) -> Self {
        self.try_merge(other, merge).unwrap_or_else(|e| fail(e))
    }

    /// Returns a new map holding the entries of both maps, preferring values
    /// from `other` for keys present in both.
    ///
    /// # Panics
    ///
    /// Panics if the result would hold more than [`MAX_CAPACITY`] entries.
    #[track_caller]
    pub fn union(&self, other: &Self) -> Self {
        self.merge(other, |mine, theirs| *mine = theirs)
    }

    /// Returns a new map holding the entries of `self` whose key has no entry
    /// in `other`.
    pub fn difference<V2, S2>(&self, other: &LinearMap<K, V2, S2>) -> Self
    where
        S2: KeyHasher<K>,
    {
        self.combine(other, false)
    }

    /// Returns a new map holding the entries of `self` whose key has an entry
    /// in `other`.
    pub fn intersection<V2, S2>(&self, other: &LinearMap<K, V2, S2>) -> Self
    where
        S2: KeyHasher<K>,
    {
        self.combine(other, true)
    }

    /// Returns a new map holding the entries of `self` whose key is an
    /// element of `keys`.
    pub fn intersection_keys<S2>(&self, keys: &LinearSet<K, S2>) -> Self
    where
        S2: KeyHasher<K>,
    {
        self.intersection(keys.as_map())
    }

    fn combine<V2, S2>(&self, other: &LinearMap<K, V2, S2>, keep_found: bool) -> Self
    where
        S2: KeyHasher<K>,
    {
        Self {
            table: self.table.combine(
                &other.table,
                |k| other.key_hasher.hash_key(k),
                |a, b| other.key_hasher.eq_keys(a, b),
                keep_found,
            ),
            key_hasher: self.key_hasher.clone(),
        }
    }

    /// Splits the map into at most `parts` non-empty maps covering every
    /// entry exactly once.
    ///
    /// The split follows the layout of the index table, not the keys: it is
    /// cheap, but maps with equal contents and different capacities may split
    /// differently. `parts == 0` is treated as `1`, and an empty map yields no
    /// parts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearMap;
    ///
    /// let map: LinearMap<u32, u32> = (0..100).map(|i| (i, i)).collect();
    /// let parts = map.split(4);
    /// assert!(parts.len() <= 4);
    /// assert_eq!(parts.iter().map(|p| p.len()).sum::<usize>(), 100);
    /// ```
    pub fn split(&self, parts: usize) -> Vec<Self> {
        self.table
            .split(parts)
            .into_iter()
            .map(|table| Self {
                table,
                key_hasher: self.key_hasher.clone(),
            })
            .collect()
    }
}

impl<K, V, S> AssociativeMap<K, V> for LinearMap<K, V, S>
where
    S: KeyHasher<K>,
{
    fn len(&self) -> usize {
        LinearMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        LinearMap::contains_key(self, key)
    }

    fn get(&self, key: &K) -> Option<&V> {
        LinearMap::get(self, key)
    }

    fn is_linear(&self) -> bool {
        true
    }

    fn forked(&self) -> Result<Self> {
        Err(Error::IllegalConversion)
    }
}

impl<K, V, S> PartialEq for LinearMap<K, V, S>
where
    V: PartialEq,
    S: KeyHasher<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for LinearMap<K, V, S>
where
    V: Eq,
    S: KeyHasher<K>,
{
}

impl<K, V, S> Default for LinearMap<K, V, S>
where
    S: KeyHasher<K> + Default,
{
    fn default() -> Self {
        Self::with_key_hasher(S::default())
    }
}

impl<K, V, S> FromIterator<(K, V)> for LinearMap<K, V, S>
where
    S: KeyHasher<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for LinearMap<K, V, S>
where
    S: KeyHasher<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0.min(MAX_CAPACITY - self.len()));
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V, S> IntoIterator for LinearMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = alloc::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_entries().into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a LinearMap<K, V, S>
where
    S: KeyHasher<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a `LinearMap`.
pub struct Iter<'a, K, V> {
    inner: core::slice::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a `LinearMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the values of a `LinearMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::FnHasher;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type SipMap<K, V> = LinearMap<K, V, Standard<SipHashBuilder>>;

    fn sip_map<K: Hash + Eq, V>(entries: impl IntoIterator<Item = (K, V)>) -> SipMap<K, V> {
        entries.into_iter().collect()
    }

    fn sorted<K: Ord + Clone, V: Clone, S>(map: &LinearMap<K, V, S>) -> Vec<(K, V)>
    where
        S: KeyHasher<K>,
    {
        let mut entries = map.entries().to_vec();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: SipMap<i32, String> = LinearMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert!(map.capacity() >= 16);

        let map2 = LinearMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());

        let map3: LinearMap<i32, String> = LinearMap::new();
        assert!(map3.is_empty());
    }

    #[test]
    fn test_with_capacity() {
        let map: LinearMap<i32, String> = LinearMap::with_capacity(100);
        assert!(map.capacity() >= 100);

        let map2 =
            LinearMap::<i32, String, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(map2.capacity() >= 200);

        assert!(matches!(
            LinearMap::<i32, i32>::try_with_capacity(MAX_CAPACITY + 1),
            Err(Error::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = LinearMap::with_hasher(SipHashBuilder::default());

        assert_eq!(map.insert(1, "hello".to_string()), None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);

        assert_eq!(
            map.insert(1, "world".to_string()),
            Some("hello".to_string())
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"world".to_string()));
        assert_eq!(map.get_key_value(&1), Some((&1, &"world".to_string())));
    }

    #[test]
    fn test_get_or_reports_stored_default() {
        let mut map = LinearMap::with_hasher(SipHashBuilder::default());
        map.put("zero", 0);

        let default = 0;
        assert_eq!(map.get_or(&"zero", &default), &0);
        assert_eq!(map.get_or(&"missing", &default), &0);
        assert!(map.get(&"zero").is_some());
        assert!(map.get(&"missing").is_none());
    }

    #[test]
    fn test_get_mut() {
        let mut map = LinearMap::with_hasher(SipHashBuilder::default());
        map.put(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_put_chains_and_merges() {
        let mut map = LinearMap::with_hasher(SipHashBuilder::default());
        map.put(1, 10).put(2, 20).put(1, 11);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&11));

        map.put_with(2, 5, |stored, incoming| *stored += incoming)
            .put_with(3, 7, |_, _| unreachable!());
        assert_eq!(map.get(&2), Some(&25));
        assert_eq!(map.get(&3), Some(&7));
    }

    #[test]
    fn test_remove_and_take() {
        let mut map = LinearMap::with_hasher(SipHashBuilder::default());
        map.put(1, "one").put(2, "two");

        assert_eq!(map.take(&1), Some((1, "one")));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        // absent keys are a no-op, however often they are removed
        map.remove(&1).remove(&1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.take(&1), None);
    }

    #[test]
    fn test_update() {
        let mut map = LinearMap::with_hasher(SipHashBuilder::default());
        map.update("a", |v| {
            assert!(v.is_none());
            1
        });
        map.update("a", |v| v.copied().unwrap_or(0) + 10);
        assert_eq!(map.get(&"a"), Some(&11));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut map = LinearMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.put(i, i);
        }
        let capacity = map.capacity();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert!(!map.contains_key(&5));
    }

    #[test]
    fn test_reserve() {
        let mut map: SipMap<i32, i32> = LinearMap::default();
        map.reserve(1000);
        assert!(map.capacity() >= 1000);
        assert!(map.try_reserve(MAX_CAPACITY + 1).is_err());
        assert!(map.capacity() >= 1000);
    }

    #[test]
    fn test_thousand_keys_then_remove_half() {
        let mut map =
            LinearMap::<i32, i32, _>::with_capacity_and_hasher(16, SipHashBuilder::default());
        for k in 1..=1000 {
            map.put(k, k * 2);
        }
        assert_eq!(map.len(), 1000);
        assert_eq!(map.get(&500), Some(&1000));

        for k in 1..=500 {
            map.remove(&k);
        }
        assert_eq!(map.len(), 500);
        assert!(!map.contains_key(&250));
        assert!(map.contains_key(&750));

        // the entry view is dense and holds exactly the live keys
        assert_eq!(map.entries().len(), 500);
        assert!(map.entries().iter().all(|(k, v)| *k > 500 && *v == k * 2));
    }

    #[test]
    fn test_merge_keep_first_and_last() {
        let a = sip_map([("a", 1), ("b", 2)]);
        let b = sip_map([("b", 20), ("c", 3)]);

        let first = a.merge(&b, |_, _| {});
        assert_eq!(sorted(&first), vec![("a", 1), ("b", 2), ("c", 3)]);

        let last = a.merge(&b, |mine, theirs| *mine = theirs);
        assert_eq!(sorted(&last), vec![("a", 1), ("b", 20), ("c", 3)]);

        assert_eq!(a.union(&b), last);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_merge_keeps_argument_order_when_other_is_larger() {
        let small = sip_map([(1, "small")]);
        let large = sip_map([(1, "large"), (2, "large"), (3, "large")]);

        let keep_mine = small.merge(&large, |_, _| {});
        assert_eq!(keep_mine.get(&1), Some(&"small"));
        assert_eq!(keep_mine.len(), 3);

        let keep_theirs = small.merge(&large, |mine, theirs| *mine = theirs);
        assert_eq!(keep_theirs.get(&1), Some(&"large"));

        let mut calls = vec![];
        small.merge(&large, |mine, theirs| calls.push((*mine, theirs)));
        assert_eq!(calls, vec![("small", "large")]);
    }

    #[test]
    fn test_merge_commutes_for_commutative_fn() {
        let a = sip_map((0..50).map(|i| (i, i)));
        let b = sip_map((25..200).map(|i| (i, i * 3)));

        let ab = a.merge(&b, |x, y| *x += y);
        let ba = b.merge(&a, |x, y| *x += y);
        assert_eq!(ab, ba);
        assert_eq!(ab.get(&30), Some(&120));
    }

    #[test]
    fn test_difference_and_intersection() {
        let a = sip_map((0..100).map(|i| (i, i)));
        let b: SipMap<i32, ()> = sip_map((50..150).map(|i| (i, ())));

        let diff = a.difference(&b);
        let inter = a.intersection(&b);

        assert_eq!(diff.len(), 50);
        assert_eq!(inter.len(), 50);
        assert!(diff.keys().all(|k| *k < 50));
        assert!(inter.keys().all(|k| (50..100).contains(k)));
        assert!(inter.values().all(|v| (50..100).contains(v)));

        assert_eq!(diff.union(&inter), a);
        assert!(diff.intersection(&inter).is_empty());
    }

    #[test]
    fn test_intersection_with_case_insensitive_keys() {
        let variants = [
            "ab", "Ab", "aB", "AB", "abc", "Abc", "aBc", "abC", "ABc", "AbC", "aBC", "ABC",
        ];
        let a = sip_map(variants.iter().map(|s| (s.to_string(), s.len())));
        assert_eq!(a.len(), 12);

        let mut folded = LinearMap::with_key_hasher(FnHasher::new(
            |k: &String| k.len() as u64,
            |a: &String, b: &String| a.eq_ignore_ascii_case(b),
        ));
        folded.put("ab".to_string(), ()).put("abc".to_string(), ());

        let inter = a.intersection(&folded);
        assert_eq!(inter, a);
        assert!(a.difference(&folded).is_empty());

        let mut keys: LinearSet<String, _> = LinearSet::with_key_hasher(FnHasher::new(
            |k: &String| k.len() as u64,
            |a: &String, b: &String| a.eq_ignore_ascii_case(b),
        ));
        keys.insert("AB".to_string());
        let only_ab = a.intersection_keys(&keys);
        assert_eq!(only_ab.len(), 4);
        assert!(only_ab.keys().all(|k| k.len() == 2));
    }

    #[test]
    fn test_subset_and_contains_all() {
        let big = sip_map((0..20).map(|i| (i, i)));
        let small = sip_map((5..10).map(|i| (i, "x")));

        assert!(small.is_subset(&big));
        assert!(!big.is_subset(&small));
        assert!(big.contains_all(&small));
        assert!(!small.contains_all(&big));

        let keys: LinearSet<i32> = (0..3).collect();
        assert!(big.contains_all_keys(&keys));
        assert_eq!(big.intersection_keys(&keys).len(), 3);
    }

    #[test]
    fn test_split() {
        let map = sip_map((0..500).map(|i| (i, i.to_string())));

        for parts in 1..10 {
            let split = map.split(parts);
            assert!(split.len() <= parts);
            assert!(split.iter().all(|m| !m.is_empty()));

            let mut rebuilt: SipMap<i32, String> = LinearMap::default();
            for part in &split {
                for (k, v) in part {
                    assert!(!rebuilt.contains_key(k), "key {k} in two parts");
                    rebuilt.put(*k, v.clone());
                }
            }
            assert_eq!(rebuilt, map);
        }

        let empty: SipMap<i32, i32> = LinearMap::default();
        assert!(empty.split(3).is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut map = sip_map((0..10).map(|i| (i, i)));
        let cloned = map.clone();
        map.remove(&0).put(100, 100);

        assert!(cloned.contains_key(&0));
        assert!(!cloned.contains_key(&100));
        assert_eq!(cloned.len(), 10);
    }

    #[test]
    fn test_equality_ignores_layout() {
        let a = sip_map((0..100).map(|i| (i, i)));
        let mut b = sip_map((0..200).rev().map(|i| (i, i)));
        for i in 100..200 {
            b.remove(&i);
        }
        assert_eq!(a, b);

        b.put(0, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_iterators() {
        let map = sip_map([(1, "a"), (2, "b"), (3, "c")]);

        assert_eq!(map.iter().len(), 3);
        let mut keys: Vec<_> = map.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, vec![1, 2, 3]);

        let mut values: Vec<_> = map.values().copied().collect();
        values.sort();
        assert_eq!(values, vec!["a", "b", "c"]);

        let mut owned: Vec<_> = map.into_iter().collect();
        owned.sort();
        assert_eq!(owned, vec![(1, "a"), (2, "b"), (3, "c")]);
    }

    #[test]
    fn test_extend() {
        let mut map = sip_map([(1, 1)]);
        map.extend((0..10).map(|i| (i, i * 2)));
        assert_eq!(map.len(), 10);
        assert_eq!(map.get(&1), Some(&2));
    }

    #[test]
    fn test_debug_format() {
        let map = sip_map([(1, "a")]);
        assert_eq!(format!("{map:?}"), r#"{1: "a"}"#);
    }

    #[test]
    fn test_custom_equality() {
        let folded = FnHasher::new(
            |k: &String| k.to_ascii_lowercase().len() as u64,
            |a: &String, b: &String| a.eq_ignore_ascii_case(b),
        );
        let mut map = LinearMap::with_key_hasher(folded);
        map.put("Key".to_string(), 1)
            .put("KEY".to_string(), 2)
            .put("Other".to_string(), 3)
            .put("Shape".to_string(), 4);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&"key".to_string()), Some(&2));
        map.remove(&"OTHER".to_string());
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&"shape".to_string()), Some(&4));
    }

    #[test]
    fn test_colliding_hashes() {
        let mut map = LinearMap::with_key_hasher(FnHasher::new(
            |_: &u32| 7,
            |a: &u32, b: &u32| a == b,
        ));
        for i in 0..200u32 {
            map.put(i, i);
        }
        for i in (0..200u32).step_by(3) {
            map.remove(&i);
        }
        for i in 0..200u32 {
            assert_eq!(map.get(&i).is_some(), i % 3 != 0, "key {i}");
        }
        for i in (0..200u32).step_by(3) {
            map.put(i, i + 1);
        }
        assert_eq!(map.len(), 200);
        assert_eq!(map.get(&3), Some(&4));
    }

    #[test]
    fn test_forked_is_rejected() {
        let mut map = sip_map([(1, 1)]);
        assert_eq!(map.forked(), Err(Error::IllegalConversion));
        assert!(map.is_linear());
        assert_eq!(AssociativeMap::len(&map), 1);
        map.put(2, 2);
        assert_eq!(AssociativeMap::get_or(&map, &3, &0), &0);
    }

    #[test]
    fn test_stats() {
        let map = sip_map((0..1000).map(|i| (i, i)));
        let stats = map.debug_stats();
        assert_eq!(stats.populated, 1000);
        assert_eq!(stats.tombstones, 0);
        assert!(stats.table_len.is_power_of_two());
        assert_eq!(map.probe_histogram().total(), 1000);
    }
}
