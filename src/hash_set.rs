use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::Result;
use crate::hash_map::LinearMap;
use crate::key_hasher::KeyHasher;
use crate::key_hasher::Standard;

/// A single-owner hash set built on [`LinearMap`] with unit values.
///
/// Elements live in the same dense store as map entries, so besides hashed
/// lookups the set offers random access through [`elements`].
///
/// # Performance Characteristics
///
/// - **Memory**: 8 bytes per index row (about 1.05 rows per element, rounded
///   up to a power of two), plus the size of `T`.
///
/// [`elements`]: LinearSet::elements
#[derive(Clone)]
pub struct LinearSet<T, S = Standard<DefaultHashBuilder>> {
    map: LinearMap<T, (), S>,
}

impl<T, S> PartialEq for LinearSet<T, S>
where
    S: KeyHasher<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T, S> Eq for LinearSet<T, S> where S: KeyHasher<T> {}

impl<T, S> Debug for LinearSet<T, S>
where
    T: Debug,
    S: KeyHasher<T>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> LinearSet<T>
where
    T: Hash + Eq,
{
    /// Creates an empty set using the [`DefaultHashBuilder`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearSet;
    ///
    /// let set: LinearSet<i32> = LinearSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            map: LinearMap::new(),
        }
    }

    /// Creates an empty set with room for `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is larger than [`MAX_CAPACITY`].
    ///
    /// [`MAX_CAPACITY`]: crate::MAX_CAPACITY
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: LinearMap::with_capacity(capacity),
        }
    }
}

impl<T, S> LinearSet<T, Standard<S>>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set hashing elements with `hash_builder`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::hash_map::RandomState;
    ///
    /// use linear_hash::LinearSet;
    ///
    /// let set: LinearSet<i32, _> = LinearSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            map: LinearMap::with_hasher(hash_builder),
        }
    }

    /// Creates an empty set with room for `capacity` elements, hashing them
    /// with `hash_builder`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is larger than [`MAX_CAPACITY`].
    ///
    /// [`MAX_CAPACITY`]: crate::MAX_CAPACITY
    #[track_caller]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            map: LinearMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }
}

impl<T, S> LinearSet<T, S>
where
    S: KeyHasher<T>,
{
    /// Creates an empty set with the given element semantics.
    pub fn with_key_hasher(key_hasher: S) -> Self {
        Self {
            map: LinearMap::with_key_hasher(key_hasher),
        }
    }

    pub(crate) fn as_map(&self) -> &LinearMap<T, (), S> {
        &self.map
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of elements the set holds before it grows.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Removes all elements, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Ensures room for `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the set would need to hold more than [`MAX_CAPACITY`]
    /// elements.
    ///
    /// [`MAX_CAPACITY`]: crate::MAX_CAPACITY
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    /// Adds an element, returning `true` if it was not already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the element is new and the set
    /// is full.
    ///
    /// [`Error::CapacityExceeded`]: crate::Error::CapacityExceeded
    pub fn try_insert(&mut self, value: T) -> Result<bool> {
        Ok(self.map.try_insert(value, ())?.is_none())
    }

    /// Adds an element, returning `true` if it was not already present.
    ///
    /// # Panics
    ///
    /// Panics if the element is new and the set is full.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearSet;
    ///
    /// let mut set = LinearSet::new();
    /// assert!(set.insert(1));
    /// assert!(!set.insert(1));
    /// ```
    #[track_caller]
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    /// Returns `true` if the set contains `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    /// Returns the stored element equal to `value`, if any.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.map.get_key_value(value).map(|(k, _)| k)
    }

    /// Removes `value`, returning `true` if it was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored element equal to `value`, if any.
    pub fn take(&mut self, value: &T) -> Option<T> {
        self.map.take(value).map(|(k, ())| k)
    }

    /// Returns a random-access view of the elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LinearSet;
    ///
    /// let set: LinearSet<u32> = (0..10).collect();
    /// let elements = set.elements();
    /// let (left, right) = elements.split_at(3);
    /// assert_eq!(left.len(), 3);
    /// assert_eq!(right.len(), 7);
    /// assert!(set.contains(elements.get(5).unwrap()));
    /// ```
    pub fn elements(&self) -> Elements<'_, T> {
        Elements {
            entries: self.map.entries(),
        }
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.entries().iter(),
        }
    }

    /// Returns `true` if every element of `self` is in `other`.
    pub fn is_subset<S2>(&self, other: &LinearSet<T, S2>) -> bool
    where
        S2: KeyHasher<T>,
    {
        self.map.is_subset(&other.map)
    }

    /// Returns `true` if every element of `other` is in `self`.
    pub fn is_superset<S2>(&self, other: &LinearSet<T, S2>) -> bool
    where
        S2: KeyHasher<T>,
    {
        other.is_subset(self)
    }

    /// Returns `true` if `self` and `other` share no element.
    pub fn is_disjoint<S2>(&self, other: &LinearSet<T, S2>) -> bool
    where
        S2: KeyHasher<T>,
    {
        !self.iter().any(|v| other.contains(v))
    }
}

impl<T, S> LinearSet<T, S>
where
    T: Clone,
    S: KeyHasher<T> + Clone,
{
    /// Returns a new set holding the elements of both sets.
    ///
    /// # Panics
    ///
    /// Panics if the result would hold more than [`MAX_CAPACITY`] elements.
    ///
    /// [`MAX_CAPACITY`]: crate::MAX_CAPACITY
    #[track_caller]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            map: self.map.merge(&other.map, |_, _| {}),
        }
    }

    /// Returns a new set holding the elements of `self` that are in `other`.
    pub fn intersection<S2>(&self, other: &LinearSet<T, S2>) -> Self
    where
        S2: KeyHasher<T>,
    {
        Self {
            map: self.map.intersection(&other.map),
        }
    }

    /// Returns a new set holding the elements of `self` that are not in
    /// `other`.
    pub fn difference<S2>(&self, other: &LinearSet<T, S2>) -> Self
    where
        S2: KeyHasher<T>,
    {
        Self {
            map: self.map.difference(&other.map),
        }
    }

    /// Splits the set into at most `parts` non-empty sets covering every
    /// element exactly once. See [`LinearMap::split`].
    pub fn split(&self, parts: usize) -> Vec<Self> {
        self.map
            .split(parts)
            .into_iter()
            .map(|map| Self { map })
            .collect()
    }
}

impl<T, S> Default for LinearSet<T, S>
where
    S: KeyHasher<T> + Default,
{
    fn default() -> Self {
        Self {
            map: LinearMap::default(),
        }
    }
}

impl<T, S> FromIterator<T> for LinearSet<T, S>
where
    S: KeyHasher<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for LinearSet<T, S>
where
    S: KeyHasher<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.map.extend(iter.into_iter().map(|v| (v, ())));
    }
}

impl<T, S> IntoIterator for LinearSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a LinearSet<T, S>
where
    S: KeyHasher<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A random-access view of the elements of a [`LinearSet`].
///
/// Indices are stable only while the set is not mutated.
#[derive(Clone, Copy)]
pub struct Elements<'a, T> {
    entries: &'a [(T, ())],
}

impl<'a, T> Elements<'a, T> {
    /// Returns the number of elements in the view.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&'a T> {
        self.entries.get(index).map(|(v, ())| v)
    }

    /// Divides the view into two at `mid`.
    ///
    /// # Panics
    ///
    /// Panics if `mid > len`.
    pub fn split_at(&self, mid: usize) -> (Self, Self) {
        let (left, right) = self.entries.split_at(mid);
        (Elements { entries: left }, Elements { entries: right })
    }

    /// Returns an iterator over the elements in the view.
    pub fn iter(&self) -> Iter<'a, T> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

impl<T: Debug> Debug for Elements<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// An iterator over the elements of a [`LinearSet`].
pub struct Iter<'a, T> {
    inner: core::slice::Iter<'a, (T, ())>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(v, ())| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// An owning iterator over the elements of a [`LinearSet`].
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<(T, ())>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(v, ())| v)
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
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type SipSet<T> = LinearSet<T, Standard<SipHashBuilder>>;

    fn sorted<T: Ord + Clone, S: KeyHasher<T>>(set: &LinearSet<T, S>) -> Vec<T> {
        let mut values: Vec<T> = set.iter().cloned().collect();
        values.sort();
        values
    }

    #[test]
    fn test_new_and_with_hasher() {
        let set: SipSet<i32> = LinearSet::default();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);

        let set2 = LinearSet::<i32, _>::with_hasher(SipHashBuilder::default());
        assert!(set2.is_empty());
        assert_eq!(set2.len(), 0);
    }

    #[test]
    fn test_with_capacity() {
        let set: LinearSet<i32> = LinearSet::with_capacity(100);
        assert!(set.capacity() >= 100);
        assert!(set.is_empty());

        let set2 = LinearSet::<i32, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(set2.capacity() >= 200);
        assert!(set2.is_empty());
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = LinearSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert(1));
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
        assert!(set.contains(&1));

        assert!(!set.insert(1));
        assert_eq!(set.len(), 1);

        assert!(set.insert(2));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
        assert_eq!(set.try_insert(3), Ok(true));
    }

    #[test]
    fn test_remove_and_take() {
        let mut set = LinearSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        assert!(set.remove(&2));
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&2));
        assert!(!set.remove(&2));
        assert!(!set.remove(&4));

        assert_eq!(set.take(&1), Some(1));
        assert_eq!(set.take(&1), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_get_returns_stored_element() {
        let mut set = LinearSet::with_key_hasher(FnHasher::new(
            |s: &String| s.len() as u64,
            |a: &String, b: &String| a.eq_ignore_ascii_case(b),
        ));
        set.insert("Hello".to_string());
        assert_eq!(set.get(&"HELLO".to_string()), Some(&"Hello".to_string()));
        assert!(!set.insert("hello".to_string()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut set = LinearSet::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            set.insert(i);
        }
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(&1));
    }

    #[test]
    fn test_elements_view() {
        let set: SipSet<u32> = (0..100).collect();
        let elements = set.elements();
        assert_eq!(elements.len(), 100);

        let (left, right) = elements.split_at(40);
        assert_eq!(left.len(), 40);
        assert_eq!(right.len(), 60);

        let mut all: Vec<u32> = left.iter().chain(right.iter()).copied().collect();
        all.sort();
        assert_eq!(all, (0..100).collect::<Vec<_>>());

        for i in 0..elements.len() {
            assert!(set.contains(elements.get(i).unwrap()));
        }
        assert_eq!(elements.get(100), None);
    }

    #[test]
    fn test_into_iterator() {
        let set: SipSet<i32> = [3, 1, 2].into_iter().collect();
        let mut values: Vec<i32> = set.clone().into_iter().collect();
        values.sort();
        assert_eq!(values, vec![1, 2, 3]);

        let borrowed: Vec<&i32> = (&set).into_iter().collect();
        assert_eq!(borrowed.len(), 3);
    }

    #[test]
    fn test_insert_remove_cycle() {
        let mut set = LinearSet::with_hasher(SipHashBuilder::default());
        for round in 0..5 {
            for i in 0..200 {
                assert!(set.insert(i), "round {round}, value {i}");
            }
            for i in 0..200 {
                assert!(set.remove(&i), "round {round}, value {i}");
            }
            assert!(set.is_empty());
        }
    }

    #[test]
    fn test_is_disjoint() {
        let a: SipSet<i32> = [1, 2, 3].into_iter().collect();
        let mut b: SipSet<i32> = [4, 5, 6].into_iter().collect();

        assert!(a.is_disjoint(&b));
        assert!(b.is_disjoint(&a));

        b.insert(2);
        assert!(!a.is_disjoint(&b));
        assert!(!b.is_disjoint(&a));
    }

    #[test]
    fn test_is_subset_and_superset() {
        let a: SipSet<i32> = [1, 2].into_iter().collect();
        let b: SipSet<i32> = [1, 2, 3].into_iter().collect();

        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(a.is_subset(&a));
        assert!(b.is_superset(&a));
        assert!(!a.is_superset(&b));
    }

    #[test]
    fn test_union() {
        let a: SipSet<i32> = [1, 2, 3].into_iter().collect();
        let b: SipSet<i32> = [3, 4, 5].into_iter().collect();

        assert_eq!(sorted(&a.union(&b)), vec![1, 2, 3, 4, 5]);
        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_intersection_and_difference() {
        let a: SipSet<i32> = [1, 2, 3].into_iter().collect();
        let b: SipSet<i32> = [2, 3, 4].into_iter().collect();

        assert_eq!(sorted(&a.intersection(&b)), vec![2, 3]);
        assert_eq!(sorted(&a.difference(&b)), vec![1]);
        assert_eq!(sorted(&b.difference(&a)), vec![4]);
    }

    #[test]
    fn test_split() {
        let set: SipSet<i32> = (0..300).collect();
        let parts = set.split(5);
        assert!(parts.len() <= 5);
        assert_eq!(parts.iter().map(LinearSet::len).sum::<usize>(), 300);

        let rebuilt = parts
            .iter()
            .fold(SipSet::default(), |acc, part| acc.union(part));
        assert_eq!(rebuilt, set);
    }

    #[test]
    fn test_debug_format() {
        let set: SipSet<i32> = [7].into_iter().collect();
        assert_eq!(format!("{set:?}"), "{7}");
        assert_eq!(format!("{:?}", set.elements()), "[7]");
    }
}
