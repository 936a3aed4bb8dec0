use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;

/// Hashing and equality semantics for the keys of a map.
///
/// Implementations must be pure and consistent with each other: whenever
/// `eq_keys(a, b)` holds, `hash_key(a) == hash_key(b)` must hold too. This is
/// not checked; an inconsistent pair produces incorrect lookups but never
/// memory unsafety.
pub trait KeyHasher<K: ?Sized> {
    /// Hashes a key.
    fn hash_key(&self, key: &K) -> u64;

    /// Compares two keys for equality.
    fn eq_keys(&self, a: &K, b: &K) -> bool;
}

/// Key semantics taken from the key's own `Hash` and `Eq` impls, hashed with
/// the hasher builder `S`.
///
/// This is the key strategy used by [`LinearMap::new`] and
/// [`LinearMap::with_hasher`].
///
/// [`LinearMap::new`]: crate::LinearMap::new
/// [`LinearMap::with_hasher`]: crate::LinearMap::with_hasher
#[derive(Clone, Default, Debug)]
pub struct Standard<S = DefaultHashBuilder> {
    hash_builder: S,
}

impl<S> Standard<S> {
    /// Wraps a hasher builder.
    pub fn new(hash_builder: S) -> Self {
        Self { hash_builder }
    }

    /// Returns the wrapped hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<K, S> KeyHasher<K> for Standard<S>
where
    K: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }

    #[inline]
    fn eq_keys(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Key semantics given by an injected pair of functions.
///
/// This allows the same key type to be stored under several equality
/// semantics, e.g. case-insensitive strings.
///
/// # Examples
///
/// ```rust
/// use linear_hash::FnHasher;
/// use linear_hash::LinearMap;
///
/// let folded = FnHasher::new(
///     |k: &String| k.len() as u64,
///     |a: &String, b: &String| a.eq_ignore_ascii_case(b),
/// );
/// let mut map = LinearMap::with_key_hasher(folded);
/// map.put("Hello".to_string(), 1).put("HELLO".to_string(), 2);
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.get(&"hello".to_string()), Some(&2));
/// ```
#[derive(Clone, Copy)]
pub struct FnHasher<H, E> {
    hash: H,
    eq: E,
}

impl<H, E> FnHasher<H, E> {
    /// Creates key semantics from a hash function and an equality function.
    pub fn new(hash: H, eq: E) -> Self {
        Self { hash, eq }
    }
}

impl<H, E> Debug for FnHasher<H, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnHasher").finish_non_exhaustive()
    }
}

impl<K, H, E> KeyHasher<K> for FnHasher<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> u64,
    E: Fn(&K, &K) -> bool,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    #[inline]
    fn eq_keys(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
}
