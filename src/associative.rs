use crate::error::Result;

/// Read-only capabilities shared by every map representation.
///
/// Mutation is only offered by the concrete linear types, so code holding an
/// `impl AssociativeMap` cannot mutate through it. Moving between
/// representations is explicit: [`forked`] asks for a persistent view of the
/// same map, which a linear map refuses since its layout cannot be shared
/// structurally. Callers needing persistence rebuild from the entries
/// instead.
///
/// [`forked`]: AssociativeMap::forked
pub trait AssociativeMap<K, V> {
    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if an entry exists for `key`.
    fn contains_key(&self, key: &K) -> bool;

    /// Returns the value stored for `key`, if any.
    fn get(&self, key: &K) -> Option<&V>;

    /// Returns the value stored for `key`, or `default` when absent.
    ///
    /// Presence is decided by the lookup itself, never by comparing the
    /// result against `default`; use [`get`] to tell the cases apart.
    ///
    /// [`get`]: AssociativeMap::get
    fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` for single-owner maps mutated in place.
    fn is_linear(&self) -> bool;

    /// Returns a persistent view of this map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalConversion`] if the map cannot be turned into a
    /// persistent one in place. The map is left untouched.
    ///
    /// [`Error::IllegalConversion`]: crate::Error::IllegalConversion
    fn forked(&self) -> Result<Self>
    where
        Self: Sized;
}
