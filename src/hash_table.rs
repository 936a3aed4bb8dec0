//! The low-level Robin Hood table backing [`LinearMap`] and [`LinearSet`].
//!
//! A [`HashTable`] is made of two parts:
//!
//! - a dense entry store, a `Vec<(K, V)>` which never has gaps: removing an
//!   entry moves the last entry into the freed position.
//! - an index table of packed rows, each holding a scrambled 32-bit hash, the
//!   position of its entry in the store, and a tombstone flag. The index
//!   table length is always a power of two, and rows are placed with Robin
//!   Hood displacement.
//!
//! Like the maps built on top of it, the table never hashes keys by itself:
//! every operation is handed the key's hash and an equality predicate by the
//! caller.
//!
//! [`LinearMap`]: crate::LinearMap
//! [`LinearSet`]: crate::LinearSet

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::Error;
use crate::error::Result;
use crate::error::fail;

/// The largest number of entries a table can hold.
pub const MAX_CAPACITY: usize = 1 << 29;

/// Capacity used by tables created with a smaller one.
const MIN_CAPACITY: usize = 4;

/// Scrambled hash value marking an empty row.
const NONE: u32 = 0;

/// Scrambled hash value substituted for real hashes which scramble to
/// [`NONE`].
const FALLBACK: u32 = 1;

/// Number of index rows needed to hold `capacity` entries at a 0.95 load
/// factor.
#[inline(always)]
fn table_len(capacity: usize) -> usize {
    let scaled = (capacity as u64 * 20).div_ceil(19);
    (scaled as usize).next_power_of_two()
}

/// Mixes a caller-supplied hash down to the 32 bits stored in a row.
///
/// Poor hash functions tend to leave the low bits, which pick the ideal row,
/// badly distributed, so high bits are folded into them twice.
#[inline(always)]
pub(crate) fn scramble(hash: u64) -> u32 {
    let mut h = (hash ^ (hash >> 32)) as u32;
    h ^= (h >> 20) ^ (h >> 12);
    h ^= (h >> 7) ^ (h >> 4);
    if h == NONE { FALLBACK } else { h }
}

/// Distance between the ideal row of `hash` and the row at `index`.
#[inline(always)]
fn probe_distance(index_mask: usize, hash: u32, index: usize) -> usize {
    index.wrapping_sub(hash as usize) & index_mask
}

/// One slot of the index table.
///
/// Bits `0..32` hold the scrambled hash, bits `32..63` the entry index, and
/// bit 63 the tombstone flag. A zero hash marks an empty row.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct Row(u64);

impl Row {
    const HASH_MASK: u64 = (1 << 32) - 1;
    const ENTRY_INDEX_MASK: u64 = (1 << 31) - 1;
    const TOMBSTONE: u64 = 1 << 63;

    const EMPTY: Row = Row(0);

    #[inline(always)]
    fn new(hash: u32, entry_index: usize) -> Self {
        debug_assert!(hash != NONE);
        debug_assert!(entry_index as u64 <= Self::ENTRY_INDEX_MASK);
        Row(hash as u64 | ((entry_index as u64 & Self::ENTRY_INDEX_MASK) << 32))
    }

    #[inline(always)]
    pub(crate) fn hash(self) -> u32 {
        (self.0 & Self::HASH_MASK) as u32
    }

    #[inline(always)]
    pub(crate) fn entry_index(self) -> usize {
        ((self.0 >> 32) & Self::ENTRY_INDEX_MASK) as usize
    }

    #[inline(always)]
    fn is_empty(self) -> bool {
        self.hash() == NONE
    }

    #[inline(always)]
    fn is_tombstone(self) -> bool {
        self.0 & Self::TOMBSTONE != 0
    }

    /// Neither empty nor a tombstone.
    #[inline(always)]
    pub(crate) fn is_populated(self) -> bool {
        !self.is_empty() && !self.is_tombstone()
    }

    #[inline(always)]
    fn into_tombstone(self) -> Row {
        Row(self.0 | Self::TOMBSTONE)
    }

    #[inline(always)]
    fn with_entry_index(self, entry_index: usize) -> Row {
        Row::new(self.hash(), entry_index)
    }
}

impl Debug for Row {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            f.write_str("........")
        } else if self.is_tombstone() {
            write!(f, "{:08x}@x", self.hash())
        } else {
            write!(f, "{:08x}@{}", self.hash(), self.entry_index())
        }
    }
}

/// Places a row with Robin Hood displacement, starting the walk at `start`.
///
/// The incoming row takes over the first row whose occupant sits closer to
/// its own ideal row than the incoming one does; the displaced occupant then
/// continues the walk. Tombstones met on the way are reused unless a live row
/// further from its ideal row lies between the tombstone and the final
/// position, since skipping over such a row would hide it from lookups.
fn place(rows: &mut [Row], mut hash: u32, mut entry_index: usize, start: usize) {
    let index_mask = rows.len() - 1;
    let mut tombstone = None;
    let mut idx = start;
    let mut dist = probe_distance(index_mask, hash, start);
    let mut probed = 0;

    loop {
        debug_assert!(probed <= rows.len(), "no free row left in the index table");
        probed += 1;

        let row = rows[idx];
        if row.is_empty() {
            rows[tombstone.unwrap_or(idx)] = Row::new(hash, entry_index);
            return;
        }

        let row_dist = probe_distance(index_mask, row.hash(), idx);
        if !row.is_tombstone() && row_dist > dist {
            tombstone = None;
        } else if row.is_tombstone() && tombstone.is_none() {
            tombstone = Some(idx);
        }

        if dist > row_dist {
            let new_row = Row::new(hash, entry_index);
            if let Some(tombstone) = tombstone {
                rows[tombstone] = new_row;
                return;
            }

            rows[idx] = new_row;
            if row.is_tombstone() {
                return;
            }

            dist = row_dist;
            hash = row.hash();
            entry_index = row.entry_index();
        }

        idx = (idx + 1) & index_mask;
        dist += 1;
    }
}

/// Statistics describing the state of a [`HashTable`].
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries.
    pub populated: usize,
    /// Number of entries the table holds before growing.
    pub capacity: usize,
    /// Number of rows in the index table.
    pub table_len: usize,
    /// Number of tombstone rows.
    pub tombstones: usize,
    /// Largest probe distance among live rows.
    pub max_probe_distance: usize,
    /// Load factor (populated / capacity).
    pub load_factor: f64,
    /// Row utilization ((populated + tombstones) / table_len).
    pub row_utilization: f64,
    /// Approximate bytes held by the entry store and index table.
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-prints the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Row Usage: {}+{} tombstones/{} ({:.2}% utilization)",
            self.populated,
            self.tombstones,
            self.table_len,
            self.row_utilization * 100.0
        );
        println!("Max probe distance: {}", self.max_probe_distance);
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// Count of live rows at each probe distance.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// `bins[d]` is the number of live rows sitting `d` rows past their ideal
    /// row.
    pub bins: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Total number of rows counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Prints the histogram as a horizontal bar chart.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            bar.extend(partial);
            bar
        };

        for (distance, &count) in self.bins.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}

/// A Robin Hood hash table over a dense entry store.
///
/// `HashTable<K, V>` stores `(K, V)` pairs. It does not know how to hash or
/// compare keys; callers pass the hash of the key and an equality predicate
/// to every operation, and a hash function to operations that need to
/// relocate a different entry.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use linear_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_str(s: &str) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     s.hash(&mut hasher);
/// #     hasher.finish()
/// # }
/// let mut table: HashTable<String, u32> = HashTable::with_capacity(16);
///
/// table.insert_with(
///     hash_str("alice"),
///     "alice".to_string(),
///     1,
///     |a, b| a == b,
///     |old, new| *old += new,
/// );
/// table.insert_with(
///     hash_str("alice"),
///     "alice".to_string(),
///     2,
///     |a, b| a == b,
///     |old, new| *old += new,
/// );
///
/// let index = table.find_index(hash_str("alice"), |k| k == "alice").unwrap();
/// assert_eq!(table.entries()[index], ("alice".to_string(), 3));
///
/// table.remove(hash_str("alice"), |k| k == "alice", |k| hash_str(k));
/// assert!(table.is_empty());
/// ```
pub struct HashTable<K, V> {
    rows: Box<[Row]>,
    entries: Vec<(K, V)>,
    capacity: usize,
    index_mask: usize,
}

impl<K, V> Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("populated", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("rows", &self.rows)
            .finish()
    }
}

impl<K, V> Clone for HashTable<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut entries = Vec::with_capacity(self.capacity);
        entries.extend_from_slice(&self.entries);

        Self {
            rows: self.rows.clone(),
            entries,
            capacity: self.capacity,
            index_mask: self.index_mask,
        }
    }
}

impl<K, V> HashTable<K, V> {
    /// Creates a table able to hold `capacity` entries before growing.
    ///
    /// Capacities below 4 are rounded up to 4.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if `capacity` is larger than
    /// [`MAX_CAPACITY`].
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        if capacity > MAX_CAPACITY {
            return Err(Error::CapacityExceeded {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }

        let capacity = capacity.max(MIN_CAPACITY);
        let len = table_len(capacity);
        Ok(Self {
            rows: vec![Row::EMPTY; len].into_boxed_slice(),
            entries: Vec::with_capacity(capacity),
            capacity,
            index_mask: len - 1,
        })
    }

    /// Creates a table able to hold `capacity` entries before growing.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is larger than [`MAX_CAPACITY`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String, u32> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_else(|e| fail(e))
    }

    /// Returns the number of entries in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries the table holds before it grows.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the live entries, densely packed.
    ///
    /// The order is an artifact of insertions and removals, not a contract.
    #[inline]
    pub fn entries(&self) -> &[(K, V)] {
        &self.entries
    }

    /// Returns a mutable reference to the value of the entry at `index`.
    ///
    /// Keys are not reachable mutably, as changing a key would break its row.
    #[inline]
    pub fn value_mut(&mut self, index: usize) -> Option<&mut V> {
        self.entries.get_mut(index).map(|(_, v)| v)
    }

    /// Returns the value of the entry at `index`, which must be a position
    /// returned by a lookup since the last mutation.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub(crate) fn value_at_mut(&mut self, index: usize) -> &mut V {
        &mut self.entries[index].1
    }

    /// Consumes the table, returning its entries.
    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }

    /// Removes all entries, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.rows.fill(Row::EMPTY);
        self.entries.clear();
    }

    #[inline(always)]
    pub(crate) fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Looks up the row holding a key, returning its position in the index
    /// table.
    pub(crate) fn find_slot(&self, hash: u32, eq: impl Fn(&K) -> bool) -> Option<usize> {
        let mut idx = hash as usize & self.index_mask;
        let mut dist = 0;

        loop {
            let row = self.rows[idx];
            if row.hash() == hash && !row.is_tombstone() && eq(&self.entries[row.entry_index()].0)
            {
                return Some(idx);
            }

            // A row closer to its ideal row than we would be proves that the
            // key was never pushed this far.
            if row.is_empty() || dist > probe_distance(self.index_mask, row.hash(), idx) {
                return None;
            }

            idx = (idx + 1) & self.index_mask;
            dist += 1;
        }
    }

    /// Looks up a key, returning the position of its entry in [`entries`].
    ///
    /// [`entries`]: HashTable::entries
    pub fn find_index(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<usize> {
        self.find_scrambled(scramble(hash), eq)
    }

    #[inline]
    pub(crate) fn find_scrambled(&self, hash: u32, eq: impl Fn(&K) -> bool) -> Option<usize> {
        self.find_slot(hash, eq)
            .map(|slot| self.rows[slot].entry_index())
    }

    /// Ensures room for `additional` more entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the table would need to hold
    /// more than [`MAX_CAPACITY`] entries. The table is left unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self.entries.len().saturating_add(additional);
        if needed <= self.capacity {
            return Ok(());
        }

        if needed > MAX_CAPACITY {
            return Err(Error::CapacityExceeded {
                requested: needed,
                max: MAX_CAPACITY,
            });
        }

        self.try_grow(needed.max(self.capacity * 2).min(MAX_CAPACITY))
    }

    /// Makes room for one more entry, doubling the capacity when full.
    #[inline]
    fn try_reserve_one(&mut self) -> Result<()> {
        if self.entries.len() < self.capacity {
            Ok(())
        } else if self.capacity >= MAX_CAPACITY {
            Err(Error::CapacityExceeded {
                requested: self.capacity + 1,
                max: MAX_CAPACITY,
            })
        } else {
            self.try_grow((self.capacity * 2).min(MAX_CAPACITY))
        }
    }

    /// Grows the table to hold `capacity` entries.
    ///
    /// Live entries are kept in place. If the index table needs a new length,
    /// every live row is placed again in a fresh index table and tombstones
    /// are dropped. Requests not larger than the current capacity are no-ops.
    pub(crate) fn try_grow(&mut self, capacity: usize) -> Result<()> {
        if capacity > MAX_CAPACITY {
            return Err(Error::CapacityExceeded {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        if capacity <= self.capacity {
            return Ok(());
        }

        let len = table_len(capacity);
        if len != self.rows.len() {
            let mut rows = vec![Row::EMPTY; len].into_boxed_slice();
            let index_mask = len - 1;
            for &row in self.rows.iter().filter(|row| row.is_populated()) {
                place(
                    &mut rows,
                    row.hash(),
                    row.entry_index(),
                    row.hash() as usize & index_mask,
                );
            }
            self.rows = rows;
            self.index_mask = index_mask;
        }

        self.entries.reserve_exact(capacity - self.entries.len());
        self.capacity = capacity;
        Ok(())
    }

    /// Inserts an entry, or merges `value` into the value already stored for
    /// an equal key.
    ///
    /// `merge` receives the stored value and the incoming one. It is only
    /// called when the key is already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the key is new and the table
    /// already holds [`MAX_CAPACITY`] entries.
    pub fn try_insert_with(
        &mut self,
        hash: u64,
        key: K,
        value: V,
        eq: impl Fn(&K, &K) -> bool,
        merge: impl FnOnce(&mut V, V),
    ) -> Result<()> {
        self.try_insert_scrambled(scramble(hash), key, value, eq, merge)
    }

    /// Inserts an entry, or merges `value` into the value already stored for
    /// an equal key.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and the table already holds
    /// [`MAX_CAPACITY`] entries.
    #[track_caller]
    pub fn insert_with(
        &mut self,
        hash: u64,
        key: K,
        value: V,
        eq: impl Fn(&K, &K) -> bool,
        merge: impl FnOnce(&mut V, V),
    ) {
        if let Err(e) = self.try_insert_with(hash, key, value, eq, merge) {
            fail(e)
        }
    }

    pub(crate) fn try_insert_scrambled(
        &mut self,
        hash: u32,
        key: K,
        value: V,
        eq: impl Fn(&K, &K) -> bool,
        merge: impl FnOnce(&mut V, V),
    ) -> Result<()> {
        // Growing before the lookup may grow for a key that turns out to be
        // present, which is harmless.
        self.try_reserve_one()?;
        self.put(hash, key, value, eq, merge);
        Ok(())
    }

    fn put(
        &mut self,
        hash: u32,
        key: K,
        value: V,
        eq: impl Fn(&K, &K) -> bool,
        merge: impl FnOnce(&mut V, V),
    ) {
        debug_assert!(self.entries.len() < self.capacity);

        let mut tombstone = None;
        let mut idx = hash as usize & self.index_mask;
        let mut dist = 0;

        loop {
            let row = self.rows[idx];
            if row.hash() == hash && !row.is_tombstone() {
                let entry = &mut self.entries[row.entry_index()];
                if eq(&key, &entry.0) {
                    merge(&mut entry.1, value);
                    return;
                }
            }

            let row_dist = probe_distance(self.index_mask, row.hash(), idx);
            if row.is_tombstone() {
                tombstone = tombstone.or(Some(idx));
            } else if !row.is_empty() && row_dist > dist {
                tombstone = None;
            }

            if row.is_empty() || dist > row_dist {
                let entry_index = self.entries.len();
                self.entries.push((key, value));

                let new_row = Row::new(hash, entry_index);
                if let Some(tombstone) = tombstone {
                    self.rows[tombstone] = new_row;
                } else if row.is_empty() || row.is_tombstone() {
                    self.rows[idx] = new_row;
                } else {
                    place(&mut self.rows, hash, entry_index, idx);
                }
                return;
            }

            idx = (idx + 1) & self.index_mask;
            dist += 1;
        }
    }

    /// Appends an entry whose key is known to be absent.
    pub(crate) fn push_unique(&mut self, hash: u32, key: K, value: V) {
        debug_assert!(self.entries.len() < self.capacity);

        let entry_index = self.entries.len();
        self.entries.push((key, value));
        place(
            &mut self.rows,
            hash,
            entry_index,
            hash as usize & self.index_mask,
        );
    }

    /// Removes the entry for a key, returning it.
    ///
    /// `hasher` must produce the same hashes that were used to insert the
    /// keys: the last entry of the store is moved into the freed position,
    /// and its row is found again through its hash.
    pub fn remove(
        &mut self,
        hash: u64,
        eq: impl Fn(&K) -> bool,
        hasher: impl Fn(&K) -> u64,
    ) -> Option<(K, V)> {
        let slot = self.find_slot(scramble(hash), eq)?;
        Some(self.remove_slot(slot, hasher))
    }

    fn remove_slot(&mut self, slot: usize, hasher: impl Fn(&K) -> u64) -> (K, V) {
        let row = self.rows[slot];
        let entry_index = row.entry_index();
        let last = self.entries.len() - 1;

        if entry_index != last {
            let last_slot = self.slot_of_entry(scramble(hasher(&self.entries[last].0)), last);
            self.rows[last_slot] = self.rows[last_slot].with_entry_index(entry_index);
        }

        self.rows[slot] = row.into_tombstone();
        self.entries.swap_remove(entry_index)
    }

    /// Finds the row pointing at the entry at `entry_index`.
    ///
    /// The walk starts at the ideal row for `hash` but does not stop at
    /// empty rows, so it terminates even for keys whose hash changed since
    /// insertion.
    fn slot_of_entry(&self, hash: u32, entry_index: usize) -> usize {
        let start = hash as usize & self.index_mask;
        let found = (0..self.rows.len())
            .map(|offset| (start + offset) & self.index_mask)
            .find(|&idx| {
                let row = self.rows[idx];
                row.is_populated() && row.entry_index() == entry_index
            });

        match found {
            Some(idx) => idx,
            None => unreachable!("entry {entry_index} is not indexed by any row"),
        }
    }

    /// Computes a histogram of probe distances of live rows.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut bins = Vec::new();
        for (idx, row) in self.rows.iter().enumerate() {
            if row.is_populated() {
                let dist = probe_distance(self.index_mask, row.hash(), idx);
                if bins.len() <= dist {
                    bins.resize(dist + 1, 0);
                }
                bins[dist] += 1;
            }
        }
        ProbeHistogram { bins }
    }

    /// Returns occupancy statistics for debugging.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let tombstones = self.rows.iter().filter(|row| row.is_tombstone()).count();
        let max_probe_distance = self.probe_histogram().bins.len().saturating_sub(1);

        DebugStats {
            populated: self.entries.len(),
            capacity: self.capacity,
            table_len: self.rows.len(),
            tombstones,
            max_probe_distance,
            load_factor: self.entries.len() as f64 / self.capacity as f64,
            row_utilization: (self.entries.len() + tombstones) as f64 / self.rows.len() as f64,
            total_bytes: self.rows.len() * core::mem::size_of::<Row>()
                + self.capacity * core::mem::size_of::<(K, V)>(),
        }
    }
}
