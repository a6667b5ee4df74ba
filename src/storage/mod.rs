//! The backing storage for fork trees.
//!
//! This module is home for the following items:
//! - [`SlotStorage`], a growable array of fixed-size records paired with an occupancy bitset, which hands out slot indices close to a given hint
//! - [`StorageConfig`], the initial capacity and growth increment of a `SlotStorage`
//!
//! Slots are never deallocated individually. Removing an element only clears its occupancy bit, and the slot gets reused by a later insertion. Growing the storage appends new vacant slots at the end, so an index keeps pointing at the same element for as long as that element is live.
//!
//! [`SlotStorage`]: struct.SlotStorage.html " "
//! [`StorageConfig`]: struct.StorageConfig.html " "

mod slots;
pub use slots::SlotStorage;

use crate::tracing_helpers::warn_log;

/// The initial capacity used by [`StorageConfig::default`].
///
/// [`StorageConfig::default`]: struct.StorageConfig.html#method.default " "
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;
/// The growth increment used by [`StorageConfig::default`].
///
/// [`StorageConfig::default`]: struct.StorageConfig.html#method.default " "
pub const DEFAULT_GROWTH_INCREMENT: usize = 1024;

/// The smallest initial capacity a storage can have: the sentinel slot and the root slot.
pub const MIN_INITIAL_CAPACITY: usize = 2;

/// Sizing parameters of a [`SlotStorage`].
///
/// The storage starts out with `initial_capacity` slots and grows by `growth_increment` slots whenever an insertion finds it full. It never shrinks.
///
/// # Example
/// ```rust
/// # use kindling::storage::StorageConfig;
/// let config = StorageConfig::new()
///     .with_initial_capacity(64)
///     .with_growth_increment(32);
/// assert_eq!(config.initial_capacity(), 64);
/// assert_eq!(config.growth_increment(), 32);
///
/// // Values which cannot work are clamped:
/// let config = StorageConfig::new().with_initial_capacity(0).with_growth_increment(0);
/// assert_eq!(config.initial_capacity(), 2);
/// assert_eq!(config.growth_increment(), 1);
/// ```
///
/// [`SlotStorage`]: struct.SlotStorage.html " "
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorageConfig {
    initial_capacity: usize,
    growth_increment: usize,
}
impl StorageConfig {
    /// Creates a configuration with the default values: 1024 initial slots, growing by 1024 slots at a time.
    #[inline]
    pub const fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            growth_increment: DEFAULT_GROWTH_INCREMENT,
        }
    }
    /// Sets the number of slots allocated up front, including the sentinel slot. Clamped to at least 2.
    #[inline]
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        if initial_capacity < MIN_INITIAL_CAPACITY {
            warn_log!(
                requested = initial_capacity,
                "initial capacity cannot fit the sentinel and the root, clamping to {}",
                MIN_INITIAL_CAPACITY
            );
        }
        self.initial_capacity = initial_capacity.max(MIN_INITIAL_CAPACITY);
        self
    }
    /// Sets the number of slots appended whenever the storage is full. Clamped to at least 1.
    #[inline]
    pub fn with_growth_increment(mut self, growth_increment: usize) -> Self {
        if growth_increment == 0 {
            warn_log!("a growth increment of zero would never make room, clamping to 1");
        }
        self.growth_increment = growth_increment.max(1);
        self
    }
    /// Returns the number of slots allocated up front.
    #[inline(always)]
    pub const fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }
    /// Returns the number of slots appended whenever the storage is full.
    #[inline(always)]
    pub const fn growth_increment(&self) -> usize {
        self.growth_increment
    }
}
impl Default for StorageConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
