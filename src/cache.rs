//! Bounded LRU caches for rendered section images.
//!
//! A viewer session keeps one [`PixelCache`] for decoded grayscale bitmaps
//! and one [`TextureCache`] for render-target-ready RGBA images, both owned
//! by whichever component owns the volume session. Entries are keyed by the
//! deterministic string form of a [`SectionKey`], so identical sampling
//! requests hit the same entry instead of resampling the volume.

use crate::section::Section;

use image::{GrayImage, RgbaImage};
use std::collections::HashMap;
use tracing::debug;

/// Default entry bound for viewer-session caches.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Cache of decoded grayscale section bitmaps.
pub type PixelCache = SliceCache<GrayImage>;

/// Cache of render-target-ready RGBA images.
pub type TextureCache = SliceCache<RgbaImage>;

/// String-keyed cache over section-derived images with strict
/// least-recently-used eviction.
///
/// Access order defines recency for both reads and writes: a read hit
/// promotes the entry to most-recently-used, and `put` on an existing key
/// replaces it at the most-recently-used position. Eviction happens only on
/// `put`, one entry at a time, and only when a capacity is set.
pub struct SliceCache<V> {
    entries: HashMap<String, V>,
    /// Access order, least recently used first.
    order: Vec<String>,
    capacity: Option<usize>,
    hits: u64,
    misses: u64,
}

impl<V> Default for SliceCache<V> {
    fn default() -> Self {
        Self::bounded(DEFAULT_CACHE_CAPACITY)
    }
}

impl<V> SliceCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn bounded(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            capacity: Some(capacity.max(1)),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a cache that never evicts.
    pub fn unbounded() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            capacity: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a cached image; a hit becomes the most-recently-used entry.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.hits += 1;
            self.promote(key);
            self.entries.get(key)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Insert an image at the most-recently-used position.
    ///
    /// An existing entry under the same key is replaced (and its recency
    /// reset). If a capacity is set and exceeded, the single
    /// least-recently-used entry is evicted.
    pub fn put(&mut self, key: String, value: V) {
        if self.entries.insert(key.clone(), value).is_some() {
            self.order.retain(|k| *k != key);
        }
        self.order.push(key);

        if let Some(capacity) = self.capacity
            && self.entries.len() > capacity
        {
            let evicted = self.order.remove(0);
            self.entries.remove(&evicted);
            debug!(key = %evicted, "evicted least-recently-used cache entry");
        }
    }

    fn promote(&mut self, key: &str) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            let key = self.order.remove(position);
            self.order.push(key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Drop all entries; counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// The sampling parameters a cached image was rendered from.
///
/// Serializes to a deterministic fixed-precision string so identical
/// requests share a cache entry; any parameter difference yields a
/// different key for the finite coordinates a viewer actually produces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionKey {
    pub section: Section,
    pub output: (u32, u32),
    pub window_center: f32,
    pub window_width: f32,
}

impl SectionKey {
    pub fn to_key_string(&self) -> String {
        let [ox, oy, oz] = self.section.origin;
        let [xx, xy, xz] = self.section.x_axis;
        let [yx, yy, yz] = self.section.y_axis;
        format!(
            "o:{ox:.6},{oy:.6},{oz:.6};x:{xx:.6},{xy:.6},{xz:.6};y:{yx:.6},{yy:.6},{yz:.6};out:{}x{};win:{:.3}/{:.3}",
            self.output.0, self.output.1, self.window_center, self.window_width,
        )
    }
}
