//! Memoization primitives used by [`FontCached`](crate::FontCached).
//!
//! Each query operation gets its own [`QueryCache`], keyed by that
//! operation's typed argument tuple. Keys are compared structurally, so two
//! argument tuples share an entry only when they are equal as tuples.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use tracing::trace;

use crate::logging::targets;

/// A pixel size used as a cache key.
///
/// Keys on the IEEE 754 bit pattern, so sizes that differ in any bit get
/// separate entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PixelSize(u32);

impl From<f32> for PixelSize {
    fn from(px: f32) -> Self {
        Self(px.to_bits())
    }
}

/// Hit and miss counts for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute a value.
    pub misses: u64,
    /// Entries currently stored.
    pub entries: usize,
}

impl CacheStats {
    /// Total number of lookups.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Cache statistics for every memoized font operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontCacheStats {
    /// `lookup_glyph_index`, keyed by character.
    pub lookup_glyph_index: CacheStats,
    /// `metrics_indexed`, keyed by glyph index and pixel size.
    pub metrics_indexed: CacheStats,
    /// `rasterize_indexed`, keyed by glyph index and pixel size.
    pub rasterize_indexed: CacheStats,
    /// `units_per_em`, a single slot.
    pub units_per_em: CacheStats,
    /// `scale_factor`, keyed by pixel size.
    pub scale_factor: CacheStats,
    /// `horizontal_line_metrics`, keyed by pixel size.
    pub horizontal_line_metrics: CacheStats,
    /// `vertical_line_metrics`, keyed by pixel size.
    pub vertical_line_metrics: CacheStats,
}

impl FontCacheStats {
    /// Total misses across all operations.
    pub fn total_misses(&self) -> u64 {
        self.all().iter().map(|s| s.misses).sum()
    }

    /// Total hits across all operations.
    pub fn total_hits(&self) -> u64 {
        self.all().iter().map(|s| s.hits).sum()
    }

    fn all(&self) -> [CacheStats; 7] {
        [
            self.lookup_glyph_index,
            self.metrics_indexed,
            self.rasterize_indexed,
            self.units_per_em,
            self.scale_factor,
            self.horizontal_line_metrics,
            self.vertical_line_metrics,
        ]
    }
}

/// An unbounded memo table for one operation.
///
/// Values are computed at most once per key. Failed computations are not
/// stored.
pub(crate) struct QueryCache<K, V> {
    name: &'static str,
    entries: HashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash, V> QueryCache<K, V> {
    /// Create an empty cache. `name` labels trace output.
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub(crate) fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<&V, E> {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let value = compute()?;
                self.misses += 1;
                trace!(
                    target: targets::CACHE,
                    cache = self.name,
                    misses = self.misses,
                    "cache miss"
                );
                Ok(entry.insert(value))
            }
        }
    }

    /// Current statistics.
    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

/// A lazily filled single-value cache for zero-argument operations.
#[derive(Debug)]
pub(crate) struct SlotCache<V> {
    value: Option<V>,
    hits: u64,
    misses: u64,
}

impl<V> SlotCache<V> {
    /// Create an empty slot.
    pub(crate) fn new() -> Self {
        Self {
            value: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the stored value, computing it on first use.
    pub(crate) fn get_or_try_init<E>(&mut self, compute: impl FnOnce() -> Result<V, E>) -> Result<&V, E> {
        match &mut self.value {
            Some(value) => {
                self.hits += 1;
                Ok(&*value)
            }
            slot @ None => {
                let value = compute()?;
                self.misses += 1;
                Ok(&*slot.insert(value))
            }
        }
    }

    /// Current statistics.
    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: usize::from(self.value.is_some()),
        }
    }
}

impl<V> Default for SlotCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once_per_key() {
        let mut cache = QueryCache::new("test");
        let mut calls = 0;

        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with((1u16, PixelSize::from(17.0)), || {
                    calls += 1;
                    Ok::<_, ()>(calls * 10)
                })
                .copied();
            assert_eq!(value, Ok(10));
        }

        assert_eq!(calls, 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache: QueryCache<u8, u8> = QueryCache::new("test");

        assert_eq!(cache.get_or_try_insert_with(1, || Err("boom")), Err("boom"));
        assert_eq!(cache.stats(), CacheStats::default());

        assert_eq!(cache.get_or_try_insert_with(1, || Ok::<_, &str>(5)), Ok(&5));
        assert_eq!(cache.get_or_try_insert_with(1, || Ok::<_, &str>(6)), Ok(&5));
    }

    #[test]
    fn tuples_sharing_a_concatenation_stay_distinct() {
        // Joined without structure these would all read "123".
        let mut cache = QueryCache::new("test");
        let keys = [
            (1u16, PixelSize::from(23.0)),
            (12u16, PixelSize::from(3.0)),
            (123u16, PixelSize::from(0.5)),
        ];
        for (i, key) in keys.into_iter().enumerate() {
            let value = *cache.get_or_try_insert_with(key, || Ok::<_, ()>(i)).unwrap();
            assert_eq!(value, i);
        }
        assert_eq!(cache.stats().entries, 3);
        assert_eq!(cache.stats().misses, 3);
    }

    #[test]
    fn slot_fills_once() {
        let mut slot = SlotCache::new();
        assert_eq!(slot.get_or_try_init(|| Err::<u16, _>("later")), Err("later"));
        assert_eq!(slot.stats().entries, 0);

        assert_eq!(slot.get_or_try_init(|| Ok::<_, &str>(2048)), Ok(&2048));
        assert_eq!(slot.get_or_try_init(|| Ok::<_, &str>(1000)), Ok(&2048));
        assert_eq!(
            slot.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn pixel_size_keys_on_bits() {
        assert_eq!(PixelSize::from(17.0), PixelSize::from(17.0));
        assert_ne!(PixelSize::from(17.0), PixelSize::from(17.000_002));
        assert_ne!(PixelSize::from(0.0), PixelSize::from(-0.0));
    }

    #[test]
    fn font_stats_totals() {
        let stats = FontCacheStats {
            rasterize_indexed: CacheStats {
                hits: 4,
                misses: 1,
                entries: 1,
            },
            lookup_glyph_index: CacheStats {
                hits: 2,
                misses: 2,
                entries: 2,
            },
            ..Default::default()
        };
        assert_eq!(stats.total_hits(), 6);
        assert_eq!(stats.total_misses(), 3);
        assert_eq!(stats.rasterize_indexed.lookups(), 5);
    }
}
