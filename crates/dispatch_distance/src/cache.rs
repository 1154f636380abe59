use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use dispatch_geo::Coordinate;
use fxhash::FxHashMap;
use parking_lot::Mutex;

use crate::{resolver::DistanceResult, source::DistanceMode};

const KEY_PRECISION: f64 = 1e6;

/// Cache key: coordinates rounded to 6 decimal places (sub-meter precision)
/// plus the requested mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    origin_e6: (i64, i64),
    destination_e6: (i64, i64),
    mode: DistanceMode,
}

impl CacheKey {
    pub fn new(origin: &Coordinate, destination: &Coordinate, mode: DistanceMode) -> Self {
        CacheKey {
            origin_e6: quantize(origin),
            destination_e6: quantize(destination),
            mode,
        }
    }
}

fn quantize(coordinate: &Coordinate) -> (i64, i64) {
    (
        (coordinate.latitude() * KEY_PRECISION).round() as i64,
        (coordinate.longitude() * KEY_PRECISION).round() as i64,
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
}

struct CacheEntry {
    result: DistanceResult,
    inserted_at: Instant,
}

struct CacheInner {
    entries: FxHashMap<CacheKey, CacheEntry>,
    // Insertion order, kept in sync with `entries`; eviction pops the
    // oldest-inserted key.
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Bounded distance cache shared by concurrent `resolve` calls. Eviction is
/// insertion-ordered; entries optionally expire after a TTL, checked on read.
pub struct DistanceCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl DistanceCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        DistanceCache {
            inner: Mutex::new(CacheInner {
                entries: FxHashMap::default(),
                order: VecDeque::new(),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<DistanceResult> {
        let mut inner = self.inner.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) => match self.ttl {
                Some(ttl) => entry.inserted_at.elapsed() > ttl,
                None => false,
            },
            None => {
                inner.misses += 1;
                return None;
            }
        };

        if expired {
            inner.entries.remove(key);
            // Drop the order slot too, or a later re-insert of this key
            // would leave a stale copy at the front and the next purge
            // would evict the fresh entry instead of the oldest live one.
            if let Some(position) = inner.order.iter().position(|k| k == key) {
                inner.order.remove(position);
            }
            inner.misses += 1;
            return None;
        }

        inner.hits += 1;
        Some(inner.entries[key].result.clone())
    }

    pub fn insert(&self, key: CacheKey, result: DistanceResult) {
        let mut inner = self.inner.lock();

        let entry = CacheEntry {
            result,
            inserted_at: Instant::now(),
        };

        if inner.entries.insert(key, entry).is_some() {
            // Refreshed an existing key; order position is kept.
            return;
        }

        inner.order.push_back(key);

        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    if inner.entries.remove(&oldest).is_some() {
                        inner.evictions += 1;
                    }
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            len: inner.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_km(distance_km: f64) -> DistanceResult {
        DistanceResult {
            distance_km,
            mode: DistanceMode::Geometric,
            fallback_used: false,
            error: None,
        }
    }

    fn key(lat: f64, lon: f64) -> CacheKey {
        CacheKey::new(
            &Coordinate::new(lat, lon),
            &Coordinate::new(0.0, 0.0),
            DistanceMode::Geometric,
        )
    }

    #[test]
    fn keys_round_to_six_decimals() {
        let a = CacheKey::new(
            &Coordinate::new(42.500_000_4, -92.5),
            &Coordinate::new(0.0, 0.0),
            DistanceMode::Geometric,
        );
        let b = key(42.5, -92.5);

        assert_eq!(a, b);
    }

    #[test]
    fn mode_is_part_of_the_key() {
        let origin = Coordinate::new(42.5, -92.5);
        let destination = Coordinate::new(0.0, 0.0);

        let geometric = CacheKey::new(&origin, &destination, DistanceMode::Geometric);
        let external = CacheKey::new(&origin, &destination, DistanceMode::External);

        assert_ne!(geometric, external);
    }

    #[test]
    fn evicts_oldest_inserted_at_capacity() {
        let cache = DistanceCache::new(2, None);

        cache.insert(key(1.0, 0.0), result_km(1.0));
        cache.insert(key(2.0, 0.0), result_km(2.0));
        cache.insert(key(3.0, 0.0), result_km(3.0));

        assert!(cache.get(&key(1.0, 0.0)).is_none());
        assert!(cache.get(&key(2.0, 0.0)).is_some());
        assert!(cache.get(&key(3.0, 0.0)).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn refreshing_a_key_does_not_grow_the_cache() {
        let cache = DistanceCache::new(2, None);

        cache.insert(key(1.0, 0.0), result_km(1.0));
        cache.insert(key(1.0, 0.0), result_km(1.5));
        cache.insert(key(2.0, 0.0), result_km(2.0));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key(1.0, 0.0)).unwrap().distance_km, 1.5);
    }

    #[test]
    fn expired_entries_miss() {
        let cache = DistanceCache::new(10, Some(Duration::from_millis(0)));

        cache.insert(key(1.0, 0.0), result_km(1.0));
        std::thread::sleep(Duration::from_millis(2));

        assert!(cache.get(&key(1.0, 0.0)).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn reinserted_key_after_expiry_is_newest_again() {
        let cache = DistanceCache::new(2, Some(Duration::from_millis(20)));

        cache.insert(key(1.0, 0.0), result_km(1.0));
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&key(1.0, 0.0)).is_none());

        cache.insert(key(2.0, 0.0), result_km(2.0));
        cache.insert(key(1.0, 0.0), result_km(1.1));
        cache.insert(key(3.0, 0.0), result_km(3.0));

        // The oldest live entry (2.0) goes, not the re-inserted 1.0.
        assert!(cache.get(&key(2.0, 0.0)).is_none());
        assert_eq!(cache.get(&key(1.0, 0.0)).unwrap().distance_km, 1.1);
        assert!(cache.get(&key(3.0, 0.0)).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn counts_hits_and_misses() {
        let cache = DistanceCache::new(10, None);

        assert!(cache.get(&key(1.0, 0.0)).is_none());
        cache.insert(key(1.0, 0.0), result_km(1.0));
        assert!(cache.get(&key(1.0, 0.0)).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
