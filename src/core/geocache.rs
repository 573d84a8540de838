//! Coordinate → place-name lookup with a process-wide, append-only cache.
//! Purely an optimization for notification texts; carries no correctness
//! obligation and may be a no-op.

use crate::models::point::GeoPoint;
use std::collections::HashMap;
use std::sync::Mutex;

pub trait PlaceLookup: Send + Sync {
    fn place_name(&self, point: GeoPoint) -> Option<String>;
}

/// Lookup that never resolves anything; the default and the test double.
pub struct NoPlaceLookup;

impl PlaceLookup for NoPlaceLookup {
    fn place_name(&self, _point: GeoPoint) -> Option<String> {
        None
    }
}

/// Append-only memoization over an inner lookup. Keyed on microdegrees so
/// float noise from repeated parses hits the same entry.
pub struct CachedPlaceLookup<L: PlaceLookup> {
    inner: L,
    cache: Mutex<HashMap<(i64, i64), Option<String>>>,
}

impl<L: PlaceLookup> CachedPlaceLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn key(point: GeoPoint) -> (i64, i64) {
        (
            (point.lat * 1_000_000.0).round() as i64,
            (point.lon * 1_000_000.0).round() as i64,
        )
    }
}

impl<L: PlaceLookup> PlaceLookup for CachedPlaceLookup<L> {
    fn place_name(&self, point: GeoPoint) -> Option<String> {
        let key = Self::key(point);
        let mut cache = self.cache.lock().unwrap();
        if let Some(hit) = cache.get(&key) {
            return hit.clone();
        }
        let resolved = self.inner.place_name(point);
        cache.insert(key, resolved.clone());
        resolved
    }
}
