use std::hash::{Hash, Hasher};

use routesweep_geom::{quantize, Point};

use crate::profile::Profile;

/// Deterministic cache key: hash(start, end, profile) over quantized
/// endpoints (spec §4.B), so that float jitter below the quantization
/// threshold still hits the same cache entry.
pub(crate) fn cache_key(start: Point, end: Point, profile: Profile) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    quantize(start).hash(&mut hasher);
    quantize(end).hash(&mut hasher);
    profile.hash(&mut hasher);
    hasher.finish()
}
