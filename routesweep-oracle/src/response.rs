use routesweep_geom::Point;

/// The oracle's answer for a single `route()` call (spec §4.B, §6).
#[derive(Debug, Clone)]
pub struct OracleResponse {
    /// Point sequence from `start` to `end`, inclusive, after quantization.
    pub geometry: Vec<Point>,
    pub distance_m: f64,
    pub duration_s: f64,
    /// Set when this is a straight-line fallback rather than a real oracle answer.
    pub synthetic: bool,
}

/// Aggregate call counters, surfaced in the pipeline's diagnostics (spec §4.F).
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleStats {
    pub real_calls: u64,
    pub synthetic_calls: u64,
}

impl OracleStats {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.real_calls + self.synthetic_calls
    }
}

/// Wire shape of the oracle's native JSON response (spec §6).
#[derive(Debug, serde::Deserialize)]
pub(crate) struct WireResponse {
    pub geometry: Vec<[f64; 2]>,
    pub distance_m: f64,
    pub duration_s: f64,
}
