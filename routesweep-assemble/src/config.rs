/// Tunables governing stitching and chunking (spec §4.E, §6).
#[derive(Debug, Clone, Copy)]
pub struct AssembleConfig {
    /// Continuity invariant threshold; gaps above this are violations.
    pub max_gap_m: f64,
    /// Below this, a gap is silently absorbed as drift.
    pub snap_eps_m: f64,
    /// Above this, the oracle is consulted rather than directly joined.
    pub small_join_m: f64,
    /// Target per-chunk drive time.
    pub chunk_duration_s: u32,
    /// Max concurrent oracle calls during inter-circuit prefetch.
    pub oracle_concurrency: usize,
    /// Upper bound on total oracle calls for this assembly; `None` is unlimited.
    pub oracle_call_budget: Option<u32>,
}

impl AssembleConfig {
    pub const DEFAULT_MAX_GAP_M: f64 = 30.0;
    pub const DEFAULT_SNAP_EPS_M: f64 = 1.0;
    pub const DEFAULT_SMALL_JOIN_M: f64 = 15.0;
    pub const DEFAULT_CHUNK_DURATION_S: u32 = 3600;
    pub const DEFAULT_ORACLE_CONCURRENCY: usize = 4;
    /// Bounded repair passes over remaining gaps after assembly (spec §4.E
    /// "Final continuity repair").
    pub const MAX_REPAIR_PASSES: u32 = 2;
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            max_gap_m: Self::DEFAULT_MAX_GAP_M,
            snap_eps_m: Self::DEFAULT_SNAP_EPS_M,
            small_join_m: Self::DEFAULT_SMALL_JOIN_M,
            chunk_duration_s: Self::DEFAULT_CHUNK_DURATION_S,
            oracle_concurrency: Self::DEFAULT_ORACLE_CONCURRENCY,
            oracle_call_budget: None,
        }
    }
}
