use serde::Serialize;
use std::time::Duration;

use routesweep_assemble::{Chunk, GapSummary};
use routesweep_geom::Point;

/// Outcome classification for a completed (non-error) run (spec §6, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Every invariant held: no unresolved gaps, no exhausted budget.
    Completed,
    /// A route was produced, but at least one bounded issue was recorded
    /// (`OracleExhausted` and/or `UnresolvedGap`, spec §7).
    CompletedWithWarnings,
}

/// Per-stage wall-clock timings, attached to diagnostics for operational
/// visibility (spec §4.H).
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageTimings {
    pub graph_build_ms: u64,
    pub eulerization_ms: u64,
    pub assembly_ms: u64,
    pub total_ms: u64,
}

impl StageTimings {
    pub(crate) fn record(field: &mut u64, elapsed: Duration) {
        *field = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    }
}

/// Required metrics recorded for every run (spec §4.F).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub nodes_before: usize,
    pub edges_before: usize,
    pub nodes_after: usize,
    pub edges_after: usize,
    pub scc_count: usize,
    pub scc_sizes: Vec<usize>,
    pub imbalanced_node_count: usize,
    pub duplicated_length_m: f64,
    pub deadhead_ratio: f64,
    pub oracle_calls_real: u64,
    pub oracle_calls_synthetic: u64,
    pub gap_max_m: f64,
    pub gap_mean_m: f64,
    pub gap_p95_m: f64,
    pub gap_histogram: GapHistogramView,
    pub violations: usize,
    pub continuity_valid: bool,
    pub features_skipped_invalid: usize,
    pub timings: StageTimings,
}

/// Serializable mirror of [`routesweep_assemble::GapHistogram`] (kept
/// separate so the assemble crate's internal type doesn't need to derive
/// `Serialize` purely for this crate's benefit).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GapHistogramView {
    pub le_1m: u32,
    pub le_15m: u32,
    pub le_30m: u32,
    pub gt_30m: u32,
}

impl From<&GapSummary> for GapHistogramView {
    fn from(summary: &GapSummary) -> Self {
        Self {
            le_1m: summary.histogram.le_1m,
            le_15m: summary.histogram.le_15m,
            le_30m: summary.histogram.le_30m,
            gt_30m: summary.histogram.gt_30m,
        }
    }
}

/// A contiguous sub-range of `geometry`, bounded by drive time (spec §6
/// output contract), carried alongside its byte offsets into the route.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChunkView {
    pub start_idx: usize,
    pub end_idx: usize,
    pub length_m: f64,
    pub duration_s: f64,
}

impl From<Chunk> for ChunkView {
    fn from(c: Chunk) -> Self {
        Self {
            start_idx: c.start_idx,
            end_idx: c.end_idx,
            length_m: c.length_m,
            duration_s: c.duration_s,
        }
    }
}

/// The pipeline's successful output (spec §6 output contract). Always
/// returned for any non-`PipelineError` outcome, even when `status` is
/// `completed_with_warnings`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub geometry: Vec<Point>,
    pub chunks: Vec<ChunkView>,
    pub length_m: f64,
    pub duration_s: f64,
    pub diagnostics: Diagnostics,
    pub status: Status,
}
