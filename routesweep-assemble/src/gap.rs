use routesweep_geom::{haversine, Point};

/// Disposition of a single gap between consecutive emitted points (spec §4.E
/// gap-size policy table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapAction {
    /// `<= snap_eps_m`: absorbed silently, duplicate point dropped.
    SilentDrift,
    /// `> snap_eps_m` and `<= small_join_m`: joined directly, no oracle call.
    DirectJoin,
    /// `> small_join_m`: bridged with oracle-supplied geometry.
    OracleSplice,
    /// A gap that repair could not close (budget exhausted or oracle
    /// couldn't reduce it below threshold).
    Unresolved,
}

#[derive(Debug, Clone, Copy)]
pub struct GapRecord {
    pub gap_m: f64,
    pub action: GapAction,
}

/// Four-bucket histogram over gap sizes (spec §4.F: "bucketed: ≤1 m, ≤15 m,
/// ≤30 m, >30 m").
#[derive(Debug, Clone, Copy, Default)]
pub struct GapHistogram {
    pub le_1m: u32,
    pub le_15m: u32,
    pub le_30m: u32,
    pub gt_30m: u32,
}

impl GapHistogram {
    pub fn record(&mut self, gap_m: f64) {
        if gap_m <= 1.0 {
            self.le_1m += 1;
        } else if gap_m <= 15.0 {
            self.le_15m += 1;
        } else if gap_m <= 30.0 {
            self.le_30m += 1;
        } else {
            self.gt_30m += 1;
        }
    }
}

/// Running accumulation of gap records, used to compute max/mean/p95 for
/// diagnostics (spec §4.F).
#[derive(Debug, Clone, Default)]
pub struct GapSummary {
    pub histogram: GapHistogram,
    records: Vec<GapRecord>,
}

impl GapSummary {
    /// Records one consecutive-pair gap and the disposition the assembler
    /// gave it. Called for every gap produced, whether it's an intra-circuit
    /// join, an inter-circuit connector, or a final-repair splice.
    pub fn push(&mut self, gap_m: f64, action: GapAction) {
        self.histogram.record(gap_m);
        self.records.push(GapRecord { gap_m, action });
    }

    #[must_use]
    pub fn records(&self) -> &[GapRecord] {
        &self.records
    }

    #[must_use]
    pub fn max_m(&self) -> f64 {
        self.records.iter().map(|r| r.gap_m).fold(0.0, f64::max)
    }

    #[must_use]
    pub fn mean_m(&self) -> f64 {
        if self.records.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = self.records.len() as f64;
            self.records.iter().map(|r| r.gap_m).sum::<f64>() / n
        }
    }

    /// 95th percentile via nearest-rank on a sorted copy; adequate for a
    /// diagnostics summary, not a latency SLO.
    #[must_use]
    pub fn p95_m(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self.records.iter().map(|r| r.gap_m).collect();
        sorted.sort_by(f64::total_cmp);
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let idx = (((sorted.len() - 1) as f64) * 0.95).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }
}

/// Finds every adjacent pair in `points` whose gap exceeds `threshold_m`,
/// returning the index of the first point in each offending pair.
#[must_use]
pub fn gap_indices(points: &[Point], threshold_m: f64) -> Vec<usize> {
    points
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| (haversine(pair[0], pair[1]) > threshold_m).then_some(i))
        .collect()
}
