use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use routesweep_euler::SccResult;
use routesweep_geom::{haversine, Point};
use routesweep_graph::Tags;
use routesweep_oracle::{OracleResponse, Profile, RoutingOracle};

use crate::config::AssembleConfig;
use crate::error::AssemblyError;
use crate::gap::{gap_indices, GapAction, GapSummary};

/// Speed assumed for oracle connectors and unresolved gaps with no tag
/// context of their own (spec §4.E chunking: "fallback 30 km/h").
const FALLBACK_SPEED_KMH: f64 = 30.0;

/// The continuous, gap-annotated point sequence produced by assembly (spec
/// §4.E, before chunking). `durations_s[i]` is the estimated drive time from
/// `points[i]` to `points[i+1]`, kept in lockstep with `points` for chunking.
#[derive(Debug, Clone)]
pub struct AssembledRoute {
    pub points: Vec<Point>,
    pub durations_s: Vec<f64>,
    pub length_m: f64,
    pub oracle_calls_real: u64,
    pub oracle_calls_synthetic: u64,
    pub gap_summary: GapSummary,
    pub violations: usize,
    pub continuity_valid: bool,
}

struct Stats {
    oracle_calls_real: u64,
    oracle_calls_synthetic: u64,
    oracle_calls_used: u32,
    gap_summary: GapSummary,
    budget: Option<u32>,
}

impl Stats {
    fn new(budget: Option<u32>) -> Self {
        Self {
            oracle_calls_real: 0,
            oracle_calls_synthetic: 0,
            oracle_calls_used: 0,
            gap_summary: GapSummary::default(),
            budget,
        }
    }

    fn record_response(&mut self, resp: &OracleResponse) {
        if resp.synthetic {
            self.oracle_calls_synthetic += 1;
        } else {
            self.oracle_calls_real += 1;
        }
        self.oracle_calls_used += 1;
    }

    fn budget_available(&self) -> bool {
        self.budget.is_none_or(|cap| self.oracle_calls_used < cap)
    }
}

/// Appends `new_points` to `points`, assuming they continue directly from
/// `points.last()`, recording a matching per-segment duration at
/// `speed_kmh` for each new segment so `durations_s` stays in lockstep.
fn push_run(points: &mut Vec<Point>, durations_s: &mut Vec<f64>, new_points: &[Point], speed_kmh: f64) {
    let speed_mps = speed_kmh * 1000.0 / 3600.0;
    for &p in new_points {
        if let Some(&prev) = points.last() {
            durations_s.push(haversine(prev, p) / speed_mps);
        }
        points.push(p);
    }
}

/// Stitches every SCC's Eulerian circuit into one continuous point sequence,
/// in `order`, bridging gaps per the policy in spec §4.E.
///
/// # Errors
/// Returns [`AssemblyError::NoCircuits`] if `sccs` is non-empty but every
/// circuit turned out empty — a graph-construction or eulerization bug, not
/// a property of the route itself.
pub async fn assemble(
    sccs: &[SccResult],
    order: &[usize],
    oracle: &dyn RoutingOracle,
    profile: Profile,
    config: &AssembleConfig,
) -> Result<AssembledRoute, AssemblyError> {
    if !sccs.is_empty() && sccs.iter().all(|s| s.circuit.is_empty()) {
        return Err(AssemblyError::NoCircuits);
    }

    let mut stats = Stats::new(config.oracle_call_budget);
    let mut points: Vec<Point> = Vec::new();
    let mut durations_s: Vec<f64> = Vec::new();

    // Prefetch every inter-circuit connector concurrently, bounded by the
    // configured concurrency cap (spec §5: oracle calls may run as
    // cooperatively scheduled sub-tasks up to a semaphore-bounded limit).
    // Kept aligned 1:1 with `order.windows(2)` (`None` for any pair touching
    // an empty circuit) so the main loop below can index it by position.
    let legs: Vec<Option<(Point, Point)>> = order
        .windows(2)
        .map(|pair| {
            let tail = circuit_tail(&sccs[pair[0]])?;
            let head = circuit_head(&sccs[pair[1]])?;
            Some((tail, head))
        })
        .collect();
    let connectors = prefetch_connectors(&legs, oracle, profile, config.oracle_concurrency).await;

    for (i, &scc_idx) in order.iter().enumerate() {
        let scc = &sccs[scc_idx];
        if scc.circuit.is_empty() {
            continue;
        }

        if i > 0 {
            if let Some(resp) = connectors.get(i - 1).and_then(Option::as_ref) {
                if stats.budget_available() {
                    let head = circuit_head(scc).expect("circuit is non-empty");
                    let last = *points.last().expect("a prior non-empty circuit already appended points");
                    let gap_m = haversine(last, head);
                    stats.record_response(resp);
                    stats.gap_summary.push(gap_m, GapAction::OracleSplice);
                    splice_connector(&mut points, &mut durations_s, resp, head);
                } else {
                    // Leave the gap for append_within_circuit's first call
                    // below to record and direct-join; no points have moved,
                    // so that call sees the same gap and records it once.
                    warn!("oracle call budget exhausted; inter-circuit gap left unresolved");
                }
            }
        }

        for step in &scc.circuit {
            let edge = scc.balanced_graph.edge_weight(step.edge);
            append_within_circuit(
                &mut points,
                &mut durations_s,
                &edge.geometry,
                edge.tags.as_ref(),
                config,
                &mut stats,
                oracle,
                profile,
            )
            .await;
        }
    }

    repair_remaining_gaps(&mut points, &mut durations_s, oracle, profile, config, &mut stats).await;

    let length_m: f64 = points.windows(2).map(|pair| haversine(pair[0], pair[1])).sum();
    let final_violations = gap_indices(&points, config.max_gap_m).len();

    info!(
        points = points.len(),
        oracle_real = stats.oracle_calls_real,
        oracle_synthetic = stats.oracle_calls_synthetic,
        violations = final_violations,
        "route assembled"
    );

    Ok(AssembledRoute {
        points,
        durations_s,
        length_m,
        oracle_calls_real: stats.oracle_calls_real,
        oracle_calls_synthetic: stats.oracle_calls_synthetic,
        gap_summary: stats.gap_summary,
        violations: final_violations,
        continuity_valid: final_violations == 0,
    })
}

fn circuit_head(scc: &SccResult) -> Option<Point> {
    let step = scc.circuit.first()?;
    Some(scc.balanced_graph.edge_weight(step.edge).geometry[0])
}

fn circuit_tail(scc: &SccResult) -> Option<Point> {
    let step = scc.circuit.last()?;
    let geometry = &scc.balanced_graph.edge_weight(step.edge).geometry;
    Some(*geometry.last().expect("edge geometry always has at least two points"))
}

/// Fetches every inter-circuit connector concurrently, bounded by a
/// semaphore (spec §5 concurrency cap). Each call always hits the oracle per
/// spec §4.E ("between circuits, always route via the oracle").
async fn prefetch_connectors(
    legs: &[Option<(Point, Point)>],
    oracle: &dyn RoutingOracle,
    profile: Profile,
    concurrency: usize,
) -> Vec<Option<OracleResponse>> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let calls = legs.iter().map(|&leg| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let (start, end) = leg?;
            let _permit = semaphore.acquire().await.expect("semaphore is never closed");
            Some(oracle.route(start, end, profile).await)
        }
    });
    join_all(calls).await
}

/// The average speed implied by an oracle response, falling back to
/// [`FALLBACK_SPEED_KMH`] when the response carries no usable timing.
fn response_speed_kmh(resp: &OracleResponse) -> f64 {
    if resp.duration_s > 0.0 && resp.distance_m > 0.0 {
        (resp.distance_m / resp.duration_s) * 3.6
    } else {
        FALLBACK_SPEED_KMH
    }
}

/// Splices an oracle connector between the current end of `points` and
/// `target`. The oracle's own endpoints may differ slightly after
/// quantization or snapping; both are overwritten with the exact points
/// they must match (spec §4.E "critical correctness requirement"), and the
/// duplicate leading/trailing points are dropped since `points` and `target`
/// already carry them.
fn splice_connector(points: &mut Vec<Point>, durations_s: &mut Vec<f64>, resp: &OracleResponse, target: Point) {
    let tail = *points.last().expect("connectors only splice after a non-empty sequence");
    let mut geometry = resp.geometry.clone();
    if let Some(first) = geometry.first_mut() {
        *first = tail;
    }
    if let Some(last) = geometry.last_mut() {
        *last = target;
    }
    let inner: &[Point] = if geometry.len() >= 2 {
        &geometry[1..geometry.len() - 1]
    } else {
        &geometry[..]
    };
    push_run(points, durations_s, inner, response_speed_kmh(resp));
}

/// Applies the gap-size policy (spec §4.E table) between the last emitted
/// point and the next edge's geometry, then appends that geometry.
#[allow(clippy::too_many_arguments)]
async fn append_within_circuit(
    points: &mut Vec<Point>,
    durations_s: &mut Vec<f64>,
    geometry: &[Point],
    tags: Option<&Tags>,
    config: &AssembleConfig,
    stats: &mut Stats,
    oracle: &dyn RoutingOracle,
    profile: Profile,
) {
    let speed_kmh = tags.map_or(FALLBACK_SPEED_KMH, Tags::speed_kmh);

    let Some(&last) = points.last() else {
        push_run(points, durations_s, geometry, speed_kmh);
        return;
    };
    let next_first = geometry[0];
    let gap_m = haversine(last, next_first);

    let action = if gap_m <= config.snap_eps_m {
        GapAction::SilentDrift
    } else if gap_m <= config.small_join_m {
        GapAction::DirectJoin
    } else if stats.budget_available() {
        GapAction::OracleSplice
    } else {
        GapAction::Unresolved
    };
    stats.gap_summary.push(gap_m, action);

    match action {
        GapAction::SilentDrift => push_run(points, durations_s, &geometry[1..], speed_kmh),
        GapAction::DirectJoin => push_run(points, durations_s, geometry, speed_kmh),
        GapAction::OracleSplice => {
            let resp = oracle.route(last, next_first, profile).await;
            stats.record_response(&resp);
            splice_connector(points, durations_s, &resp, next_first);
            push_run(points, durations_s, geometry, speed_kmh);
        }
        GapAction::Unresolved => {
            debug!(gap_m, "oracle budget exhausted, leaving gap as a direct join");
            push_run(points, durations_s, geometry, speed_kmh);
        }
    }
}

/// Bounded final repair pass over any gap still exceeding `small_join_m`
/// (spec §4.E "Final continuity repair"): at most
/// [`AssembleConfig::MAX_REPAIR_PASSES`] attempts, each requesting the
/// oracle once per offending gap, advancing past any gap repair fails to
/// shrink (the progress check that keeps this from looping forever).
async fn repair_remaining_gaps(
    points: &mut Vec<Point>,
    durations_s: &mut Vec<f64>,
    oracle: &dyn RoutingOracle,
    profile: Profile,
    config: &AssembleConfig,
    stats: &mut Stats,
) {
    for _pass in 0..AssembleConfig::MAX_REPAIR_PASSES {
        let offending = gap_indices(points, config.small_join_m);
        if offending.is_empty() {
            return;
        }

        let mut made_progress = false;
        // Repair back-to-front so earlier indices stay valid as splices
        // shift everything after them.
        for &i in offending.iter().rev() {
            let (a, b) = (points[i], points[i + 1]);
            let gap_m = haversine(a, b);

            if !stats.budget_available() {
                stats.gap_summary.push(gap_m, GapAction::Unresolved);
                continue;
            }
            let resp = oracle.route(a, b, profile).await;
            stats.record_response(&resp);
            stats.gap_summary.push(gap_m, GapAction::OracleSplice);

            // Overwrite spliced endpoints with the exact target coordinates
            // rather than trusting the oracle to match them (spec §4.E
            // "critical correctness requirement").
            let mut geometry = resp.geometry.clone();
            if let Some(first) = geometry.first_mut() {
                *first = a;
            }
            if let Some(last) = geometry.last_mut() {
                *last = b;
            }
            let local_gap_max = geometry
                .windows(2)
                .map(|pair| haversine(pair[0], pair[1]))
                .fold(0.0, f64::max);

            let inner: Vec<Point> = if geometry.len() >= 2 {
                geometry[1..geometry.len() - 1].to_vec()
            } else {
                Vec::new()
            };
            let speed_kmh = response_speed_kmh(&resp);
            let speed_mps = speed_kmh * 1000.0 / 3600.0;

            // Splice durations for the new chain a -> inner... -> b,
            // replacing the single stale a->b duration at index i.
            let mut new_durations = Vec::with_capacity(inner.len() + 1);
            let mut prev = a;
            for &p in &inner {
                new_durations.push(haversine(prev, p) / speed_mps);
                prev = p;
            }
            new_durations.push(haversine(prev, b) / speed_mps);

            points.splice(i + 1..i + 1, inner);
            durations_s.splice(i..i + 1, new_durations);

            if local_gap_max <= config.small_join_m {
                made_progress = true;
            }
        }

        if !made_progress {
            break;
        }
    }
}
