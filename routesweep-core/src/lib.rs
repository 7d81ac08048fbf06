//! Top-level pipeline: ingests street features and a service polygon,
//! produces a single gap-bounded, time-chunked sweeping route.
//!
//! Orchestrates graph construction (`routesweep-graph`), per-SCC
//! eulerization (`routesweep-euler`), and route assembly/chunking
//! (`routesweep-assemble`) behind one entry point, [`generate`].

mod cancel;
mod error;
mod request;
mod result;

pub use cancel::{CancellationSource, CancellationToken};
pub use error::PipelineError;
pub use request::{AreaPolygon, GenerateRequest};
pub use result::{ChunkView, Diagnostics, GapHistogramView, GenerateResult, StageTimings, Status};

use std::time::Instant;

use tracing::{info, info_span, Instrument};

use routesweep_assemble::{assemble, chunk_route, AssembleConfig};
use routesweep_euler::{eulerize, order_sccs};
use routesweep_geom::quantize;
use routesweep_graph::build_graph;
use routesweep_oracle::RoutingOracle;

/// Runs the full pipeline for a single request.
///
/// # Errors
/// Returns [`PipelineError::InvalidInput`] if `request` fails validation,
/// [`PipelineError::ProjectionUnavailable`] if no local CRS could be derived
/// for the service area, [`PipelineError::FlowInfeasible`] if eulerization or
/// assembly hit an internal invariant violation, or
/// [`PipelineError::Cancelled`] if `cancel` was signalled before the
/// pipeline finished.
pub async fn generate(
    request: &GenerateRequest,
    oracle: &dyn RoutingOracle,
    cancel: &CancellationToken,
) -> Result<GenerateResult, PipelineError> {
    let pipeline_start = Instant::now();
    request.validate()?;

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let mut timings = StageTimings::default();

    let _span = info_span!("graph_build").entered();
    let stage_start = Instant::now();
    let (graph, build_report) = build_graph(
        &request.street_features,
        &request.polygon.flattened_points(),
        request.snap_tolerance_m,
    )?;
    StageTimings::record(&mut timings.graph_build_ms, stage_start.elapsed());
    drop(_span);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        skipped = build_report.features_skipped_invalid,
        "graph built"
    );

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let nodes_before = graph.node_count();
    let edges_before = graph.edge_count();

    let _span = info_span!("eulerization").entered();
    let stage_start = Instant::now();
    let sccs = eulerize(&graph).map_err(|e| {
        PipelineError::flow_infeasible(
            e,
            Diagnostics {
                nodes_before,
                edges_before,
                nodes_after: nodes_before,
                features_skipped_invalid: build_report.features_skipped_invalid,
                timings: timings.clone(),
                ..Diagnostics::default()
            },
        )
    })?;
    StageTimings::record(&mut timings.eulerization_ms, stage_start.elapsed());
    drop(_span);

    let scc_sizes: Vec<usize> = sccs.iter().map(|s| s.members.len()).collect();
    let imbalanced_node_count = sccs.iter().map(|s| s.deadhead.imbalanced_nodes).sum();
    let duplicated_length_m: f64 = sccs.iter().map(|s| s.deadhead.duplicated_length_m).sum();
    let original_length_m: f64 = sccs.iter().map(|s| s.deadhead.original_length_m).sum();
    let deadhead_ratio = if original_length_m > 0.0 {
        duplicated_length_m / original_length_m
    } else {
        0.0
    };
    let nodes_after = nodes_before;
    let edges_after: usize = sccs.iter().map(|s| s.balanced_graph.edge_count()).sum();

    info!(scc_count = sccs.len(), deadhead_ratio, "eulerization complete");

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let order = order_sccs(&sccs, request.start_point.map(quantize));
    let config = AssembleConfig {
        max_gap_m: request.max_gap_m,
        snap_eps_m: AssembleConfig::DEFAULT_SNAP_EPS_M,
        small_join_m: request.small_join_m,
        chunk_duration_s: request.chunk_duration_s,
        oracle_concurrency: request.oracle_concurrency,
        oracle_call_budget: request.oracle_call_budget,
    };

    // `.instrument()` rather than an entered span guard: the span would
    // otherwise need to stay entered across the `.await` below, which
    // tracing guards are not meant to survive.
    let stage_start = Instant::now();
    let route = assemble(&sccs, &order, oracle, request.profile, &config)
        .instrument(info_span!("assembly"))
        .await
        .map_err(|e| {
            PipelineError::flow_infeasible(
                e,
                Diagnostics {
                    nodes_before,
                    edges_before,
                    nodes_after,
                    edges_after,
                    scc_count: sccs.len(),
                    scc_sizes: scc_sizes.clone(),
                    imbalanced_node_count,
                    duplicated_length_m,
                    deadhead_ratio,
                    features_skipped_invalid: build_report.features_skipped_invalid,
                    timings: timings.clone(),
                    ..Diagnostics::default()
                },
            )
        })?;
    StageTimings::record(&mut timings.assembly_ms, stage_start.elapsed());

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let chunks: Vec<ChunkView> = chunk_route(&route, request.chunk_duration_s)
        .into_iter()
        .map(ChunkView::from)
        .collect();
    let duration_s: f64 = chunks.iter().map(|c| c.duration_s).sum();

    StageTimings::record(&mut timings.total_ms, pipeline_start.elapsed());

    // `UnresolvedGap` and `OracleExhausted` are the two bounded-issue
    // failure modes that downgrade status without failing the run (spec
    // §7). A synthetic oracle response on its own is not a warning sign:
    // it's the client's normal offline/fallback behavior, not a budget hit.
    let budget_exhausted = request
        .oracle_call_budget
        .is_some_and(|cap| route.oracle_calls_real + route.oracle_calls_synthetic >= u64::from(cap));
    let status = if !route.continuity_valid || budget_exhausted {
        Status::CompletedWithWarnings
    } else {
        Status::Completed
    };

    let diagnostics = Diagnostics {
        nodes_before,
        edges_before,
        nodes_after,
        edges_after,
        scc_count: sccs.len(),
        scc_sizes,
        imbalanced_node_count,
        duplicated_length_m,
        deadhead_ratio,
        oracle_calls_real: route.oracle_calls_real,
        oracle_calls_synthetic: route.oracle_calls_synthetic,
        gap_max_m: route.gap_summary.max_m(),
        gap_mean_m: route.gap_summary.mean_m(),
        gap_p95_m: route.gap_summary.p95_m(),
        gap_histogram: (&route.gap_summary).into(),
        violations: route.violations,
        continuity_valid: route.continuity_valid,
        features_skipped_invalid: build_report.features_skipped_invalid,
        timings,
    };

    Ok(GenerateResult {
        geometry: route.points,
        chunks,
        length_m: route.length_m,
        duration_s,
        diagnostics,
        status,
    })
}
