use std::collections::HashMap;

use petgraph::unionfind::UnionFind;
use tracing::{debug, info};

use routesweep_geom::{geodesic_length, quantize, segment_intersect, LocalProjection, Point};

use crate::error::GraphBuildError;
use crate::graph::Graph;
use crate::spatial_index::{candidate_pairs, IndexedSegment};
use crate::types::{Edge, EdgeKind, StreetFeature};

/// Diagnostics produced alongside the graph (folded into the pipeline's
/// overall diagnostics bag by the caller, spec §4.F).
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub features_in: usize,
    pub features_skipped_invalid: usize,
    pub intersections_detected: usize,
    pub nodes_snapped: usize,
}

/// Builds a directed street multigraph from raw features (spec §4.C).
///
/// Pipeline: project to a local plane, detect and split at true geometric
/// crossings, snap near-coincident vertices, then emit aligned, directed
/// edges. Deterministic for a fixed feature order.
pub fn build_graph(
    features: &[StreetFeature],
    polygon_points: &[Point],
    snap_tolerance_m: f64,
) -> Result<(Graph, BuildReport), GraphBuildError> {
    let centroid = Point::centroid_of(polygon_points).ok_or(GraphBuildError::ProjectionUnavailable)?;
    let proj = LocalProjection::centered_on(centroid);

    let mut report = BuildReport {
        features_in: features.len(),
        ..Default::default()
    };

    // Validate: drop features with fewer than two distinct points after
    // collapsing consecutive duplicates (spec §4.C failure mode).
    let mut clean: Vec<(Vec<Point>, bool, Option<crate::types::Tags>)> = Vec::new();
    for f in features {
        let dedup = dedup_consecutive(&f.points, &proj);
        if dedup.len() < 2 {
            report.features_skipped_invalid += 1;
            continue;
        }
        clean.push((dedup, f.oneway, Some(f.tags.clone())));
    }

    if clean.is_empty() {
        return Err(GraphBuildError::NoUsableFeatures);
    }

    let refined = split_at_intersections(&clean, &proj, &mut report);
    let (node_of, centroids) = snap_vertices(&refined, &proj, snap_tolerance_m, &mut report);

    let mut graph = Graph::new();
    for (feature_idx, (points, oneway, tags)) in refined.iter().enumerate() {
        for seg_idx in 0..points.len() - 1 {
            let u_id = node_of[&(feature_idx, seg_idx)];
            let v_id = node_of[&(feature_idx, seg_idx + 1)];
            if u_id == v_id {
                // Collapsed by snapping; no edge carries information here.
                continue;
            }

            let u_point = centroids[&u_id];
            let v_point = centroids[&v_id];

            let mut forward_geometry = points[seg_idx..=seg_idx + 1].to_vec();
            *forward_geometry.first_mut().expect("segment has two points") = u_point;
            *forward_geometry.last_mut().expect("segment has two points") = v_point;
            let length_m = geodesic_length(&forward_geometry);
            if length_m <= 0.0 {
                continue;
            }

            graph.add_edge(
                u_id,
                v_id,
                Edge {
                    length_m,
                    geometry: forward_geometry.clone(),
                    kind: EdgeKind::Street,
                    tags: tags.clone(),
                },
            );

            if !oneway {
                let mut reverse_geometry = forward_geometry;
                reverse_geometry.reverse();
                graph.add_edge(
                    v_id,
                    u_id,
                    Edge {
                        length_m,
                        geometry: reverse_geometry,
                        kind: EdgeKind::Street,
                        tags: tags.clone(),
                    },
                );
            }
        }
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        intersections = report.intersections_detected,
        "graph built"
    );

    Ok((graph, report))
}

/// Collapses consecutive points that quantize to the same node, leaving a
/// polyline with only genuinely distinct vertices.
fn dedup_consecutive(points: &[Point], _proj: &LocalProjection) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if let Some(&last) = out.last() {
            if quantize(last) == quantize(p) {
                continue;
            }
        }
        out.push(p);
    }
    out
}

type CleanFeature = (Vec<Point>, bool, Option<crate::types::Tags>);

/// Detects true geometric crossings between features and splits both
/// features at the crossing point so it becomes an explicit shared vertex
/// (spec §4.C step 2).
fn split_at_intersections(
    clean: &[CleanFeature],
    proj: &LocalProjection,
    report: &mut BuildReport,
) -> Vec<CleanFeature> {
    let mut segments = Vec::new();
    for (feature, (points, _, _)) in clean.iter().enumerate() {
        for seg in 0..points.len() - 1 {
            let (ax, ay) = proj.project(points[seg]);
            let (bx, by) = proj.project(points[seg + 1]);
            segments.push(IndexedSegment {
                idx: segments.len(),
                feature,
                seg,
                a_local: [ax, ay],
                b_local: [bx, by],
            });
        }
    }

    // splits[(feature, seg)] accumulates (t, point) pairs, t being the
    // fractional distance along the segment, so they can be inserted in
    // order later.
    let mut splits: HashMap<(usize, usize), Vec<(f64, Point)>> = HashMap::new();

    for (i, j) in candidate_pairs(&segments) {
        let a = segments[i];
        let b = segments[j];
        if a.feature == b.feature && a.seg.abs_diff(b.seg) <= 1 {
            // Adjacent (or identical) segments within the same feature
            // already share an endpoint; not a crossing to split at.
            continue;
        }

        let (f1, s1) = feature_segment_points(clean, a.feature, a.seg);
        let (f2, s2) = feature_segment_points(clean, b.feature, b.seg);

        if let Some(point) = segment_intersect(proj, (f1, s1), (f2, s2)) {
            report.intersections_detected += 1;
            let (lx, ly) = proj.project(point);
            let local = [lx, ly];
            splits.entry((a.feature, a.seg)).or_default().push((
                param_t(a.a_local, a.b_local, local),
                point,
            ));
            splits.entry((b.feature, b.seg)).or_default().push((
                param_t(b.a_local, b.b_local, local),
                point,
            ));
        }
    }

    clean
        .iter()
        .enumerate()
        .map(|(feature, (points, oneway, tags))| {
            let mut rebuilt = Vec::with_capacity(points.len());
            for seg in 0..points.len() - 1 {
                rebuilt.push(points[seg]);
                if let Some(extra) = splits.get(&(feature, seg)) {
                    let mut extra = extra.clone();
                    extra.sort_by(|x, y| x.0.total_cmp(&y.0));
                    for (_, p) in extra {
                        rebuilt.push(p);
                    }
                }
            }
            rebuilt.push(*points.last().expect("feature has at least two points"));
            (rebuilt, *oneway, tags.clone())
        })
        .collect()
}

fn feature_segment_points(clean: &[CleanFeature], feature: usize, seg: usize) -> (Point, Point) {
    let points = &clean[feature].0;
    (points[seg], points[seg + 1])
}

/// Fractional position of `point` along the segment `a -> b`, clamped to
/// `[0, 1]`; used only to order multiple crossings along the same segment.
fn param_t(a: [f64; 2], b: [f64; 2], point: [f64; 2]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let len_sq = dx * dx + dy * dy;
    if len_sq <= 0.0 {
        return 0.0;
    }
    let t = ((point[0] - a[0]) * dx + (point[1] - a[1]) * dy) / len_sq;
    t.clamp(0.0, 1.0)
}

/// Unifies vertices within `snap_tolerance_m` of each other into the same
/// quantized node (spec §4.C step 3), closing hairline T-junction gaps.
///
/// Returns a map from `(feature_idx, point_idx)` to the node id that vertex
/// was snapped to, plus the WGS84 centroid used to represent that node (for
/// aligning edge endpoints exactly).
fn snap_vertices(
    refined: &[CleanFeature],
    proj: &LocalProjection,
    snap_tolerance_m: f64,
    report: &mut BuildReport,
) -> (
    HashMap<(usize, usize), routesweep_geom::NodeId>,
    HashMap<routesweep_geom::NodeId, Point>,
) {
    let mut flat: Vec<(usize, usize, Point, [f64; 2])> = Vec::new();
    for (feature, (points, _, _)) in refined.iter().enumerate() {
        for (idx, &p) in points.iter().enumerate() {
            let (x, y) = proj.project(p);
            flat.push((feature, idx, p, [x, y]));
        }
    }

    let mut uf = UnionFind::new(flat.len());
    let tol_sq = snap_tolerance_m * snap_tolerance_m;
    // A naive O(n^2) pass is acceptable here: vertex counts are a small
    // multiple of segment counts, which are already bounded by the same
    // threshold reasoning as intersection detection, and correctness (never
    // missing a union) matters more than micro-optimizing this pass.
    for i in 0..flat.len() {
        for j in (i + 1)..flat.len() {
            let (dx, dy) = (flat[i].3[0] - flat[j].3[0], flat[i].3[1] - flat[j].3[1]);
            if dx * dx + dy * dy <= tol_sq {
                uf.union(i, j);
            }
        }
    }

    let mut cluster_points: HashMap<usize, Vec<Point>> = HashMap::new();
    for (i, entry) in flat.iter().enumerate() {
        cluster_points.entry(uf.find(i)).or_default().push(entry.2);
    }

    let mut cluster_node: HashMap<usize, routesweep_geom::NodeId> = HashMap::new();
    let mut centroids: HashMap<routesweep_geom::NodeId, Point> = HashMap::new();
    let mut snapped = 0usize;
    for (root, members) in &cluster_points {
        if members.len() > 1 {
            snapped += members.len() - 1;
        }
        let centroid = Point::centroid_of(members).expect("cluster has at least one member");
        let node_id = quantize(centroid);
        cluster_node.insert(*root, node_id);
        centroids.entry(node_id).or_insert(centroid);
    }
    report.nodes_snapped = snapped;
    if snapped > 0 {
        debug!(snapped, "snapped near-coincident vertices");
    } else {
        debug!("no vertices required snapping");
    }

    let mut node_of = HashMap::new();
    for (i, entry) in flat.iter().enumerate() {
        let node_id = cluster_node[&uf.find(i)];
        node_of.insert((entry.0, entry.1), node_id);
    }

    (node_of, centroids)
}
