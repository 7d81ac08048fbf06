//! Street graph construction: turns raw polyline features into a directed
//! multigraph over quantized nodes (spec §4.C).

mod builder;
mod error;
mod graph;
mod spatial_index;
mod types;

pub use builder::{build_graph, BuildReport};
pub use error::GraphBuildError;
pub use graph::{EdgeKey, Graph};
pub use types::{Edge, EdgeKind, RoadClass, StreetFeature, Tags};

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use routesweep_geom::Point;

    use super::*;

    fn feature(points: &[(f64, f64)], oneway: bool) -> StreetFeature {
        StreetFeature {
            points: points.iter().map(|&(lon, lat)| Point::new(lon, lat)).collect(),
            oneway,
            tags: Tags {
                highway: RoadClass::Residential,
                name: None,
                maxspeed_kmh: None,
                access: None,
            },
        }
    }

    fn square_polygon() -> Vec<Point> {
        vec![
            Point::new(-0.001, -0.001),
            Point::new(0.001, -0.001),
            Point::new(0.001, 0.001),
            Point::new(-0.001, 0.001),
        ]
    }

    #[test]
    fn two_way_street_produces_edges_in_both_directions() {
        let features = vec![feature(&[(0.0, 0.0), (0.0, 0.001)], false)];
        let (graph, report) = build_graph(&features, &square_polygon(), 1.0).expect("builds");
        assert_eq!(report.features_skipped_invalid, 0);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn oneway_street_produces_a_single_edge() {
        let features = vec![feature(&[(0.0, 0.0), (0.0, 0.001)], true)];
        let (graph, _report) = build_graph(&features, &square_polygon(), 1.0).expect("builds");
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn crossing_streets_split_into_a_shared_node() {
        let features = vec![
            feature(&[(-0.0005, 0.0), (0.0005, 0.0)], false),
            feature(&[(0.0, -0.0005), (0.0, 0.0005)], false),
        ];
        let (graph, report) = build_graph(&features, &square_polygon(), 1.0).expect("builds");
        assert_eq!(report.intersections_detected, 1);
        // Each street is split into two segments by the crossing, each
        // two-way, for eight directed edges total around a shared center node.
        assert_eq!(graph.edge_count(), 8);
    }

    #[test]
    fn degenerate_feature_is_skipped_not_fatal() {
        let features = vec![
            feature(&[(0.0, 0.0), (0.0, 0.0)], false),
            feature(&[(0.0, 0.0), (0.0, 0.001)], false),
        ];
        let (_graph, report) = build_graph(&features, &square_polygon(), 1.0).expect("builds");
        assert_eq!(report.features_skipped_invalid, 1);
    }

    #[test]
    fn no_usable_features_is_an_error() {
        let features = vec![feature(&[(0.0, 0.0), (0.0, 0.0)], false)];
        let err = build_graph(&features, &square_polygon(), 1.0).unwrap_err();
        assert!(matches!(err, GraphBuildError::NoUsableFeatures));
    }

    #[test]
    fn nearby_endpoints_snap_together() {
        // Two segments whose endpoints are ~0.3m apart at this latitude,
        // well within the default 1m snap tolerance.
        let features = vec![
            feature(&[(0.0, 0.0), (0.001, 0.0)], false),
            feature(&[(0.001, 0.000_003), (0.002, 0.000_003)], false),
        ];
        let (graph, report) = build_graph(&features, &square_polygon(), 1.0).expect("builds");
        assert!(report.nodes_snapped > 0);
        assert_eq!(graph.node_count(), 3);
    }

    proptest! {
        /// Edge alignment (spec §8): every directed edge produced from a
        /// two-way feature must have a reverse counterpart between the same
        /// pair of nodes, so the multigraph never silently drops a direction.
        #[test]
        fn two_way_features_always_pair_up(
            segments in prop::collection::vec((0i32..6, 0i32..6, 0i32..6, 0i32..6), 1..6)
        ) {
            let features: Vec<StreetFeature> = segments
                .into_iter()
                .filter(|&(x0, y0, x1, y1)| (x0, y0) != (x1, y1))
                .map(|(x0, y0, x1, y1)| {
                    feature(
                        &[(f64::from(x0) * 1e-3, f64::from(y0) * 1e-3), (f64::from(x1) * 1e-3, f64::from(y1) * 1e-3)],
                        false,
                    )
                })
                .collect();
            if features.is_empty() {
                return Ok(());
            }
            let Ok((graph, _report)) = build_graph(&features, &square_polygon(), 0.0) else {
                return Ok(());
            };
            for id in graph.node_ids() {
                for (key, target) in graph.edges_out(id) {
                    let (u, v) = graph.edge_endpoints(key);
                    prop_assert_eq!((u, v), (id, target));
                    let has_reverse = graph
                        .edges_out(target)
                        .any(|(_, back_target)| back_target == id);
                    prop_assert!(has_reverse, "edge {:?} -> {:?} has no reverse counterpart", id, target);
                }
            }
        }
    }
}
