//! Stitches per-SCC Eulerian circuits into a single continuous route,
//! bridging gaps through the routing oracle, then chunks the result by
//! estimated drive time.

mod chunk;
mod config;
mod error;
mod gap;
mod stitch;

pub use chunk::{chunk_route, Chunk};
pub use config::AssembleConfig;
pub use error::AssemblyError;
pub use gap::{GapAction, GapHistogram, GapRecord, GapSummary};
pub use stitch::{assemble, AssembledRoute};

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicU32, Ordering};

    use routesweep_euler::{eulerize, order_sccs, SccResult};
    use routesweep_geom::{haversine, Point};
    use routesweep_graph::{Edge, EdgeKind, Graph};
    use routesweep_oracle::{OracleResponse, Profile, RoutingOracle};

    use super::*;

    /// A test oracle that always returns a synthetic straight line, counting
    /// how many times it was called.
    struct CountingOracle {
        calls: AtomicU32,
    }

    impl CountingOracle {
        fn new() -> Self {
            Self { calls: AtomicU32::new(0) }
        }
    }

    impl RoutingOracle for CountingOracle {
        fn route<'a>(
            &'a self,
            start: Point,
            end: Point,
            _profile: Profile,
        ) -> Pin<Box<dyn Future<Output = OracleResponse> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let distance_m = haversine(start, end);
            Box::pin(async move {
                OracleResponse {
                    geometry: vec![start, end],
                    distance_m,
                    duration_s: distance_m / (30.0 * 1000.0 / 3600.0),
                    synthetic: true,
                }
            })
        }
    }

    fn square_graph() -> Graph {
        // Four two-way streets forming a 100m x 100m square (scenario S1).
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(0.001, 0.0),
            Point::new(0.001, 0.001),
            Point::new(0.0, 0.001),
        ];
        let mut graph = Graph::new();
        for i in 0..4 {
            let a = routesweep_geom::quantize(corners[i]);
            let b = routesweep_geom::quantize(corners[(i + 1) % 4]);
            let length_m = haversine(corners[i], corners[(i + 1) % 4]);
            graph.add_edge(
                a,
                b,
                Edge {
                    length_m,
                    geometry: vec![corners[i], corners[(i + 1) % 4]],
                    kind: EdgeKind::Street,
                    tags: None,
                },
            );
            graph.add_edge(
                b,
                a,
                Edge {
                    length_m,
                    geometry: vec![corners[(i + 1) % 4], corners[i]],
                    kind: EdgeKind::Street,
                    tags: None,
                },
            );
        }
        graph
    }

    #[tokio::test]
    async fn already_eulerian_square_needs_no_oracle_calls() {
        let graph = square_graph();
        let sccs = eulerize(&graph).expect("balanced graph eulerizes");
        let order = order_sccs(&sccs, None);
        let oracle = CountingOracle::new();
        let config = AssembleConfig::default();

        let route = assemble(&sccs, &order, &oracle, Profile::Car, &config)
            .await
            .expect("assembly succeeds");

        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
        assert!(route.continuity_valid);
        assert_eq!(route.violations, 0);
        assert!((route.length_m - 400.0).abs() < 5.0);
    }

    #[tokio::test]
    async fn chunking_respects_target_duration_and_overlaps() {
        let graph = square_graph();
        let sccs = eulerize(&graph).expect("balanced graph eulerizes");
        let order = order_sccs(&sccs, None);
        let oracle = CountingOracle::new();
        let config = AssembleConfig::default();

        let route = assemble(&sccs, &order, &oracle, Profile::Car, &config)
            .await
            .expect("assembly succeeds");

        // Each leg takes a few seconds at 30 km/h; a tiny target forces a split.
        let chunks = chunk_route(&route, 5);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end_idx, pair[1].start_idx);
        }
        assert_eq!(chunks[0].start_idx, 0);
        assert_eq!(chunks.last().unwrap().end_idx, route.points.len() - 1);
    }

    #[tokio::test]
    async fn empty_input_reports_no_circuits() {
        let sccs: Vec<SccResult> = Vec::new();
        let order: Vec<usize> = Vec::new();
        let oracle = CountingOracle::new();
        let config = AssembleConfig::default();

        // An empty SCC list is not itself an error (an empty graph upstream
        // already fails InvalidInput); only a non-empty list whose circuits
        // are all empty signals a construction bug.
        let route = assemble(&sccs, &order, &oracle, Profile::Car, &config).await;
        assert!(route.is_ok());
        assert!(route.unwrap().points.is_empty());
    }
}
