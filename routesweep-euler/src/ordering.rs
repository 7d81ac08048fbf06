use routesweep_geom::{geodesic, NodeId, Point};

use crate::SccResult;

/// Nearest-neighbor tour over SCC centroids, starting from the SCC
/// containing `start`, or the largest SCC if no start point was given or it
/// falls outside every SCC (spec §4.D "Cross-SCC handling"). An
/// approximation; optimality is not required.
#[must_use]
pub fn order_sccs(results: &[SccResult], start: Option<NodeId>) -> Vec<usize> {
    if results.is_empty() {
        return Vec::new();
    }

    let centroids: Vec<Point> = results
        .iter()
        .map(|r| {
            let points: Vec<Point> = r.members.iter().map(|n| n.to_point()).collect();
            Point::centroid_of(&points).expect("an SCC has at least one member")
        })
        .collect();

    let start_idx = start
        .and_then(|sp| results.iter().position(|r| r.members.contains(&sp)))
        .unwrap_or_else(|| {
            (0..results.len())
                .max_by_key(|&i| results[i].members.len())
                .expect("results is non-empty")
        });

    let mut visited = vec![false; results.len()];
    let mut order = vec![start_idx];
    visited[start_idx] = true;
    let mut current = start_idx;

    for _ in 1..results.len() {
        let next = (0..results.len())
            .filter(|&j| !visited[j])
            .min_by(|&a, &b| {
                let da = geodesic(centroids[current], centroids[a]);
                let db = geodesic(centroids[current], centroids[b]);
                da.total_cmp(&db)
            })
            .expect("at least one unvisited SCC remains");
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order
}

#[cfg(test)]
mod tests {
    use routesweep_geom::quantize;
    use routesweep_graph::Graph;

    use super::*;
    use crate::flow::DeadheadStats;

    fn scc_at(lon: f64, lat: f64) -> SccResult {
        SccResult {
            members: vec![quantize(Point::new(lon, lat))],
            balanced_graph: Graph::new(),
            circuit: Vec::new(),
            deadhead: DeadheadStats::default(),
        }
    }

    #[test]
    fn visits_nearest_unvisited_scc_next() {
        let results = vec![scc_at(0.0, 0.0), scc_at(10.0, 10.0), scc_at(0.001, 0.0)];
        let order = order_sccs(&results, Some(quantize(Point::new(0.0, 0.0))));
        assert_eq!(order, vec![0, 2, 1]);
    }

    #[test]
    fn falls_back_to_largest_scc_without_a_start_point() {
        let mut big = scc_at(5.0, 5.0);
        big.members.push(quantize(Point::new(5.001, 5.0)));
        let results = vec![scc_at(0.0, 0.0), big];
        let order = order_sccs(&results, None);
        assert_eq!(order[0], 1);
    }
}
