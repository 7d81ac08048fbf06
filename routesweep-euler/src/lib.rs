//! Per-SCC directed graph balancing (min-cost flow) and Eulerian circuit
//! construction (Hierholzer's algorithm) (spec §4.D).

mod circuit;
mod error;
mod flow;
mod ordering;
mod shortest_paths;

use routesweep_geom::NodeId;
use routesweep_graph::Graph;

pub use circuit::CircuitStep;
pub use error::EulerizationError;
pub use flow::DeadheadStats;
pub use ordering::order_sccs;

/// A single strongly connected component's finished eulerization: the
/// balanced subgraph, its Eulerian circuit, and the deadhead incurred to get
/// there.
pub struct SccResult {
    pub members: Vec<NodeId>,
    pub balanced_graph: Graph,
    pub circuit: Vec<CircuitStep>,
    pub deadhead: DeadheadStats,
}

/// Balances and circuits every strongly connected component of `graph`
/// (spec §4.D). SCCs with no edges (isolated nodes) are skipped: there is no
/// street to sweep there.
///
/// # Errors
/// Returns [`EulerizationError::FlowInfeasible`] if demand is unreachable
/// from supply within an SCC, or [`EulerizationError::NotStronglyConnected`]
/// if Hierholzer's algorithm fails to consume every edge — both indicate a
/// bug upstream in graph construction or SCC extraction, not a property of
/// the input data.
pub fn eulerize(graph: &Graph) -> Result<Vec<SccResult>, EulerizationError> {
    let mut results = Vec::new();
    for members in graph.strongly_connected_components() {
        let sub = graph.induced_subgraph(&members);
        if sub.edge_count() == 0 {
            continue;
        }

        let (balanced, deadhead) = flow::balance(&sub)?;
        let start = members[0];
        let circuit = circuit::build_circuit(&balanced, start)?;

        results.push(SccResult {
            members,
            balanced_graph: balanced,
            circuit,
            deadhead,
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use routesweep_geom::{quantize, Point};
    use routesweep_graph::{Edge, EdgeKind, RoadClass, Tags};

    use super::*;

    fn node(lon: f64, lat: f64) -> NodeId {
        quantize(Point::new(lon, lat))
    }

    fn street(length_m: f64) -> Edge {
        Edge {
            length_m,
            geometry: vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)],
            kind: EdgeKind::Street,
            tags: Some(Tags {
                highway: RoadClass::Residential,
                name: None,
                maxspeed_kmh: None,
                access: None,
            }),
        }
    }

    #[test]
    fn already_balanced_triangle_needs_no_duplication() {
        let a = node(0.0, 0.0);
        let b = node(0.001, 0.0);
        let c = node(0.0, 0.001);
        let mut graph = Graph::new();
        graph.add_edge(a, b, street(50.0));
        graph.add_edge(b, c, street(50.0));
        graph.add_edge(c, a, street(50.0));

        let results = eulerize(&graph).expect("balanced graph eulerizes cleanly");
        assert_eq!(results.len(), 1);
        let scc = &results[0];
        assert_eq!(scc.deadhead.duplicated_length_m, 0.0);
        assert_eq!(scc.circuit.len(), 3);
    }

    #[test]
    fn shortcut_edge_creates_imbalance_resolved_by_duplication() {
        // A one-way loop a->b->c->d->a (all balanced), plus a shortcut a->c
        // that unbalances both a (extra outgoing) and c (extra incoming).
        let a = node(0.0, 0.0);
        let b = node(0.001, 0.0);
        let c = node(0.001, 0.001);
        let d = node(0.0, 0.001);
        let mut graph = Graph::new();
        graph.add_edge(a, b, street(50.0));
        graph.add_edge(b, c, street(50.0));
        graph.add_edge(c, d, street(50.0));
        graph.add_edge(d, a, street(50.0));
        graph.add_edge(a, c, street(70.0));

        let results = eulerize(&graph).expect("imbalance is resolvable within the SCC");
        assert_eq!(results.len(), 1);
        let scc = &results[0];
        assert!(scc.deadhead.duplicated_length_m > 0.0);
        assert_eq!(scc.circuit.len(), scc.balanced_graph.edge_count());
    }

    /// Builds a strongly connected graph over `n` nodes: a base cycle
    /// (guaranteeing strong connectivity) plus `extra` random chords.
    fn strongly_connected_graph(n: usize, extra: &[(usize, usize)]) -> Graph {
        let mut graph = Graph::new();
        let nodes: Vec<NodeId> = (0..n)
            .map(|i| node(f64::from(i32::try_from(i).unwrap()) * 0.001, 0.0))
            .collect();
        for i in 0..n {
            graph.add_edge(nodes[i], nodes[(i + 1) % n], street(10.0));
        }
        for &(i, j) in extra {
            if i != j {
                graph.add_edge(nodes[i % n], nodes[j % n], street(10.0));
            }
        }
        graph
    }

    proptest! {
        /// Balance + circuit completeness (spec §8): after eulerization every
        /// node in a balanced SCC has matching in/out degree, and the circuit
        /// visits every edge of the balanced graph exactly once.
        #[test]
        fn eulerization_balances_and_fully_consumes_every_scc(
            n in 3usize..7,
            extra in prop::collection::vec((0usize..6, 0usize..6), 0..5),
        ) {
            let graph = strongly_connected_graph(n, &extra);
            let results = eulerize(&graph).expect("a strongly connected graph always eulerizes");
            prop_assert_eq!(results.len(), 1);
            let scc = &results[0];

            for id in scc.balanced_graph.node_ids() {
                prop_assert_eq!(
                    scc.balanced_graph.in_degree(id),
                    scc.balanced_graph.out_degree(id),
                    "node {:?} is unbalanced after eulerization",
                    id
                );
            }
            prop_assert_eq!(scc.circuit.len(), scc.balanced_graph.edge_count());

            let mut seen = std::collections::HashSet::new();
            for step in &scc.circuit {
                prop_assert!(seen.insert(step.edge), "circuit revisits edge {:?}", step.edge);
            }
        }
    }
}
