use std::collections::{HashMap, VecDeque};

use routesweep_geom::NodeId;
use routesweep_graph::{EdgeKey, Graph};

use crate::error::EulerizationError;

/// One step of an Eulerian circuit: `edge` is kept alongside `(u, v)` so
/// downstream assembly can retrieve exact geometry even when parallel edges
/// exist between the same pair of nodes (spec §4.D).
#[derive(Debug, Clone, Copy)]
pub struct CircuitStep {
    pub from: NodeId,
    pub to: NodeId,
    pub edge: EdgeKey,
}

/// Builds a directed Eulerian circuit over a balanced, strongly connected
/// graph via Hierholzer's algorithm (spec §4.D "Circuit construction").
///
/// `start` anchors the circuit at a specific node (the requested start point,
/// or the smallest node id in the SCC, for determinism) but the circuit
/// covers every edge regardless of where it begins.
pub(crate) fn build_circuit(graph: &Graph, start: NodeId) -> Result<Vec<CircuitStep>, EulerizationError> {
    if graph.edge_count() == 0 {
        return Ok(Vec::new());
    }

    let mut remaining: HashMap<NodeId, VecDeque<(EdgeKey, NodeId)>> = graph
        .node_ids()
        .map(|n| (n, graph.edges_out(n).collect()))
        .collect();

    // Stack of (node, edge used to arrive at it); the start node has no
    // arrival edge.
    let mut stack: Vec<(NodeId, Option<EdgeKey>)> = vec![(start, None)];
    let mut circuit = Vec::with_capacity(graph.edge_count());

    while let Some(&(node, _)) = stack.last() {
        let next = remaining.get_mut(&node).and_then(VecDeque::pop_front);
        if let Some((edge, target)) = next {
            stack.push((target, Some(edge)));
        } else {
            let (finished, arrival_edge) = stack.pop().expect("loop condition guarantees a top element");
            if let Some(edge) = arrival_edge {
                let &(prev_node, _) = stack.last().expect("an arrival edge implies a predecessor frame");
                circuit.push(CircuitStep {
                    from: prev_node,
                    to: finished,
                    edge,
                });
            }
        }
    }

    circuit.reverse();

    if circuit.len() != graph.edge_count() {
        return Err(EulerizationError::NotStronglyConnected);
    }

    Ok(circuit)
}
