use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use routesweep_geom::NodeId;
use routesweep_graph::{EdgeKey, Graph};

/// One node's entry in the binary heap frontier, ordered for a min-heap
/// (`BinaryHeap` is a max-heap, so comparison is reversed on cost).
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}
impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost).then_with(|| self.node.cmp(&other.node))
    }
}

/// Single-source shortest paths by `length_m`, with predecessor edges kept
/// so the actual path (not just its length) can be recovered (spec §4.D
/// step 2: "store both distances and the paths").
pub(crate) struct ShortestPaths {
    pub dist: HashMap<NodeId, f64>,
    prev: HashMap<NodeId, (NodeId, EdgeKey)>,
}

impl ShortestPaths {
    /// Path from `source` to `target` as an ordered list of edge keys, or
    /// `None` if `target` is unreachable.
    pub(crate) fn path_to(&self, source: NodeId, target: NodeId) -> Option<Vec<EdgeKey>> {
        if source == target {
            return Some(Vec::new());
        }
        if !self.dist.contains_key(&target) {
            return None;
        }
        let mut edges = Vec::new();
        let mut node = target;
        while node != source {
            let (prev_node, edge) = self.prev[&node];
            edges.push(edge);
            node = prev_node;
        }
        edges.reverse();
        Some(edges)
    }
}

/// Dijkstra from `source` over edge weight `length_m`.
pub(crate) fn dijkstra(graph: &Graph, source: NodeId) -> ShortestPaths {
    let mut dist = HashMap::new();
    let mut prev = HashMap::new();
    dist.insert(source, 0.0);

    let mut heap = BinaryHeap::new();
    heap.push(Frontier { cost: 0.0, node: source });

    while let Some(Frontier { cost, node }) = heap.pop() {
        if cost > *dist.get(&node).unwrap_or(&f64::INFINITY) {
            continue;
        }
        for (edge_key, target) in graph.edges_out(node) {
            let weight = graph.edge_weight(edge_key).length_m;
            let next_cost = cost + weight;
            if next_cost < *dist.get(&target).unwrap_or(&f64::INFINITY) {
                dist.insert(target, next_cost);
                prev.insert(target, (node, edge_key));
                heap.push(Frontier { cost: next_cost, node: target });
            }
        }
    }

    ShortestPaths { dist, prev }
}
