use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use routesweep_geom::NodeId;

use crate::types::Edge;

/// Stable identifier for an edge, including duplicates added during
/// eulerization. Backed by `petgraph`'s own edge index: since the graph
/// never removes edges (only adds, per spec §9 "parallel edges and edge
/// keys"), the index stays valid and stable for the graph's whole lifetime.
pub type EdgeKey = petgraph::graph::EdgeIndex<u32>;

/// A directed multigraph over quantized nodes (spec §3).
///
/// Node identity is a [`NodeId`] (quantized coordinates); the graph may be
/// disconnected and is free to carry parallel edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: DiGraph<NodeId, Edge>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the existing node index for `id`, creating one if absent.
    ///
    /// Node insertion order (and therefore `NodeIndex` assignment) is purely
    /// a function of the order callers call this in, which is what makes
    /// graph construction deterministic given a fixed feature order (spec
    /// §4.C).
    pub fn ensure_node(&mut self, id: NodeId) -> NodeIndex {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.inner.add_node(id);
        self.index.insert(id, idx);
        idx
    }

    #[must_use]
    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    #[must_use]
    pub fn node_id(&self, idx: NodeIndex) -> NodeId {
        self.inner[idx]
    }

    pub fn add_edge(&mut self, u: NodeId, v: NodeId, edge: Edge) -> EdgeKey {
        let ui = self.ensure_node(u);
        let vi = self.ensure_node(v);
        self.inner.add_edge(ui, vi, edge)
    }

    #[must_use]
    pub fn edge_endpoints(&self, key: EdgeKey) -> (NodeId, NodeId) {
        let (a, b) = self
            .inner
            .edge_endpoints(key)
            .expect("EdgeKey values are only ever handed out for edges in this graph");
        (self.inner[a], self.inner[b])
    }

    #[must_use]
    pub fn edge_weight(&self, key: EdgeKey) -> &Edge {
        &self.inner[key]
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.node_indices().map(move |i| self.inner[i])
    }

    #[must_use]
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.node_index(id)
            .map_or(0, |idx| self.inner.edges_directed(idx, Direction::Outgoing).count())
    }

    #[must_use]
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.node_index(id)
            .map_or(0, |idx| self.inner.edges_directed(idx, Direction::Incoming).count())
    }

    /// Outgoing `(edge_key, target_node)` pairs for `id`, in insertion order.
    pub fn edges_out(&self, id: NodeId) -> impl Iterator<Item = (EdgeKey, NodeId)> + '_ {
        self.node_index(id).into_iter().flat_map(move |idx| {
            self.inner
                .edges_directed(idx, Direction::Outgoing)
                .map(move |e| (e.id(), self.inner[e.target()]))
        })
    }

    /// Strongly connected components, each as a list of member node ids,
    /// largest first (spec §4.D "per SCC"). Uses Tarjan's algorithm via
    /// `petgraph`, which runs in a single linear pass and produces
    /// components in reverse topological order; we only care about set
    /// membership, not that order, so we additionally sort by size for a
    /// stable, human-legible largest-first presentation.
    #[must_use]
    pub fn strongly_connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut sccs: Vec<Vec<NodeId>> = petgraph::algo::tarjan_scc(&self.inner)
            .into_iter()
            .map(|members| {
                let mut ids: Vec<NodeId> = members.into_iter().map(|idx| self.inner[idx]).collect();
                ids.sort_unstable();
                ids
            })
            .collect();
        sccs.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        sccs
    }

    /// Builds the induced subgraph over `members`, preserving all edges
    /// (including parallel ones) whose endpoints are both in `members`.
    ///
    /// Used by eulerization to operate on an owned clone per SCC (spec §5).
    #[must_use]
    pub fn induced_subgraph(&self, members: &[NodeId]) -> Graph {
        let member_set: std::collections::HashSet<NodeId> = members.iter().copied().collect();
        let mut sub = Graph::new();
        for &id in members {
            sub.ensure_node(id);
        }
        for edge in self.inner.edge_indices() {
            let (u, v) = self.edge_endpoints(edge);
            if member_set.contains(&u) && member_set.contains(&v) {
                sub.add_edge(u, v, self.edge_weight(edge).clone());
            }
        }
        sub
    }
}
