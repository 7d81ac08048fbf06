use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use routesweep_geom::NodeId;
use routesweep_graph::{Edge, EdgeKind, Graph};

use crate::error::EulerizationError;
use crate::shortest_paths::dijkstra;

/// Scales meters to integer millimeters for min-cost flow arc costs (spec
/// §4.D step 3: "cost = shortest-path distance, scaled to integer").
const MM_PER_METER: f64 = 1000.0;

/// Length accounting for a balanced SCC (spec §4.D: "deadhead ratio").
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadheadStats {
    pub original_length_m: f64,
    pub duplicated_length_m: f64,
    /// Nodes with out-degree != in-degree before balancing (spec §4.F
    /// "imbalanced node count").
    pub imbalanced_nodes: usize,
}

impl DeadheadStats {
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.original_length_m <= 0.0 {
            0.0
        } else {
            self.duplicated_length_m / self.original_length_m
        }
    }
}

/// Balances a single SCC by duplicating edges along shortest paths from
/// supply nodes to demand nodes, via successive shortest augmenting paths
/// over the small supply/demand transportation network (spec §4.D).
pub(crate) fn balance(scc: &Graph) -> Result<(Graph, DeadheadStats), EulerizationError> {
    let mut balanced = scc.clone();

    let original_length_m: f64 = scc
        .node_ids()
        .flat_map(|n| scc.edges_out(n))
        .map(|(edge, _)| scc.edge_weight(edge).length_m)
        .sum();

    let imbalance = |node: NodeId| -> i64 {
        i64::try_from(scc.out_degree(node)).unwrap() - i64::try_from(scc.in_degree(node)).unwrap()
    };

    let mut supplies: Vec<NodeId> = Vec::new();
    let mut demands: Vec<NodeId> = Vec::new();
    for node in scc.node_ids() {
        match imbalance(node).cmp(&0) {
            std::cmp::Ordering::Less => supplies.push(node),
            std::cmp::Ordering::Greater => demands.push(node),
            std::cmp::Ordering::Equal => {}
        }
    }
    // Fixed sorted order so floating-point summation (and therefore
    // tie-breaking among equal-cost paths) is deterministic (spec §4.D step 2).
    supplies.sort_unstable();
    demands.sort_unstable();
    let imbalanced_nodes = supplies.len() + demands.len();

    if supplies.is_empty() {
        return Ok((
            balanced,
            DeadheadStats {
                original_length_m,
                duplicated_length_m: 0.0,
                imbalanced_nodes,
            },
        ));
    }

    // One Dijkstra per supply, in sorted order, covers every demand at once.
    let mut paths_from = HashMap::new();
    for &s in &supplies {
        paths_from.insert(s, dijkstra(scc, s));
    }

    let mut net = TransportNetwork::new(supplies.len(), demands.len());
    for (si, &s) in supplies.iter().enumerate() {
        net.set_supply(si, -imbalance(s));
    }
    for (di, &d) in demands.iter().enumerate() {
        net.set_demand(di, imbalance(d));
    }
    for (si, &s) in supplies.iter().enumerate() {
        let sp: &crate::shortest_paths::ShortestPaths = &paths_from[&s];
        for (di, &d) in demands.iter().enumerate() {
            if let Some(&dist_m) = sp.dist.get(&d) {
                #[allow(clippy::cast_possible_truncation)]
                let cost_mm = (dist_m * MM_PER_METER).round() as i64;
                net.add_arc(si, di, cost_mm);
            }
        }
    }

    let total_demand: i64 = demands.iter().map(|&d| imbalance(d)).sum();
    let (satisfied, assignments) = net.solve();
    if satisfied < total_demand {
        return Err(EulerizationError::FlowInfeasible);
    }

    let mut duplicated_length_m = 0.0;
    for (si, di, units) in assignments {
        if units <= 0 {
            continue;
        }
        let s = supplies[si];
        let d = demands[di];
        let path = paths_from[&s]
            .path_to(s, d)
            .ok_or(EulerizationError::FlowInfeasible)?;
        for _ in 0..units {
            for &edge_key in &path {
                let (u, v) = scc.edge_endpoints(edge_key);
                let original = scc.edge_weight(edge_key);
                duplicated_length_m += original.length_m;
                balanced.add_edge(
                    u,
                    v,
                    Edge {
                        length_m: original.length_m,
                        geometry: original.geometry.clone(),
                        kind: EdgeKind::Duplicate,
                        tags: original.tags.clone(),
                    },
                );
            }
        }
    }

    Ok((
        balanced,
        DeadheadStats {
            original_length_m,
            duplicated_length_m,
            imbalanced_nodes,
        },
    ))
}

/// Small bipartite transportation network: source -> supply -> demand ->
/// sink, solved by successive shortest augmenting paths with Dijkstra over
/// Johnson-reweighted residual costs (spec §4.D step 4). Capacities and flow
/// live on this auxiliary network, not on the physical street edges (which
/// can be duplicated without limit).
struct TransportNetwork {
    n_supply: usize,
    n_demand: usize,
    edges: Vec<FlowEdge>,
    adj: Vec<Vec<usize>>,
}

#[derive(Clone, Copy)]
struct FlowEdge {
    from: usize,
    to: usize,
    cap: i64,
    cost: i64,
}

impl TransportNetwork {
    fn new(n_supply: usize, n_demand: usize) -> Self {
        let n_nodes = n_supply + n_demand + 2;
        Self {
            n_supply,
            n_demand,
            edges: Vec::new(),
            adj: vec![Vec::new(); n_nodes],
        }
    }

    fn source(&self) -> usize {
        0
    }
    fn sink(&self) -> usize {
        self.n_supply + self.n_demand + 1
    }
    fn supply_node(&self, i: usize) -> usize {
        1 + i
    }
    fn demand_node(&self, i: usize) -> usize {
        1 + self.n_supply + i
    }

    /// Adds a forward/reverse residual pair; returns the forward edge index.
    fn add_raw_edge(&mut self, from: usize, to: usize, cap: i64, cost: i64) -> usize {
        let idx = self.edges.len();
        self.edges.push(FlowEdge { from, to, cap, cost });
        self.edges.push(FlowEdge {
            from: to,
            to: from,
            cap: 0,
            cost: -cost,
        });
        self.adj[from].push(idx);
        self.adj[to].push(idx + 1);
        idx
    }

    fn set_supply(&mut self, i: usize, capacity: i64) {
        self.add_raw_edge(self.source(), self.supply_node(i), capacity, 0);
    }

    fn set_demand(&mut self, i: usize, capacity: i64) {
        self.add_raw_edge(self.demand_node(i), self.sink(), capacity, 0);
    }

    fn add_arc(&mut self, supply_i: usize, demand_i: usize, cost_mm: i64) {
        const LARGE_CAP: i64 = 1_000_000;
        self.add_raw_edge(self.supply_node(supply_i), self.demand_node(demand_i), LARGE_CAP, cost_mm);
    }

    /// Runs successive shortest augmenting paths to exhaustion. Returns
    /// total flow pushed and, for every (supply, demand) pair with nonzero
    /// flow, how many units were assigned to it.
    fn solve(&mut self) -> (i64, Vec<(usize, usize, i64)>) {
        let n = self.adj.len();
        let source = self.source();
        let sink = self.sink();
        let mut potential = vec![0i64; n];
        let mut total_flow = 0i64;

        loop {
            let (dist, prev_edge) = self.dijkstra_reduced(source, &potential);
            if dist[sink] == i64::MAX {
                break;
            }
            for v in 0..n {
                if dist[v] < i64::MAX {
                    potential[v] += dist[v];
                }
            }

            let mut push = i64::MAX;
            let mut v = sink;
            while v != source {
                let e = prev_edge[v].expect("reachable node has an incoming edge on the shortest path");
                push = push.min(self.edges[e].cap);
                v = self.edges[e].from;
            }

            let mut v = sink;
            while v != source {
                let e = prev_edge[v].expect("reachable node has an incoming edge on the shortest path");
                self.edges[e].cap -= push;
                self.edges[e ^ 1].cap += push;
                v = self.edges[e].from;
            }
            total_flow += push;
        }

        (total_flow, self.recover_assignments())
    }

    /// Per-arc flow used = the reverse edge's accumulated capacity (arcs
    /// between supply and demand nodes are the only edges with `cost > 0`).
    fn recover_assignments(&self) -> Vec<(usize, usize, i64)> {
        let mut out = Vec::new();
        let mut idx = 0;
        while idx < self.edges.len() {
            let fwd = self.edges[idx];
            if fwd.cost > 0 {
                let used = self.edges[idx + 1].cap;
                if used > 0 {
                    out.push((fwd.from - 1, fwd.to - (1 + self.n_supply), used));
                }
            }
            idx += 2;
        }
        out
    }

    /// Dijkstra over reduced costs `cost + potential[u] - potential[v]`,
    /// which stay nonnegative for every residual edge once potentials are
    /// kept up to date (Johnson's reweighting).
    fn dijkstra_reduced(&self, source: usize, potential: &[i64]) -> (Vec<i64>, Vec<Option<usize>>) {
        let n = self.adj.len();
        let mut dist = vec![i64::MAX; n];
        let mut prev_edge = vec![None; n];
        dist[source] = 0;

        let mut heap = BinaryHeap::new();
        heap.push(Reverse((0i64, source)));

        while let Some(Reverse((d, u))) = heap.pop() {
            if d > dist[u] {
                continue;
            }
            for &e in &self.adj[u] {
                let edge = self.edges[e];
                if edge.cap <= 0 {
                    continue;
                }
                let reduced = edge.cost + potential[u] - potential[edge.to];
                let next = d + reduced;
                if next < dist[edge.to] {
                    dist[edge.to] = next;
                    prev_edge[edge.to] = Some(e);
                    heap.push(Reverse((next, edge.to)));
                }
            }
        }

        (dist, prev_edge)
    }
}
