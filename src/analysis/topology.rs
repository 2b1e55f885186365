use crate::store::registry::{successors, FunnelTopology};
use crate::store::NodeId;
use petgraph::visit::{Bfs, EdgeRef};
use petgraph::Direction;
use std::collections::{HashSet, VecDeque};

/// A node that Kahn's algorithm could not release. Always lies on a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    pub node: NodeId,
}

/// Returns a topological order using Kahn's Algorithm.
///
/// When `members` is given, only those nodes and the edges between them take
/// part; anything else is invisible to the sort. Every node appears after all
/// of its predecessors, so a node fed by several edges is visited once, after
/// all of its inflow is known.
///
/// Ties are broken by submission order for roots and Buy-before-NoThanks for
/// children, which keeps the output stable across runs.
pub fn sort(graph: &FunnelTopology, members: Option<&HashSet<NodeId>>) -> Result<Vec<NodeId>, Cycle> {
    let count = graph.node_count();
    let included = |id: NodeId| members.map_or(true, |m| m.contains(&id));

    let mut in_degree = vec![0usize; count];
    let mut queue = VecDeque::with_capacity(count);
    let mut order = Vec::with_capacity(count);
    let mut expected = 0;

    // 1. Initialize In-Degrees over the included subgraph
    for edge in graph.edge_references() {
        if included(edge.source()) && included(edge.target()) {
            in_degree[edge.target().index()] += 1;
        }
    }
    for id in graph.node_indices().filter(|&id| included(id)) {
        expected += 1;
        if in_degree[id.index()] == 0 {
            queue.push_back(id);
        }
    }

    // 2. Process Queue
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for (_, child) in successors(graph, node) {
            if !included(child) {
                continue;
            }
            let idx = child.index();
            in_degree[idx] -= 1;
            if in_degree[idx] == 0 {
                queue.push_back(child);
            }
        }
    }

    if order.len() != expected {
        return Err(locate_cycle(graph, &in_degree, &included));
    }

    Ok(order)
}

/// Walks backwards through unreleased nodes until one repeats.
///
/// Every unreleased node still has an unreleased predecessor, so the walk
/// cannot stall and the first repeat sits on a cycle.
fn locate_cycle(
    graph: &FunnelTopology,
    in_degree: &[usize],
    included: &impl Fn(NodeId) -> bool,
) -> Cycle {
    let stuck = |id: NodeId| included(id) && in_degree[id.index()] > 0;
    let mut seen = HashSet::new();
    let mut current = match graph.node_indices().find(|&id| stuck(id)) {
        Some(id) => id,
        None => return Cycle { node: NodeId::new(0) },
    };

    while seen.insert(current) {
        match graph.neighbors_directed(current, Direction::Incoming).find(|&p| stuck(p)) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    Cycle { node: current }
}

/// Identifies all nodes reachable from `start`, including `start` itself.
pub fn reachable_from(graph: &FunnelTopology, start: NodeId) -> HashSet<NodeId> {
    let mut visited = HashSet::new();
    let mut bfs = Bfs::new(graph, start);
    while let Some(node) = bfs.next(graph) {
        visited.insert(node);
    }
    visited
}
