//! Topological traffic propagation through the funnel.

use super::ledger::{ComputationError, Ledger, NodeTraffic};
use crate::analysis::topology;
use crate::store::{total_visits, Branch, FunnelGraph, NodeId, NodeKind, TrafficSource};

/// Output of one propagation run.
#[derive(Debug, Clone)]
pub struct PropagationResult {
    order: Vec<NodeId>,
    ledger: Ledger,
    total_inbound: u64,
}

impl PropagationResult {
    /// Reachable nodes in evaluation order.
    pub fn order(&self) -> &[NodeId] { &self.order }

    pub fn get(&self, id: NodeId) -> Option<&NodeTraffic> { self.ledger.get(id) }

    /// Traffic fed into the Frontend.
    pub fn total_inbound(&self) -> u64 { self.total_inbound }

    /// `(node, traffic)` pairs in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeTraffic)> + '_ {
        self.order.iter().filter_map(move |&id| self.ledger.get(id).map(|t| (id, t)))
    }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }
}

/// Pushes `total_inbound` visitors through the graph.
///
/// Nodes are evaluated once each in topological order over the subgraph
/// reachable from the Frontend. A node's inflow is the sum of buyers arriving
/// on Buy edges and decliners arriving on NoThanks edges from all of its
/// predecessors. Traffic on a branch with no edge leaves the funnel.
pub fn propagate(graph: &FunnelGraph, total_inbound: u64) -> Result<PropagationResult, ComputationError> {
    let entry = graph.entry();
    if graph.get(entry).map(|n| n.kind) != Some(NodeKind::Frontend) {
        tracing::error!(entry = entry.index(), "invariant violated: entry node is not a Frontend offer");
        return Err(ComputationError::EmptyGraph);
    }

    let order = topology::sort(graph.topology(), Some(graph.reachable())).map_err(|cycle| {
        let node_id = graph.node(cycle.node).id.clone();
        tracing::error!(%node_id, "invariant violated: cycle in validated funnel");
        ComputationError::CycleDetected { node_id }
    })?;

    let mut inflow = vec![0u64; graph.node_count()];
    inflow[entry.index()] = total_inbound;
    let mut ledger = Ledger::with_capacity(graph.node_count());

    for &id in &order {
        let node = graph.node(id);
        let traffic = NodeTraffic::split(inflow[id.index()], node.conversion_rate);

        for (branch, child) in graph.successors(id) {
            let flow = match branch {
                Branch::Buy => traffic.buyers,
                Branch::NoThanks => traffic.declined,
            };
            inflow[child.index()] = inflow[child.index()].saturating_add(flow);
        }
        ledger.insert(id, traffic);
    }

    tracing::debug!(total_inbound, evaluated = order.len(), "funnel propagated");

    Ok(PropagationResult { order, ledger, total_inbound })
}

/// Sums the visits of all sources and propagates them.
pub fn propagate_sources(
    graph: &FunnelGraph,
    sources: &[TrafficSource],
) -> Result<PropagationResult, ComputationError> {
    propagate(graph, total_visits(sources))
}
