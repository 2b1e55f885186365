//! registry.rs
//! The validated funnel graph. Built wholesale from a snapshot, never mutated.

use super::types::*;
use crate::analysis::topology;
use crate::validation::{ValidationError, Validator};
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Edge payload kept in the adjacency structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMeta {
    pub id: String,
    pub branch: Branch,
}

/// Raw adjacency over the submitted nodes. Edges whose endpoints are unknown
/// are left out; the validator reports them separately.
pub type FunnelTopology = DiGraph<OfferNode, EdgeMeta>;

/// Outgoing (branch, target) pairs of a node, Buy first.
pub type Successors = SmallVec<[(Branch, NodeId); 2]>;

/// Loads nodes and resolvable edges into a petgraph. When ids collide the
/// first node wins the lookup slot.
pub(crate) fn assemble(
    nodes: &[OfferNode],
    edges: &[FunnelEdge],
) -> (FunnelTopology, HashMap<String, NodeId>) {
    let mut graph = FunnelTopology::with_capacity(nodes.len(), edges.len());
    let mut index = HashMap::with_capacity(nodes.len());

    for node in nodes {
        let id = graph.add_node(node.clone());
        index.entry(node.id.clone()).or_insert(id);
    }

    for edge in edges {
        if let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) {
            graph.add_edge(s, t, EdgeMeta { id: edge.id.clone(), branch: edge.branch });
        }
    }

    (graph, index)
}

/// Successors of `id` sorted by branch so traversal order is stable.
pub(crate) fn successors(graph: &FunnelTopology, id: NodeId) -> Successors {
    let mut out: Successors = graph
        .edges_directed(id, Direction::Outgoing)
        .map(|e| (e.weight().branch, e.target()))
        .collect();
    out.sort_by_key(|&(branch, target)| (branch, target.index()));
    out
}

#[derive(Debug, Clone)]
pub struct FunnelGraph {
    topology: FunnelTopology,
    index: HashMap<String, NodeId>,
    entry: NodeId,
    reachable: HashSet<NodeId>,
    sources: Vec<TrafficSource>,
}

impl FunnelGraph {
    /// Validates the parts and assembles the graph.
    ///
    /// Returns the first rule violation in validation order. Nodes that are
    /// not reachable from the entry are accepted and reported as dangling.
    pub fn build(
        nodes: Vec<OfferNode>,
        edges: Vec<FunnelEdge>,
        sources: Vec<TrafficSource>,
    ) -> Result<Self, ValidationError> {
        let (topology, index) = assemble(&nodes, &edges);

        if let Err(errors) = Validator::new(&nodes, &edges, &sources, &topology, &index).validate() {
            // The validator only fails with at least one finding.
            if let Some(first) = errors.into_iter().next() {
                return Err(first);
            }
        }

        let entry = topology
            .node_indices()
            .find(|&id| topology[id].kind == NodeKind::Frontend)
            .ok_or(ValidationError::NoEntryPoint { found: 0 })?;
        let reachable = topology::reachable_from(&topology, entry);

        let graph = Self { topology, index, entry, reachable, sources };

        let dangling = graph.dangling_ids();
        if !dangling.is_empty() {
            tracing::warn!(?dangling, "funnel has nodes unreachable from the entry offer");
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            sources = graph.sources.len(),
            "funnel graph built"
        );

        Ok(graph)
    }

    pub fn node_count(&self) -> usize { self.topology.node_count() }
    pub fn edge_count(&self) -> usize { self.topology.edge_count() }

    /// The unique Frontend node.
    pub fn entry(&self) -> NodeId { self.entry }

    pub fn node(&self, id: NodeId) -> &OfferNode { &self.topology[id] }

    pub fn get(&self, id: NodeId) -> Option<&OfferNode> { self.topology.node_weight(id) }

    pub fn index_of(&self, key: &str) -> Option<NodeId> { self.index.get(key).copied() }

    pub fn sources(&self) -> &[TrafficSource] { &self.sources }

    pub fn total_visits(&self) -> u64 { total_visits(&self.sources) }

    pub fn total_cost(&self) -> f64 { self.sources.iter().map(|s| s.cost).sum() }

    pub fn successors(&self, id: NodeId) -> Successors { successors(&self.topology, id) }

    /// Target of the node's edge for `branch`, if it has one.
    pub fn successor(&self, id: NodeId, branch: Branch) -> Option<NodeId> {
        self.successors(id).into_iter().find(|&(b, _)| b == branch).map(|(_, t)| t)
    }

    pub fn is_reachable(&self, id: NodeId) -> bool { self.reachable.contains(&id) }

    pub(crate) fn reachable(&self) -> &HashSet<NodeId> { &self.reachable }

    pub(crate) fn topology(&self) -> &FunnelTopology { &self.topology }

    /// Nodes not reachable from the entry, in submission order.
    pub fn dangling(&self) -> Vec<NodeId> {
        self.topology.node_indices().filter(|&id| !self.is_reachable(id)).collect()
    }

    pub fn dangling_ids(&self) -> Vec<String> {
        self.dangling().into_iter().map(|id| self.topology[id].id.clone()).collect()
    }

    /// Copy of this graph with one node's conversion rate replaced.
    ///
    /// The rate is clamped to `[0, 100]`, so the copy stays valid without
    /// re-running validation.
    pub fn with_conversion_rate(&self, id: NodeId, rate: f64) -> Self {
        let mut next = self.clone();
        if let Some(node) = next.topology.node_weight_mut(id) {
            node.conversion_rate = rate.clamp(0.0, 100.0);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funnel() -> FunnelGraph {
        FunnelGraph::build(
            vec![
                OfferNode::new("F", NodeKind::Frontend, 50.0, 20.0),
                OfferNode::new("A", NodeKind::OneTimeOffer, 100.0, 30.0),
                OfferNode::new("B", NodeKind::Downsell, 20.0, 50.0),
                OfferNode::new("Z", NodeKind::OneTimeOffer, 10.0, 10.0),
            ],
            vec![
                FunnelEdge::new("e2", "A", "B", Branch::NoThanks),
                FunnelEdge::new("e1", "F", "A", Branch::Buy),
            ],
            vec![TrafficSource::new("s1", "Ads", 1000, 250.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_build_resolves_ids_and_entry() {
        let g = funnel();
        let f = g.index_of("F").unwrap();
        let a = g.index_of("A").unwrap();
        assert_eq!(g.entry(), f);
        assert_eq!(g.successor(f, Branch::Buy), Some(a));
        assert_eq!(g.successor(f, Branch::NoThanks), None);
        assert_eq!(g.successor(a, Branch::NoThanks), g.index_of("B"));
        assert_eq!(g.total_cost(), 250.0);
        assert_eq!(g.total_visits(), 1000);
    }

    #[test]
    fn test_disconnected_node_is_dangling_not_error() {
        let g = funnel();
        assert_eq!(g.dangling_ids(), vec!["Z".to_string()]);
        assert!(!g.is_reachable(g.index_of("Z").unwrap()));
        assert!(g.is_reachable(g.index_of("B").unwrap()));
    }

    #[test]
    fn test_with_conversion_rate_leaves_original_untouched() {
        let g = funnel();
        let a = g.index_of("A").unwrap();
        let bumped = g.with_conversion_rate(a, 130.0);
        assert_eq!(bumped.node(a).conversion_rate, 100.0);
        assert_eq!(g.node(a).conversion_rate, 30.0);
    }

    #[test]
    fn test_successors_are_ordered_buy_first() {
        let g = FunnelGraph::build(
            vec![
                OfferNode::new("F", NodeKind::Frontend, 1.0, 50.0),
                OfferNode::new("A", NodeKind::OneTimeOffer, 1.0, 50.0),
                OfferNode::new("B", NodeKind::Downsell, 1.0, 50.0),
                OfferNode::new("C", NodeKind::OneTimeOffer, 1.0, 50.0),
            ],
            vec![
                FunnelEdge::new("e1", "F", "A", Branch::Buy),
                FunnelEdge::new("e2", "A", "B", Branch::NoThanks),
                FunnelEdge::new("e3", "A", "C", Branch::Buy),
            ],
            vec![],
        )
        .unwrap();
        let a = g.index_of("A").unwrap();
        let branches: Vec<Branch> = g.successors(a).iter().map(|&(b, _)| b).collect();
        assert_eq!(branches, vec![Branch::Buy, Branch::NoThanks]);
    }
}
