//! The central validator that orchestrates the execution of all validation rules.
use super::error::ValidationError;
use super::rules::{acyclic, edges, nodes};
use crate::store::registry::assemble;
use crate::store::{FunnelEdge, FunnelTopology, NodeId, NodeKind, OfferNode, Snapshot, TrafficSource};
use std::collections::HashMap;

/// The orchestrator for funnel validation.
///
/// Rules run in a fixed order: entry point, node and source values, edge
/// endpoints, Frontend branches, branch cardinality, Buy targets, and finally
/// acyclicity. Findings are collected in that order, so the first one is the
/// error `FunnelGraph::build` reports.
pub struct Validator<'a> {
    nodes: &'a [OfferNode],
    edges: &'a [FunnelEdge],
    sources: &'a [TrafficSource],
    topology: &'a FunnelTopology,
    index: &'a HashMap<String, NodeId>,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(
        nodes: &'a [OfferNode],
        edges: &'a [FunnelEdge],
        sources: &'a [TrafficSource],
        topology: &'a FunnelTopology,
        index: &'a HashMap<String, NodeId>,
    ) -> Self {
        Self { nodes, edges, sources, topology, index }
    }

    /// Executes all registered validation rules.
    ///
    /// # Returns
    /// - `Ok(())` if no validation errors are found.
    /// - `Err(Vec<ValidationError>)` containing all errors discovered, in rule order.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // Kind lookup goes through the index so duplicate ids resolve the same
        // way the graph does.
        let kinds: HashMap<&str, NodeKind> = self
            .index
            .iter()
            .map(|(key, &id)| (key.as_str(), self.topology[id].kind))
            .collect();

        errors.extend(nodes::validate_entry_point(self.nodes));
        errors.extend(nodes::validate_node_values(self.nodes));
        errors.extend(nodes::validate_source_costs(self.sources));
        errors.extend(edges::validate_endpoints(self.edges, &kinds));
        errors.extend(edges::validate_frontend_branches(self.edges, &kinds));
        errors.extend(edges::validate_branch_cardinality(self.nodes, self.edges));
        errors.extend(edges::validate_buy_targets(self.edges, &kinds));
        errors.extend(acyclic::validate_acyclic(self.topology));

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(count = errors.len(), "funnel validation failed");
            Err(errors)
        }
    }
}

/// Runs every rule against a snapshot and returns all findings.
///
/// Unlike `FunnelGraph::build`, this does not stop at the first problem; it
/// is meant for showing every message next to its node or edge at once.
pub fn diagnose(snapshot: &Snapshot) -> Vec<ValidationError> {
    let (topology, index) = assemble(&snapshot.nodes, &snapshot.edges);
    Validator::new(&snapshot.nodes, &snapshot.edges, &snapshot.sources, &topology, &index)
        .validate()
        .err()
        .unwrap_or_default()
}
