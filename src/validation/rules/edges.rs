//! Edge-level rules: endpoints, branch usage and Downsell entry.

use crate::store::{Branch, FunnelEdge, NodeKind, OfferNode};
use crate::validation::error::ValidationError;
use std::collections::HashMap;

/// Every edge must point at nodes that exist.
pub(crate) fn validate_endpoints(
    edges: &[FunnelEdge],
    kinds: &HashMap<&str, NodeKind>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for edge in edges {
        for end in [&edge.source, &edge.target] {
            if !kinds.contains_key(end.as_str()) {
                errors.push(ValidationError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: end.clone(),
                });
            }
        }
    }
    errors
}

/// The Frontend has no declined outlet: non-buyers leave the funnel.
pub(crate) fn validate_frontend_branches(
    edges: &[FunnelEdge],
    kinds: &HashMap<&str, NodeKind>,
) -> Vec<ValidationError> {
    edges
        .iter()
        .filter(|e| e.branch == Branch::NoThanks)
        .filter(|e| kinds.get(e.source.as_str()) == Some(&NodeKind::Frontend))
        .map(|e| ValidationError::InvalidFrontendBranch {
            edge_id: e.id.clone(),
            node_id: e.source.clone(),
        })
        .collect()
}

/// At most one Buy and one NoThanks edge per source node.
///
/// Findings follow node submission order, Buy before NoThanks. NoThanks edges
/// out of the Frontend are already reported by `validate_frontend_branches`.
pub(crate) fn validate_branch_cardinality(
    nodes: &[OfferNode],
    edges: &[FunnelEdge],
) -> Vec<ValidationError> {
    let mut counts: HashMap<(&str, Branch), usize> = HashMap::new();
    for edge in edges {
        *counts.entry((edge.source.as_str(), edge.branch)).or_insert(0) += 1;
    }

    let mut errors = Vec::new();
    for node in nodes {
        for branch in [Branch::Buy, Branch::NoThanks] {
            if node.kind == NodeKind::Frontend && branch == Branch::NoThanks {
                continue;
            }
            let count = counts.remove(&(node.id.as_str(), branch)).unwrap_or(0);
            if count > 1 {
                errors.push(ValidationError::BranchCardinality {
                    node_id: node.id.clone(),
                    branch,
                    count,
                });
            }
        }
    }
    errors
}

/// "Declined Only": a Downsell is entered through NoThanks, never Buy.
pub(crate) fn validate_buy_targets(
    edges: &[FunnelEdge],
    kinds: &HashMap<&str, NodeKind>,
) -> Vec<ValidationError> {
    edges
        .iter()
        .filter(|e| e.branch == Branch::Buy)
        .filter(|e| kinds.get(e.target.as_str()) == Some(&NodeKind::Downsell))
        .map(|e| ValidationError::InvalidBuyTarget {
            edge_id: e.id.clone(),
            target: e.target.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<OfferNode> {
        vec![
            OfferNode::new("F", NodeKind::Frontend, 10.0, 10.0),
            OfferNode::new("A", NodeKind::OneTimeOffer, 10.0, 10.0),
            OfferNode::new("B", NodeKind::Downsell, 10.0, 10.0),
            OfferNode::new("C", NodeKind::OneTimeOffer, 10.0, 10.0),
        ]
    }

    fn kinds(nodes: &[OfferNode]) -> HashMap<&str, NodeKind> {
        nodes.iter().map(|n| (n.id.as_str(), n.kind)).collect()
    }

    #[test]
    fn test_unknown_endpoints_are_reported_per_end() {
        let nodes = nodes();
        let edges = vec![
            FunnelEdge::new("e1", "F", "ghost", Branch::Buy),
            FunnelEdge::new("e2", "nobody", "nowhere", Branch::Buy),
        ];
        let errs = validate_endpoints(&edges, &kinds(&nodes));
        assert_eq!(errs.len(), 3);
        assert_eq!(
            errs[0],
            ValidationError::DanglingEdge { edge_id: "e1".into(), node_id: "ghost".into() }
        );
    }

    #[test]
    fn test_frontend_cannot_decline() {
        let nodes = nodes();
        let edges = vec![FunnelEdge::new("e1", "F", "B", Branch::NoThanks)];
        let errs = validate_frontend_branches(&edges, &kinds(&nodes));
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].subject(), Some("e1"));
    }

    #[test]
    fn test_two_buy_edges_from_one_node() {
        let nodes = nodes();
        let edges = vec![
            FunnelEdge::new("e1", "F", "A", Branch::Buy),
            FunnelEdge::new("e2", "A", "C", Branch::Buy),
            FunnelEdge::new("e3", "A", "F", Branch::Buy),
            FunnelEdge::new("e4", "A", "B", Branch::NoThanks),
        ];
        let errs = validate_branch_cardinality(&nodes, &edges);
        assert_eq!(
            errs,
            vec![ValidationError::BranchCardinality { node_id: "A".into(), branch: Branch::Buy, count: 2 }]
        );
    }

    #[test]
    fn test_frontend_with_two_buy_edges() {
        let nodes = nodes();
        let edges = vec![
            FunnelEdge::new("e1", "F", "A", Branch::Buy),
            FunnelEdge::new("e2", "F", "C", Branch::Buy),
        ];
        let errs = validate_branch_cardinality(&nodes, &edges);
        assert_eq!(
            errs,
            vec![ValidationError::BranchCardinality { node_id: "F".into(), branch: Branch::Buy, count: 2 }]
        );
    }

    #[test]
    fn test_buy_into_downsell_rejected() {
        let nodes = nodes();
        let edges = vec![
            FunnelEdge::new("e1", "F", "A", Branch::Buy),
            FunnelEdge::new("e2", "A", "B", Branch::Buy),
            FunnelEdge::new("e3", "C", "B", Branch::NoThanks),
        ];
        let errs = validate_buy_targets(&edges, &kinds(&nodes));
        assert_eq!(
            errs,
            vec![ValidationError::InvalidBuyTarget { edge_id: "e2".into(), target: "B".into() }]
        );
    }
}
