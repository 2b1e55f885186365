//! Node- and source-level rules: the entry point and value ranges.

use crate::store::{NodeKind, OfferNode, TrafficSource};
use crate::validation::error::ValidationError;
use std::collections::HashSet;

/// "One Front Door": exactly one Frontend offer receives the traffic.
pub(crate) fn validate_entry_point(nodes: &[OfferNode]) -> Option<ValidationError> {
    let found = nodes.iter().filter(|n| n.kind == NodeKind::Frontend).count();
    (found != 1).then_some(ValidationError::NoEntryPoint { found })
}

/// Unique ids, rates within `[0, 100]` and non-negative prices.
///
/// NaN and infinite values are rejected along with out-of-range ones.
pub(crate) fn validate_node_values(nodes: &[OfferNode]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::with_capacity(nodes.len());

    for node in nodes {
        if !seen.insert(node.id.as_str()) {
            errors.push(ValidationError::DuplicateNodeId { node_id: node.id.clone() });
        }
        if !(0.0..=100.0).contains(&node.conversion_rate) {
            errors.push(ValidationError::InvalidRate {
                node_id: node.id.clone(),
                rate: node.conversion_rate,
            });
        }
        if !(node.price.is_finite() && node.price >= 0.0) {
            errors.push(ValidationError::InvalidPrice { node_id: node.id.clone(), price: node.price });
        }
    }
    errors
}

pub(crate) fn validate_source_costs(sources: &[TrafficSource]) -> Vec<ValidationError> {
    sources
        .iter()
        .filter(|s| !(s.cost.is_finite() && s.cost >= 0.0))
        .map(|s| ValidationError::InvalidSourceCost { source_id: s.id.clone(), cost: s.cost })
        .collect()
}
