//! Graph-wide rule: the funnel must terminate.

use crate::analysis::topology;
use crate::store::FunnelTopology;
use crate::validation::error::ValidationError;

/// Runs Kahn's algorithm over every submitted node, reachable or not.
pub(crate) fn validate_acyclic(graph: &FunnelTopology) -> Option<ValidationError> {
    topology::sort(graph, None).err().map(|cycle| ValidationError::CycleDetected {
        node_id: graph[cycle.node].id.clone(),
    })
}
