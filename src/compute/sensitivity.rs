//! Finite-difference revenue sensitivity to a node's conversion rate.
//!
//! Raising a node's rate moves traffic from its NoThanks branch to its Buy
//! branch. Offers on the declined path lose inflow, so the funnel-wide delta
//! is signed: a rate increase can lower total revenue.

use super::ledger::ComputationError;
use super::metrics::aggregate;
use super::propagation::propagate;
use crate::store::{total_visits, FunnelGraph, NodeId, TrafficSource};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Percentage points added to the target rate by default.
pub const DEFAULT_RATE_STEP: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityOptions {
    /// Percentage-point change applied to the target's conversion rate. The
    /// perturbed rate is clamped to `[0, 100]`.
    pub step: f64,
}

impl Default for SensitivityOptions {
    fn default() -> Self {
        Self { step: DEFAULT_RATE_STEP }
    }
}

impl SensitivityOptions {
    fn effective_step(&self) -> f64 {
        if self.step.is_finite() {
            self.step
        } else {
            tracing::warn!(step = self.step, "non-finite sensitivity step, using default");
            DEFAULT_RATE_STEP
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSensitivity {
    pub node_id: String,
    /// Funnel revenue change; may be negative.
    pub delta: f64,
}

fn total_revenue(graph: &FunnelGraph, inbound: u64) -> Result<f64, ComputationError> {
    let propagation = propagate(graph, inbound)?;
    Ok(aggregate(graph, &propagation).totals.total_revenue)
}

/// Revenue delta for one node against a precomputed baseline.
fn delta_at(
    graph: &FunnelGraph,
    id: NodeId,
    inbound: u64,
    baseline: f64,
    step: f64,
) -> Result<f64, ComputationError> {
    // Dangling nodes carry no traffic in either run.
    if !graph.is_reachable(id) {
        return Ok(0.0);
    }
    let rate = graph.node(id).conversion_rate + step;
    let perturbed = graph.with_conversion_rate(id, rate);
    Ok(total_revenue(&perturbed, inbound)? - baseline)
}

/// Funnel revenue change from raising `target`'s conversion rate by one
/// percentage point (clamped at 100), all other rates held fixed.
pub fn sensitivity(
    graph: &FunnelGraph,
    sources: &[TrafficSource],
    target: &str,
) -> Result<f64, ComputationError> {
    sensitivity_with(graph, sources, target, &SensitivityOptions::default())
}

pub fn sensitivity_with(
    graph: &FunnelGraph,
    sources: &[TrafficSource],
    target: &str,
    options: &SensitivityOptions,
) -> Result<f64, ComputationError> {
    let id = graph
        .index_of(target)
        .ok_or_else(|| ComputationError::UnknownNode(target.to_string()))?;
    let inbound = total_visits(sources);
    let baseline = total_revenue(graph, inbound)?;
    delta_at(graph, id, inbound, baseline, options.effective_step())
}

/// Sensitivity of every reachable node, in evaluation order.
///
/// The baseline is computed once; each node then gets its own perturbed copy
/// of the graph, so the runs are independent. They run on the calling thread
/// unless the `parallel` feature is enabled.
pub fn sensitivity_all(
    graph: &FunnelGraph,
    sources: &[TrafficSource],
    options: &SensitivityOptions,
) -> Result<Vec<NodeSensitivity>, ComputationError> {
    let inbound = total_visits(sources);
    let propagation = propagate(graph, inbound)?;
    let baseline = aggregate(graph, &propagation).totals.total_revenue;
    let step = options.effective_step();

    #[cfg(feature = "parallel")]
    let nodes = propagation.order().par_iter();
    #[cfg(not(feature = "parallel"))]
    let nodes = propagation.order().iter();

    let deltas: Vec<NodeSensitivity> = nodes
        .map(|&id| {
            delta_at(graph, id, inbound, baseline, step)
                .map(|delta| NodeSensitivity { node_id: graph.node(id).id.clone(), delta })
        })
        .collect::<Result<Vec<_>, ComputationError>>()?;

    tracing::debug!(nodes = deltas.len(), step, "sensitivity computed");
    Ok(deltas)
}
