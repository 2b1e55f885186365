//! Financial metrics derived from a propagation run.

use super::propagation::PropagationResult;
use crate::store::{FunnelGraph, NodeId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NodeMetrics {
    /// `buyers * price`.
    pub revenue: f64,
    /// Revenue per inbound visitor at this node; 0 with no traffic.
    pub epc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelTotals {
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    /// Funnel revenue per inbound visitor across all sources.
    pub blended_epc: f64,
    pub total_inbound: u64,
}

#[derive(Debug, Clone)]
pub struct MetricsResult {
    order: Vec<NodeId>,
    values: Vec<Option<NodeMetrics>>,
    pub totals: FunnelTotals,
}

impl MetricsResult {
    pub fn get(&self, id: NodeId) -> Option<&NodeMetrics> {
        self.values.get(id.index())?.as_ref()
    }

    /// `(node, metrics)` pairs in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeMetrics)> + '_ {
        self.order.iter().filter_map(move |&id| self.get(id).map(|m| (id, m)))
    }
}

/// Ratio that treats an empty denominator as zero earnings.
#[inline]
fn per_visitor(revenue: f64, visitors: u64) -> f64 {
    if visitors > 0 { revenue / visitors as f64 } else { 0.0 }
}

/// Computes revenue and EPC for every evaluated node plus funnel totals.
///
/// Every node contributes its own buyer revenue to the total, not only leaf
/// offers. Cost comes from the graph's traffic sources.
pub fn aggregate(graph: &FunnelGraph, propagation: &PropagationResult) -> MetricsResult {
    let mut values = vec![None; graph.node_count()];
    let mut total_revenue = 0.0;

    for (id, traffic) in propagation.iter() {
        let revenue = traffic.buyers as f64 * graph.node(id).price;
        total_revenue += revenue;
        values[id.index()] = Some(NodeMetrics { revenue, epc: per_visitor(revenue, traffic.traffic_in) });
    }

    let total_cost = graph.total_cost();
    let total_inbound = propagation.total_inbound();

    MetricsResult {
        order: propagation.order().to_vec(),
        values,
        totals: FunnelTotals {
            total_revenue,
            total_cost,
            total_profit: total_revenue - total_cost,
            blended_epc: per_visitor(total_revenue, total_inbound),
            total_inbound,
        },
    }
}
