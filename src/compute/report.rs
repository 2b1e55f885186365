//! One-call pipeline: propagate, aggregate, breakeven and attribution.

use super::breakeven::{breakeven, breakeven_status, BreakevenStatus};
use super::ledger::ComputationError;
use super::metrics::{aggregate, FunnelTotals};
use super::propagation::propagate;
use super::sensitivity::{sensitivity_all, SensitivityOptions};
use crate::store::{FunnelGraph, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// When set, every reachable node gets a sensitivity delta.
    pub sensitivity: Option<SensitivityOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReport {
    pub node_id: String,
    pub kind: NodeKind,
    pub traffic_in: u64,
    pub buyers: u64,
    pub declined: u64,
    pub revenue: f64,
    pub epc: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity_delta: Option<f64>,
}

/// A traffic source's share of funnel revenue at the blended EPC.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttribution {
    pub id: String,
    pub label: String,
    pub visits: u64,
    pub cost: f64,
    pub attributed_revenue: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelReport {
    /// Reachable nodes in evaluation order.
    pub nodes: Vec<NodeReport>,
    pub totals: FunnelTotals,
    pub breakeven_visitors: Option<u64>,
    pub breakeven_status: BreakevenStatus,
    pub sources: Vec<SourceAttribution>,
    /// Ids of nodes not connected to the entry offer.
    pub dangling: Vec<String>,
}

impl FunnelReport {
    pub fn node(&self, key: &str) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.node_id == key)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs the whole engine over a graph and its own traffic sources.
pub fn simulate(graph: &FunnelGraph, options: &SimulationOptions) -> Result<FunnelReport, ComputationError> {
    let propagation = propagate(graph, graph.total_visits())?;
    let metrics = aggregate(graph, &propagation);
    let totals = metrics.totals;

    let deltas: HashMap<String, f64> = match &options.sensitivity {
        Some(opts) => sensitivity_all(graph, graph.sources(), opts)?
            .into_iter()
            .map(|s| (s.node_id, s.delta))
            .collect(),
        None => HashMap::new(),
    };

    let nodes = propagation
        .iter()
        .map(|(id, traffic)| {
            let node = graph.node(id);
            let m = metrics.get(id).copied().unwrap_or_default();
            NodeReport {
                node_id: node.id.clone(),
                kind: node.kind,
                traffic_in: traffic.traffic_in,
                buyers: traffic.buyers,
                declined: traffic.declined,
                revenue: m.revenue,
                epc: m.epc,
                sensitivity_delta: deltas.get(&node.id).copied(),
            }
        })
        .collect();

    let sources = graph
        .sources()
        .iter()
        .map(|s| {
            let attributed_revenue = s.visits as f64 * totals.blended_epc;
            SourceAttribution {
                id: s.id.clone(),
                label: s.label.clone(),
                visits: s.visits,
                cost: s.cost,
                attributed_revenue,
                profit: attributed_revenue - s.cost,
            }
        })
        .collect();

    let breakeven_visitors = breakeven(totals.total_cost, totals.blended_epc);

    Ok(FunnelReport {
        nodes,
        totals,
        breakeven_visitors,
        breakeven_status: breakeven_status(totals.total_inbound, breakeven_visitors),
        sources,
        dangling: graph.dangling_ids(),
    })
}
