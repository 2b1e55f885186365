//! ledger.rs
//! Dense per-node storage for one propagation run.

use crate::store::NodeId;
use serde::Serialize;
use thiserror::Error;

/// Failures of the computation stage.
///
/// A validated graph never produces the first two; they exist so an
/// invariant break surfaces as an error instead of a panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("Funnel has no Frontend offer to receive traffic")]
    EmptyGraph,
    #[error("Cycle detected involving node '{node_id}'")]
    CycleDetected { node_id: String },
    #[error("Unknown node '{0}'")]
    UnknownNode(String),
}

/// Traffic accounting for one node.
///
/// `buyers + declined == traffic_in` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTraffic {
    pub traffic_in: u64,
    pub buyers: u64,
    pub declined: u64,
}

impl NodeTraffic {
    /// Splits `traffic_in` by a percentage rate.
    ///
    /// Only the buyer count is floored; the declined count is the exact
    /// remainder.
    pub fn split(traffic_in: u64, conversion_rate: f64) -> Self {
        let buyers = converted(traffic_in, conversion_rate);
        Self { traffic_in, buyers, declined: traffic_in - buyers }
    }
}

/// Fixed-point units per percentage point.
const RATE_SCALE: f64 = 1_000_000.0;
/// `100%` in fixed-point units.
const FULL_RATE: u128 = 100_000_000;

/// `floor(traffic * rate / 100)`, kept within `[0, traffic]`.
///
/// The rate is rounded to millionths of a percent and the product is taken in
/// integers; a float product can land just below a whole number and floor one
/// buyer short.
pub(crate) fn converted(traffic: u64, rate: f64) -> u64 {
    if !(rate > 0.0) {
        return 0;
    }
    let scaled = (rate.min(100.0) * RATE_SCALE).round() as u128;
    let buyers = traffic as u128 * scaled / FULL_RATE;
    // scaled <= FULL_RATE, so buyers <= traffic
    buyers.min(traffic as u128) as u64
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    values: Vec<Option<NodeTraffic>>,
}

impl Ledger {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(size: usize) -> Self {
        Self { values: vec![None; size] }
    }

    #[inline(always)]
    pub fn get(&self, node_id: NodeId) -> Option<&NodeTraffic> {
        self.values.get(node_id.index())?.as_ref()
    }

    #[inline(always)]
    pub fn insert(&mut self, node_id: NodeId, value: NodeTraffic) {
        let idx = node_id.index();
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }

    /// Number of nodes with an entry.
    pub fn len(&self) -> usize { self.values.iter().filter(|v| v.is_some()).count() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
