//! Funnel traffic-simulation and metrics engine.
//!
//! A funnel is a DAG of monetized offers. Visitors enter at the single
//! Frontend offer; at every offer a fixed percentage buys and the rest
//! declines, and each outcome may lead to a further offer. The engine pushes
//! traffic through the graph once per node in topological order, then derives
//! revenue, EPC, profit, breakeven traffic and per-offer rate sensitivity.
//!
//! Every entry point is a pure function of an immutable graph snapshot:
//!
//! ```
//! use funnel_flow_core::{simulate, Snapshot, SimulationOptions};
//!
//! let snapshot = Snapshot::from_json(r#"{
//!     "nodes": [{"id": "F", "kind": "frontend", "price": 50.0, "conversionRate": 20.0}],
//!     "sources": [{"id": "s1", "label": "Ads", "visits": 1000, "cost": 300.0}]
//! }"#).unwrap();
//! let graph = snapshot.build().unwrap();
//! let report = simulate(&graph, &SimulationOptions::default()).unwrap();
//! assert_eq!(report.totals.total_revenue, 10_000.0);
//! ```

pub mod analysis {
    pub mod topology;
}
pub mod compute;
pub mod display;
pub mod store;
pub mod validation;

pub use compute::{
    aggregate, breakeven, breakeven_status, propagate, propagate_sources, sensitivity,
    sensitivity_all, sensitivity_with, simulate, BreakevenStatus, ComputationError, FunnelReport,
    FunnelTotals, MetricsResult, NodeMetrics, NodeReport, NodeSensitivity, NodeTraffic,
    PropagationResult, SensitivityOptions, SimulationOptions, SourceAttribution,
};
pub use store::{
    Branch, FunnelEdge, FunnelGraph, NodeId, NodeKind, OfferNode, Snapshot, SnapshotError,
    TrafficSource,
};
pub use validation::{diagnose, ValidationError, ValidationErrorKind};
