//! Executes the funnel: traffic propagation and everything derived from it.
pub mod breakeven;
pub mod ledger;
pub mod metrics;
pub mod propagation;
pub mod report;
pub mod sensitivity;

pub use breakeven::{breakeven, breakeven_status, BreakevenStatus};
pub use ledger::{ComputationError, Ledger, NodeTraffic};
pub use metrics::{aggregate, FunnelTotals, MetricsResult, NodeMetrics};
pub use propagation::{propagate, propagate_sources, PropagationResult};
pub use report::{simulate, FunnelReport, NodeReport, SimulationOptions, SourceAttribution};
pub use sensitivity::{
    sensitivity, sensitivity_all, sensitivity_with, NodeSensitivity, SensitivityOptions,
    DEFAULT_RATE_STEP,
};
