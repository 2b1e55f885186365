//! Funnel data model: submitted snapshot types and the validated graph.
pub mod registry;
pub mod types;

pub use registry::{EdgeMeta, FunnelGraph, FunnelTopology, Successors};
pub use types::{
    total_visits, Branch, FunnelEdge, NodeId, NodeKind, OfferNode, Snapshot, SnapshotError,
    TrafficSource,
};
