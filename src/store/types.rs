use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::store::FunnelGraph;
use crate::validation::ValidationError;

/// Dense index of a node inside a built `FunnelGraph`.
///
/// Aliases `petgraph::graph::NodeIndex` so the registry can hand its indices
/// straight to graph algorithms.
pub type NodeId = petgraph::graph::NodeIndex;

/// The role an offer plays in the funnel.
///
/// The kind drives validation: exactly one `Frontend` must exist, and a
/// `Downsell` can only be entered through a declined path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// The entry offer. Receives all traffic-source inflow.
    Frontend,
    #[serde(alias = "oto")]
    OneTimeOffer,
    Downsell,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Frontend => "Frontend",
            NodeKind::OneTimeOffer => "OTO",
            NodeKind::Downsell => "Downsell",
        };
        f.write_str(s)
    }
}

/// Outcome of a visitor facing an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Branch {
    Buy,
    #[serde(alias = "no_thanks")]
    NoThanks,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Buy => f.write_str("Buy"),
            Branch::NoThanks => f.write_str("NoThanks"),
        }
    }
}

/// A monetized step as submitted by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferNode {
    pub id: String,
    pub kind: NodeKind,
    /// Currency amount charged to every buyer.
    pub price: f64,
    /// Percentage in `[0, 100]`.
    pub conversion_rate: f64,
}

impl OfferNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, price: f64, conversion_rate: f64) -> Self {
        Self { id: id.into(), kind, price, conversion_rate }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub branch: Branch,
}

impl FunnelEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        branch: Branch,
    ) -> Self {
        Self { id: id.into(), source: source.into(), target: target.into(), branch }
    }
}

/// A paid or organic inflow. Cost is kept for attribution only; it does not
/// influence propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSource {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub visits: u64,
    #[serde(default)]
    pub cost: f64,
}

impl TrafficSource {
    pub fn new(id: impl Into<String>, label: impl Into<String>, visits: u64, cost: f64) -> Self {
        Self { id: id.into(), label: label.into(), visits, cost }
    }
}

/// Total visits across all sources.
pub fn total_visits(sources: &[TrafficSource]) -> u64 {
    sources.iter().fold(0u64, |acc, s| acc.saturating_add(s.visits))
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid funnel: {0}")]
    Invalid(#[from] ValidationError),
}

/// The full graph description submitted on every edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<OfferNode>,
    #[serde(default)]
    pub edges: Vec<FunnelEdge>,
    #[serde(default)]
    pub sources: Vec<TrafficSource>,
}

impl Snapshot {
    pub fn from_json(s: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the snapshot and builds the graph.
    pub fn build(&self) -> Result<FunnelGraph, SnapshotError> {
        Ok(FunnelGraph::build(self.nodes.clone(), self.edges.clone(), self.sources.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "nodes": [
            {"id": "F", "kind": "frontend", "price": 50.0, "conversionRate": 20.0},
            {"id": "A", "kind": "oneTimeOffer", "price": 100.0, "conversionRate": 30.0},
            {"id": "B", "kind": "downsell", "price": 20.0, "conversionRate": 50.0}
        ],
        "edges": [
            {"id": "e1", "source": "F", "target": "A", "branch": "buy"},
            {"id": "e2", "source": "A", "target": "B", "branch": "noThanks"}
        ],
        "sources": [
            {"id": "s1", "label": "Ads", "visits": 600, "cost": 300.0},
            {"id": "s2", "label": "Email", "visits": 400}
        ]
    }"#;

    #[test]
    fn test_snapshot_parses_camel_case_json() {
        let snap = Snapshot::from_json(SAMPLE).unwrap();
        assert_eq!(snap.nodes.len(), 3);
        assert_eq!(snap.nodes[1].kind, NodeKind::OneTimeOffer);
        assert_eq!(snap.nodes[2].conversion_rate, 50.0);
        assert_eq!(snap.edges[1].branch, Branch::NoThanks);
        assert_eq!(snap.sources[1].cost, 0.0);
        assert_eq!(total_visits(&snap.sources), 1000);
    }

    #[test]
    fn test_snapshot_rejects_unknown_kind() {
        let raw = r#"{"nodes": [{"id": "F", "kind": "upsell", "price": 1, "conversionRate": 1}]}"#;
        assert!(matches!(Snapshot::from_json(raw), Err(SnapshotError::Parse(_))));
    }

    #[test]
    fn test_snapshot_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let snap = Snapshot::from_path(file.path()).unwrap();
        let graph = snap.build().unwrap();
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_snapshot_json_is_stable() {
        let snap = Snapshot::from_json(SAMPLE).unwrap();
        let again = Snapshot::from_json(&snap.to_json().unwrap()).unwrap();
        assert_eq!(snap, again);
    }

    #[test]
    fn test_invalid_funnel_is_reported_through_snapshot() {
        let raw = r#"{"nodes": [{"id": "A", "kind": "oneTimeOffer", "price": 1, "conversionRate": 1}]}"#;
        let err = Snapshot::from_json(raw).unwrap().build().unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(ValidationError::NoEntryPoint { found: 0 })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = Snapshot::from_path(dir.path().join("absent.json"));
        assert!(matches!(res, Err(SnapshotError::Io(_))));
    }
}
