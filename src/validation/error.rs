//! Defines the error types for the validation module.
use crate::store::Branch;
use serde::Serialize;
use thiserror::Error;

/// The specific category of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationErrorKind {
    NoEntryPoint,
    DuplicateNodeId,
    DanglingEdge,
    InvalidFrontendBranch,
    BranchCardinality,
    InvalidBuyTarget,
    CycleDetected,
    InvalidRate,
    InvalidPrice,
    InvalidSourceCost,
}

/// A structural or value problem found while building a funnel graph.
///
/// Each variant carries the id of the node, edge or source the host should
/// attach its inline message to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Funnel must have exactly one Frontend offer, found {found}")]
    NoEntryPoint { found: usize },
    #[error("Node id '{node_id}' is used more than once")]
    DuplicateNodeId { node_id: String },
    #[error("Edge '{edge_id}' references unknown node '{node_id}'")]
    DanglingEdge { edge_id: String, node_id: String },
    #[error("Edge '{edge_id}' leaves the Frontend offer '{node_id}' on a NoThanks branch")]
    InvalidFrontendBranch { edge_id: String, node_id: String },
    #[error("Node '{node_id}' has {count} outgoing {branch} edges, at most one is allowed")]
    BranchCardinality { node_id: String, branch: Branch, count: usize },
    #[error("Buy edge '{edge_id}' targets Downsell '{target}'; downsells are only reachable via NoThanks")]
    InvalidBuyTarget { edge_id: String, target: String },
    #[error("Cycle detected involving node '{node_id}'")]
    CycleDetected { node_id: String },
    #[error("Node '{node_id}' has conversion rate {rate}, expected a percentage in [0, 100]")]
    InvalidRate { node_id: String, rate: f64 },
    #[error("Node '{node_id}' has price {price}, expected a non-negative amount")]
    InvalidPrice { node_id: String, price: f64 },
    #[error("Traffic source '{source_id}' has cost {cost}, expected a non-negative amount")]
    InvalidSourceCost { source_id: String, cost: f64 },
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::NoEntryPoint { .. } => ValidationErrorKind::NoEntryPoint,
            Self::DuplicateNodeId { .. } => ValidationErrorKind::DuplicateNodeId,
            Self::DanglingEdge { .. } => ValidationErrorKind::DanglingEdge,
            Self::InvalidFrontendBranch { .. } => ValidationErrorKind::InvalidFrontendBranch,
            Self::BranchCardinality { .. } => ValidationErrorKind::BranchCardinality,
            Self::InvalidBuyTarget { .. } => ValidationErrorKind::InvalidBuyTarget,
            Self::CycleDetected { .. } => ValidationErrorKind::CycleDetected,
            Self::InvalidRate { .. } => ValidationErrorKind::InvalidRate,
            Self::InvalidPrice { .. } => ValidationErrorKind::InvalidPrice,
            Self::InvalidSourceCost { .. } => ValidationErrorKind::InvalidSourceCost,
        }
    }

    /// Id of the node, edge or source the error is about. `None` for
    /// graph-wide problems.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::NoEntryPoint { .. } => None,
            Self::DuplicateNodeId { node_id }
            | Self::BranchCardinality { node_id, .. }
            | Self::CycleDetected { node_id }
            | Self::InvalidRate { node_id, .. }
            | Self::InvalidPrice { node_id, .. } => Some(node_id.as_str()),
            Self::DanglingEdge { edge_id, .. }
            | Self::InvalidFrontendBranch { edge_id, .. }
            | Self::InvalidBuyTarget { edge_id, .. } => Some(edge_id.as_str()),
            Self::InvalidSourceCost { source_id, .. } => Some(source_id.as_str()),
        }
    }
}
