//! Error types surfaced by the planner.
//!
//! "No candidate" and "no edge" outcomes are plain `Option`/`bool` values and
//! never appear here. Messages are shown to end users as-is, so each variant
//! names the entity at fault.

/// Identifier of a drill hole as supplied by the caller.
pub type HoleId = i64;

/// Identifier of a node in a pose graph (its insertion index).
pub type NodeId = usize;

/// Fatal planning failures for the current run.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("drill hole {hole_id} cannot be reached: no feasible approach")]
    UnreachableHole { hole_id: HoleId },
    #[error("pose graph must contain exactly one home node, found {count}")]
    HomeCount { count: usize },
    #[error("drill holes not connected to home: {}", join_ids(.hole_ids))]
    Disconnected { hole_ids: Vec<HoleId> },
    #[error("too many drill holes: {count} (maximum {max})")]
    TooManyHoles { count: usize, max: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Failures of a single path query.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("no pose graph loaded")]
    NotLoaded,
    #[error("node {0} is not in the loaded graph")]
    UnknownNode(NodeId),
}

/// Malformed persisted pose records.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphLoadError {
    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),
    #[error("node {node} lists unknown neighbour {neighbour}")]
    UnknownNeighbour { node: NodeId, neighbour: NodeId },
    #[error("node {node} has unknown pose type {tag:?}")]
    UnknownPoseType { node: NodeId, tag: String },
    #[error("node {0} has a non-finite pose")]
    NonFinite(NodeId),
    #[error("node ids must be 0..n, missing {0}")]
    NonContiguous(NodeId),
}

fn join_ids(ids: &[HoleId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
