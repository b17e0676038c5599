//! Flat, one-row-per-pose form of a pose graph.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{GraphLoadError, HoleId, NodeId};
use crate::geom::Pose;

use super::{Edge, PoseGraph, PoseNode, PoseType};

/// Persisted pose: id, type tag, pose, linked hole and neighbour ids.
///
/// `lat`/`lon` are optional geographic coordinates attached by callers that
/// reproject the plan; the planner itself never fills them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    pub id: NodeId,
    pub pose_type: String,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub drillhole_id: Option<HoleId>,
    pub neighbors: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl PoseRecord {
    pub fn pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.heading)
    }
}

/// Check ids, tags, poses and neighbour references; returns the parsed tags
/// keyed by id.
pub(crate) fn validate(
    records: &[PoseRecord],
) -> Result<HashMap<NodeId, PoseType>, GraphLoadError> {
    let mut kinds = HashMap::with_capacity(records.len());
    for r in records {
        let kind = r
            .pose_type
            .parse::<PoseType>()
            .map_err(|_| GraphLoadError::UnknownPoseType {
                node: r.id,
                tag: r.pose_type.clone(),
            })?;
        if !(r.x.is_finite() && r.y.is_finite() && r.heading.is_finite()) {
            return Err(GraphLoadError::NonFinite(r.id));
        }
        if kinds.insert(r.id, kind).is_some() {
            return Err(GraphLoadError::DuplicateId(r.id));
        }
    }
    for r in records {
        if let Some(&n) = r.neighbors.iter().find(|n| !kinds.contains_key(n)) {
            return Err(GraphLoadError::UnknownNeighbour {
                node: r.id,
                neighbour: n,
            });
        }
    }
    Ok(kinds)
}

impl PoseGraph {
    /// One record per node, neighbours ascending.
    pub fn to_records(&self) -> Vec<PoseRecord> {
        let adjacency = self.adjacency();
        self.nodes
            .iter()
            .enumerate()
            .map(|(id, node)| {
                let mut neighbors = adjacency[id].clone();
                neighbors.sort_unstable();
                neighbors.dedup();
                PoseRecord {
                    id,
                    pose_type: node.kind.as_str().to_string(),
                    x: node.pose.x,
                    y: node.pose.y,
                    heading: node.pose.theta,
                    drillhole_id: node.drillhole_id,
                    neighbors,
                    lat: None,
                    lon: None,
                }
            })
            .collect()
    }

    /// Rebuild a graph from records whose ids are exactly `0..n`.
    ///
    /// Neighbour lists are merged into undirected edges; weights are
    /// recomputed from the poses.
    pub fn from_records(records: &[PoseRecord]) -> Result<PoseGraph, GraphLoadError> {
        let kinds = validate(records)?;
        let mut sorted: Vec<&PoseRecord> = records.iter().collect();
        sorted.sort_by_key(|r| r.id);
        if let Some((expected, _)) = sorted.iter().enumerate().find(|(k, r)| r.id != *k) {
            return Err(GraphLoadError::NonContiguous(expected));
        }
        let nodes = sorted
            .iter()
            .map(|r| PoseNode {
                pose: r.pose(),
                kind: kinds[&r.id],
                drillhole_id: r.drillhole_id,
            })
            .collect();
        let pairs: BTreeSet<(NodeId, NodeId)> = sorted
            .iter()
            .flat_map(|r| r.neighbors.iter().map(move |&n| (r.id.min(n), r.id.max(n))))
            .filter(|(a, b)| a != b)
            .collect();
        let mut graph = PoseGraph { nodes, edges: Vec::new() };
        graph.edges = pairs
            .into_iter()
            .map(|(a, b)| Edge::between(&graph.nodes, a, b))
            .collect();
        Ok(graph)
    }
}
