//! Pose graph: node and edge types, the edge test, assembly and validation.
//!
//! Purpose
//! - Collect home, street, transit and hole-approach poses into one indexed
//!   set, link every feasible pair, and guarantee that home and every drill
//!   hole end up in one connected component.
//!
//! Why this design
//! - Node identity is the insertion index; edges, forced links and persisted
//!   records all refer to it.
//! - The pairwise test is the dominant cost. An R-tree radius query limits it
//!   to pairs within the maximum separation, which the test rejects anyway,
//!   so the edge set matches exhaustive pairing.
//!
//! Code cross-refs: `candidate::generate`, `sampler::sample_features`,
//! `path::PathFinder`.

mod assemble;
mod predicate;
mod records;

pub use assemble::{assemble, AssemblyCfg, AssemblyInput, HoleTarget};
pub use predicate::{edge_weight, should_connect, EdgeCfg, EDGE_BIAS};
pub use records::PoseRecord;
pub(crate) use records::validate as validate_records;

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HoleId, NodeId, PlanError};
use crate::geom::Pose;

/// Role of a pose in the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseType {
    #[serde(alias = "home_pose")]
    Home,
    Street,
    TransitStreet,
    Hole,
}

impl PoseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoseType::Home => "home",
            PoseType::Street => "street",
            PoseType::TransitStreet => "transit_street",
            PoseType::Hole => "hole",
        }
    }
}

impl fmt::Display for PoseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" | "home_pose" => Ok(PoseType::Home),
            "street" => Ok(PoseType::Street),
            "transit_street" => Ok(PoseType::TransitStreet),
            "hole" => Ok(PoseType::Hole),
            other => Err(format!("unknown pose type {other:?}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseNode {
    pub pose: Pose,
    pub kind: PoseType,
    /// Set on the final approach pose of a drill hole.
    pub drillhole_id: Option<HoleId>,
}

/// Undirected edge `a < b` with its traversal cost.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: f64,
}

impl Edge {
    pub(crate) fn between(nodes: &[PoseNode], i: NodeId, j: NodeId) -> Self {
        let (a, b) = (i.min(j), i.max(j));
        Edge {
            a,
            b,
            weight: edge_weight(&nodes[a].pose, &nodes[b].pose),
        }
    }
}

/// Indexed poses plus undirected weighted edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseGraph {
    pub nodes: Vec<PoseNode>,
    pub edges: Vec<Edge>,
}

impl PoseGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of nodes with the given role, ascending.
    pub fn nodes_of(&self, kind: PoseType) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| (n.kind == kind).then_some(i))
            .collect()
    }

    /// Node carrying the given drill-hole id, if any.
    pub fn hole_node(&self, hole_id: HoleId) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.kind == PoseType::Hole && n.drillhole_id == Some(hole_id))
    }

    pub fn adjacency(&self) -> Vec<Vec<NodeId>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for e in &self.edges {
            adj[e.a].push(e.b);
            adj[e.b].push(e.a);
        }
        adj
    }

    /// Nodes reachable from `start` (breadth first), as a membership mask.
    pub fn reachable_from(&self, start: NodeId) -> Vec<bool> {
        let adj = self.adjacency();
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([start]);
        seen[start] = true;
        while let Some(u) = queue.pop_front() {
            for &v in &adj[u] {
                if !seen[v] {
                    seen[v] = true;
                    queue.push_back(v);
                }
            }
        }
        seen
    }

    /// Exactly one home node, and every hole node in its component.
    pub fn check_connectivity(&self) -> Result<(), PlanError> {
        let homes = self.nodes_of(PoseType::Home);
        if homes.len() != 1 {
            return Err(PlanError::HomeCount { count: homes.len() });
        }
        let reached = self.reachable_from(homes[0]);
        let stranded: Vec<HoleId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| n.kind == PoseType::Hole && !reached[*i])
            .map(|(i, n)| n.drillhole_id.unwrap_or(i as HoleId))
            .collect();
        if stranded.is_empty() {
            Ok(())
        } else {
            Err(PlanError::Disconnected { hole_ids: stranded })
        }
    }
}
