//! Shortest routes over a loaded pose graph.
//!
//! Purpose
//! - Answer "how do I drive from node A to node B" against a persisted plan,
//!   without re-running assembly.
//!
//! Why this design
//! - A [`PathFinder`] is immutable once built; [`GraphHandle`] is the only
//!   place a loaded graph is swapped, so concurrent queries see either the
//!   old or the new graph, never a mix.
//! - Edge weights use the same formula as assembly (`graph::edge_weight`),
//!   which never drops below the straight-line distance, so the Euclidean
//!   heuristic is admissible and consistent.
//! - Neighbour lists are read as directed links, exactly as persisted.

mod astar;
mod handle;

pub use handle::GraphHandle;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphLoadError, HoleId, NodeId, QueryError};
use crate::geom::Pose;
use crate::graph::{edge_weight, validate_records, PoseGraph, PoseRecord, PoseType};

/// One step of a returned route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathPose {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Key of a user-selectable node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Home,
    Hole(HoleId),
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedKey::Home => f.write_str("Home"),
            NamedKey::Hole(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedNode {
    pub key: NamedKey,
    pub id: NodeId,
    pub label: String,
}

#[derive(Clone, Debug)]
struct Node {
    pose: Pose,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Immutable graph prepared for A* queries.
#[derive(Clone, Debug, Default)]
pub struct PathFinder {
    nodes: HashMap<NodeId, Node>,
    adjacency: HashMap<NodeId, Vec<(NodeId, f64)>>,
    named: HashMap<NamedKey, NodeId>,
}

impl PathFinder {
    /// Load from persisted records; neighbour lists become directed edges.
    pub fn from_records(records: &[PoseRecord]) -> Result<Self, GraphLoadError> {
        let kinds = validate_records(records)?;
        let mut finder = PathFinder::default();
        for r in records {
            finder.nodes.insert(
                r.id,
                Node {
                    pose: r.pose(),
                    lat: r.lat,
                    lon: r.lon,
                },
            );
            if kinds[&r.id] == PoseType::Home {
                finder.named.insert(NamedKey::Home, r.id);
            }
            if let Some(hole) = r.drillhole_id {
                finder.named.insert(NamedKey::Hole(hole), r.id);
            }
        }
        for r in records {
            let from = finder.nodes[&r.id].pose;
            let out = r
                .neighbors
                .iter()
                .map(|n| (*n, edge_weight(&from, &finder.nodes[n].pose)))
                .collect();
            finder.adjacency.insert(r.id, out);
        }
        tracing::info!(
            nodes = finder.nodes.len(),
            edges = finder.adjacency.values().map(Vec::len).sum::<usize>(),
            "path graph loaded"
        );
        Ok(finder)
    }

    /// Load straight from an assembled graph (both edge directions).
    pub fn from_graph(graph: &PoseGraph) -> Self {
        let mut finder = PathFinder::default();
        for (id, n) in graph.nodes.iter().enumerate() {
            finder.nodes.insert(
                id,
                Node {
                    pose: n.pose,
                    lat: None,
                    lon: None,
                },
            );
            finder.adjacency.insert(id, Vec::new());
            match (n.kind, n.drillhole_id) {
                (PoseType::Home, _) => {
                    finder.named.insert(NamedKey::Home, id);
                }
                (_, Some(hole)) => {
                    finder.named.insert(NamedKey::Hole(hole), id);
                }
                _ => {}
            }
        }
        for e in &graph.edges {
            for (u, v) in [(e.a, e.b), (e.b, e.a)] {
                finder.adjacency.entry(u).or_default().push((v, e.weight));
            }
        }
        finder
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node id of a named node.
    pub fn named(&self, key: NamedKey) -> Option<NodeId> {
        self.named.get(&key).copied()
    }

    /// Cheapest route from `start` to `goal`; `Ok(None)` if unreachable.
    pub fn find_path(
        &self,
        start: NodeId,
        goal: NodeId,
    ) -> Result<Option<Vec<PathPose>>, QueryError> {
        Ok(self.route(start, goal)?.map(|(ids, _)| {
            ids.into_iter()
                .map(|id| {
                    let n = &self.nodes[&id];
                    PathPose {
                        id,
                        x: n.pose.x,
                        y: n.pose.y,
                        theta: n.pose.theta,
                        lat: n.lat,
                        lon: n.lon,
                    }
                })
                .collect()
        }))
    }

    /// Node ids and total weight of the cheapest route.
    pub fn route(
        &self,
        start: NodeId,
        goal: NodeId,
    ) -> Result<Option<(Vec<NodeId>, f64)>, QueryError> {
        for id in [start, goal] {
            if !self.nodes.contains_key(&id) {
                return Err(QueryError::UnknownNode(id));
            }
        }
        let target = self.nodes[&goal].pose.position();
        let found = astar::search(
            start,
            goal,
            |u| self.adjacency.get(&u).into_iter().flatten().copied(),
            |u| (self.nodes[&u].pose.position() - target).norm(),
        );
        match &found {
            Some((ids, cost)) => {
                tracing::debug!(start, goal, steps = ids.len(), cost, "route found")
            }
            None => tracing::debug!(start, goal, "no route"),
        }
        Ok(found)
    }

    /// Home first, then drill holes by ascending id.
    pub fn list_named_nodes(&self) -> Vec<NamedNode> {
        let mut keys: Vec<NamedKey> = self.named.keys().copied().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                let id = self.named[&key];
                NamedNode {
                    key,
                    id,
                    label: format!("{key} (Node {id})"),
                }
            })
            .collect()
    }
}
