use std::collections::BTreeSet;

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::candidate::{self, Candidate, CandidateCfg};
use crate::error::{HoleId, NodeId, PlanError};
use crate::geom::{BlockedGeometry, Pose, Vec2};
use crate::progress::Progress;

use super::{should_connect, Edge, EdgeCfg, PoseGraph, PoseNode, PoseType};

/// A drill hole to reach, with the index of its closest street (if any).
#[derive(Clone, Debug, PartialEq)]
pub struct HoleTarget {
    pub id: HoleId,
    pub position: Vec2,
    pub street: Option<usize>,
}

/// Everything the assembler links together.
#[derive(Clone, Copy, Debug)]
pub struct AssemblyInput<'a> {
    pub home: Pose,
    /// Sampled poses per street, in street order.
    pub street_poses: &'a [Vec<Pose>],
    /// Sampled poses per transit street; pass an empty slice to leave them out.
    pub transit_poses: &'a [Vec<Pose>],
    pub holes: &'a [HoleTarget],
    pub blocked: &'a BlockedGeometry,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssemblyCfg {
    pub turning_radius: f64,
    /// Distance from the hole at which the approach manoeuvre stops.
    pub hole_clearance: f64,
    /// Radius of the blocked disk around every hole.
    pub obstacle_buffer: f64,
    /// Candidates clearer than this compete on length instead of clearance.
    pub preferred_clearance: f64,
    pub edge: EdgeCfg,
    pub candidate: CandidateCfg,
    /// Prune pairs with an R-tree radius query before the edge test.
    pub use_spatial_index: bool,
}

impl Default for AssemblyCfg {
    fn default() -> Self {
        Self {
            turning_radius: 3.0,
            hole_clearance: 2.5 + 1.3,
            obstacle_buffer: 0.75,
            preferred_clearance: 2.0,
            edge: EdgeCfg::default(),
            candidate: CandidateCfg::default(),
            use_spatial_index: true,
        }
    }
}

/// Best approach of one hole: the candidate and the street pose it starts from.
pub(super) struct Approach {
    pub(super) candidate: Candidate,
    pub(super) from: usize,
}

/// Keep the clearest candidate, unless some candidate is clearer than
/// `preferred_clearance`, in which case the shortest of those wins. Ties keep
/// the earlier candidate.
pub(super) fn rank_approaches(
    found: impl IntoIterator<Item = (usize, Candidate)>,
    preferred_clearance: f64,
) -> Option<Approach> {
    let mut clearest: Option<Approach> = None;
    let mut shortest: Option<Approach> = None;
    for (from, c) in found {
        let best_clearance = clearest.as_ref().map_or(0.0, |a| a.candidate.clearance);
        if c.clearance > preferred_clearance
            && shortest.as_ref().map_or(true, |a| c.length < a.candidate.length)
        {
            shortest = Some(Approach {
                candidate: c.clone(),
                from,
            });
        }
        if c.clearance > best_clearance {
            clearest = Some(Approach { candidate: c, from });
        }
    }
    shortest.or(clearest)
}

fn best_approach(
    street: &[Pose],
    hole: &HoleTarget,
    blocked: &BlockedGeometry,
    cfg: &AssemblyCfg,
) -> Option<Approach> {
    let own = blocked.without_disks_within(hole.position, cfg.obstacle_buffer + 0.01);
    let found = street.iter().enumerate().filter_map(|(idx, pose)| {
        candidate::generate(
            pose,
            hole.position,
            &own,
            cfg.turning_radius,
            cfg.hole_clearance,
            &cfg.candidate,
        )
        .map(|c| (idx, c))
    });
    rank_approaches(found, cfg.preferred_clearance)
}

/// Node pairs `(j, i)` with `j < i` that may pass the edge test.
fn candidate_pairs(nodes: &[PoseNode], max_separation: f64, use_index: bool) -> Vec<Vec<NodeId>> {
    if !use_index {
        return (0..nodes.len()).map(|i| (0..i).collect()).collect();
    }
    let tree = RTree::bulk_load(
        nodes
            .iter()
            .enumerate()
            .map(|(i, n)| GeomWithData::new([n.pose.x, n.pose.y], i))
            .collect(),
    );
    // Slightly inflated so rounding never drops a pair the edge test accepts.
    let r2 = max_separation * max_separation * (1.0 + 1e-9) + 1e-12;
    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let mut near: Vec<NodeId> = tree
                .locate_within_distance([n.pose.x, n.pose.y], r2)
                .map(|g| g.data)
                .filter(|&j| j < i)
                .collect();
            near.sort_unstable();
            near
        })
        .collect()
}

/// Build the pose graph: home, street poses, transit poses, then each hole's
/// approach (intermediate poses typed `Street`, the final one `Hole`).
///
/// Each approach is linked to the street pose it starts from and chained
/// internally; every other edge comes from [`should_connect`]. Fails if a hole
/// has no feasible approach or the result leaves a hole cut off from home.
pub fn assemble(
    input: &AssemblyInput<'_>,
    cfg: &AssemblyCfg,
    progress: &Progress<'_>,
) -> Result<PoseGraph, PlanError> {
    let mut nodes = vec![PoseNode {
        pose: input.home,
        kind: PoseType::Home,
        drillhole_id: None,
    }];
    let mut street_offsets = Vec::with_capacity(input.street_poses.len());
    for poses in input.street_poses {
        street_offsets.push(nodes.len());
        nodes.extend(poses.iter().map(|&pose| PoseNode {
            pose,
            kind: PoseType::Street,
            drillhole_id: None,
        }));
    }
    for poses in input.transit_poses {
        nodes.extend(poses.iter().map(|&pose| PoseNode {
            pose,
            kind: PoseType::TransitStreet,
            drillhole_id: None,
        }));
    }
    tracing::debug!(nodes = nodes.len(), "street and transit poses collected");

    let mut pairs: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
    let n_holes = input.holes.len();
    for (k, hole) in input.holes.iter().enumerate() {
        let approach = hole
            .street
            .and_then(|s| Some((s, input.street_poses.get(s)?)))
            .and_then(|(s, street)| {
                best_approach(street, hole, input.blocked, cfg)
                    .map(|a| (street_offsets[s] + a.from, a))
            });
        let Some((source, approach)) = approach else {
            tracing::warn!(hole_id = hole.id, street = ?hole.street, "no feasible approach");
            return Err(PlanError::UnreachableHole { hole_id: hole.id });
        };
        let first = nodes.len();
        let last = approach.candidate.poses.len() - 1;
        nodes.extend(approach.candidate.poses.iter().enumerate().map(|(i, &pose)| {
            if i == last {
                PoseNode {
                    pose,
                    kind: PoseType::Hole,
                    drillhole_id: Some(hole.id),
                }
            } else {
                PoseNode {
                    pose,
                    kind: PoseType::Street,
                    drillhole_id: None,
                }
            }
        }));
        pairs.insert((source.min(first), source.max(first)));
        for i in first + 1..nodes.len() {
            pairs.insert((i - 1, i));
        }
        tracing::debug!(
            hole_id = hole.id,
            clearance = approach.candidate.clearance,
            length = approach.candidate.length,
            poses = approach.candidate.poses.len(),
            "hole approach selected"
        );
        progress.report_span(10.0, 30.0, k + 1, n_holes);
    }
    progress.report(30.0);

    let forced = pairs.len();
    let near = candidate_pairs(&nodes, cfg.edge.max_separation, cfg.use_spatial_index);
    let total = nodes.len();
    for (i, js) in near.iter().enumerate() {
        for &j in js {
            let (a, b) = (&nodes[i], &nodes[j]);
            if should_connect(&a.pose, &b.pose, a.kind, b.kind, input.blocked, &cfg.edge) {
                pairs.insert((j, i));
            }
        }
        // Row i holds i pairs, so work done grows quadratically.
        progress.report_span(30.0, 90.0, (i + 1) * (i + 1), total * total);
    }

    let mut graph = PoseGraph {
        nodes,
        edges: Vec::with_capacity(pairs.len()),
    };
    graph.edges = pairs
        .into_iter()
        .map(|(a, b)| Edge::between(&graph.nodes, a, b))
        .collect();
    progress.report(95.0);
    tracing::info!(
        nodes = graph.len(),
        edges = graph.edges.len(),
        forced,
        "pose graph assembled"
    );

    graph.check_connectivity()?;
    Ok(graph)
}
