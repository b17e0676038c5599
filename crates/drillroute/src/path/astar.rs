use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::error::NodeId;

/// Open-set entry; ordered by `f` reversed so `BinaryHeap` pops the cheapest.
#[derive(Clone, Copy, Debug)]
struct Open {
    id: NodeId,
    g: f64,
    f: f64,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* from `start` to `goal`: returns the node sequence and its cost.
///
/// `neighbours(u)` yields `(v, weight)`; `heuristic(u)` must not overestimate
/// the remaining cost to `goal`.
pub(super) fn search<N, I, H>(
    start: NodeId,
    goal: NodeId,
    neighbours: N,
    heuristic: H,
) -> Option<(Vec<NodeId>, f64)>
where
    N: Fn(NodeId) -> I,
    I: IntoIterator<Item = (NodeId, f64)>,
    H: Fn(NodeId) -> f64,
{
    let mut open = BinaryHeap::new();
    let mut closed = HashSet::new();
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
    let mut g_scores: HashMap<NodeId, f64> = HashMap::new();

    g_scores.insert(start, 0.0);
    open.push(Open {
        id: start,
        g: 0.0,
        f: heuristic(start),
    });

    while let Some(current) = open.pop() {
        if current.id == goal {
            return Some((reconstruct(&came_from, goal), current.g));
        }
        if !closed.insert(current.id) {
            continue;
        }
        for (next, weight) in neighbours(current.id) {
            if closed.contains(&next) {
                continue;
            }
            let g = current.g + weight;
            if g_scores.get(&next).is_some_and(|&old| old <= g) {
                continue;
            }
            g_scores.insert(next, g);
            came_from.insert(next, current.id);
            open.push(Open {
                id: next,
                g,
                f: g + heuristic(next),
            });
        }
    }
    None
}

fn reconstruct(came_from: &HashMap<NodeId, NodeId>, goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
