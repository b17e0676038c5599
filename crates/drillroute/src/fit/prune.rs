use crate::geom::{angle_of, Footprint, Pose, Vec2};

/// Drop curve points whose vehicle footprint touches a repulsor.
///
/// The heading at point `i` follows the incoming segment (the outgoing one
/// for the first point). The body footprint is tested against holes and low
/// samples, the extended footprint against high samples. Curves with fewer
/// than two points are returned unchanged.
pub fn prune_colliding(curve: &[Vec2], holes: &[Vec2], low: &[Vec2], high: &[Vec2]) -> Vec<Vec2> {
    if curve.len() < 2 {
        return curve.to_vec();
    }
    let kept: Vec<Vec2> = curve
        .iter()
        .enumerate()
        .filter(|&(i, &p)| {
            let heading = if i > 0 {
                angle_of(p - curve[i - 1])
            } else {
                angle_of(curve[1] - p)
            };
            let pose = Pose::at(p, heading);
            let body = Footprint::LOW.at(&pose);
            let extended = Footprint::HIGH.at(&pose);
            !body.contains_any(holes) && !body.contains_any(low) && !extended.contains_any(high)
        })
        .map(|(_, &p)| p)
        .collect();
    tracing::debug!(before = curve.len(), after = kept.len(), "pruned colliding curve points");
    kept
}
