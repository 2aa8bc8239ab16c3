use std::f32::consts::TAU;

use glam::Vec3;

use super::octree::OctNode;
use super::simulation::Body;

/// Separations below this are treated as coincident.
const COINCIDENT_EPSILON: f32 = 1e-4;

/// Resolved edge between two body indices.
#[derive(Clone, Copy, Debug)]
pub(super) struct Link {
    pub(super) source: usize,
    pub(super) target: usize,
    /// Share of the correction taken by the target.
    pub(super) bias: f32,
}

#[derive(Clone, Copy)]
pub(super) struct LinkParams {
    pub(super) distance: f32,
    pub(super) strength: f32,
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) distance_min_sq: f32,
    pub(super) distance_max_sq: f32,
    pub(super) theta_sq: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) min_distance: f32,
    pub(super) strength: f32,
}

/// Deterministic unit vector from body `a` towards body `b`, used when the two
/// are coincident. Swapping the arguments flips the direction.
pub(super) fn fallback_direction(a: usize, b: usize) -> Vec3 {
    let (low, high, sign) = if a <= b {
        (a as f32, b as f32, 1.0)
    } else {
        (b as f32, a as f32, -1.0)
    };

    let turn = (low * 0.618_034 + high * 0.414_214) * TAU;
    let tilt = ((low * 0.381_966 + high * 0.732_051).fract() * 2.0) - 1.0;
    let planar = (1.0 - tilt * tilt).max(0.0).sqrt();
    Vec3::new(turn.cos() * planar, turn.sin() * planar, tilt) * sign
}

/// Springs every link towards its rest length, acting on predicted positions.
pub(super) fn apply_links(bodies: &mut [Body], links: &[Link], params: LinkParams, alpha: f32) {
    for link in links {
        let source = bodies[link.source];
        let target = bodies[link.target];

        let mut delta = (target.position + target.velocity) - (source.position + source.velocity);
        let mut length = delta.length();
        if length < COINCIDENT_EPSILON {
            delta = fallback_direction(link.source, link.target) * COINCIDENT_EPSILON;
            length = COINCIDENT_EPSILON;
        }

        let correction = delta * ((length - params.distance) / length * alpha * params.strength);
        bodies[link.target].velocity -= correction * link.bias;
        bodies[link.source].velocity += correction * (1.0 - link.bias);
    }
}

/// Many-body repulsion using the Barnes–Hut approximation over `positions`.
pub(super) fn apply_charge(
    bodies: &mut [Body],
    positions: &[Vec3],
    tree: &OctNode,
    params: ChargeParams,
    alpha: f32,
) {
    if params.strength == 0.0 {
        return;
    }

    for (index, body) in bodies.iter_mut().enumerate() {
        let mut impulse = Vec3::ZERO;
        accumulate_charge_for_body(tree, index, positions, params, &mut impulse);
        body.velocity += impulse * alpha;
    }
}

fn charge_between(delta: Vec3, distance_sq: f32, weight: f32, params: ChargeParams) -> Vec3 {
    let mut distance_sq = distance_sq;
    if distance_sq < params.distance_min_sq {
        distance_sq = (params.distance_min_sq * distance_sq).sqrt();
    }
    delta * (params.strength * weight / distance_sq)
}

fn accumulate_charge_for_body(
    node: &OctNode,
    index: usize,
    positions: &[Vec3],
    params: ChargeParams,
    impulse: &mut Vec3,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];
    if node.bounds.distance_sq_to_point(point) >= params.distance_max_sq {
        return;
    }

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }

            let mut delta = positions[other] - point;
            let mut distance_sq = delta.length_squared();
            if distance_sq >= params.distance_max_sq {
                continue;
            }
            if distance_sq < COINCIDENT_EPSILON * COINCIDENT_EPSILON {
                delta = fallback_direction(index, other) * params.distance_min_sq.sqrt();
                distance_sq = params.distance_min_sq;
            }
            *impulse += charge_between(delta, distance_sq, 1.0, params);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance_sq = delta.length_squared();
    let side = node.bounds.side_length();
    let can_approximate = !node.bounds.contains(point)
        && side * side < params.theta_sq * distance_sq
        && distance_sq < params.distance_max_sq;

    if can_approximate {
        *impulse += charge_between(delta, distance_sq, node.mass, params);
        return;
    }

    for child in node.children() {
        accumulate_charge_for_body(child, index, positions, params, impulse);
    }
}

/// Translates every body so the centroid moves towards the origin.
pub(super) fn apply_centering(bodies: &mut [Body], strength: f32) {
    if bodies.is_empty() || strength == 0.0 {
        return;
    }

    let centroid = bodies.iter().map(|body| body.position).sum::<Vec3>() / bodies.len() as f32;
    if !centroid.is_finite() {
        return;
    }

    let shift = centroid * strength;
    for body in bodies {
        body.position -= shift;
    }
}

/// Pushes overlapping bodies apart by displacing their positions directly.
pub(super) fn apply_collisions(
    bodies: &mut [Body],
    positions: &[Vec3],
    tree: &OctNode,
    params: CollisionParams,
    displacements: &mut Vec<Vec3>,
) {
    if params.min_distance <= 0.0 || params.strength == 0.0 {
        return;
    }

    displacements.clear();
    displacements.resize(bodies.len(), Vec3::ZERO);
    accumulate_collision_pairs(tree, tree, true, positions, params, displacements);

    for (body, displacement) in bodies.iter_mut().zip(displacements.iter()) {
        body.position += *displacement;
    }
}

fn resolve_overlap(
    from: usize,
    to: usize,
    positions: &[Vec3],
    params: CollisionParams,
    displacements: &mut [Vec3],
) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    if distance >= params.min_distance {
        return;
    }

    let direction = if distance > COINCIDENT_EPSILON {
        delta / distance
    } else {
        fallback_direction(to, from)
    };

    let push = direction * ((params.min_distance - distance) * params.strength * 0.5);
    displacements[from] += push;
    displacements[to] -= push;
}

fn accumulate_collision_pairs(
    node_a: &OctNode,
    node_b: &OctNode,
    same_node: bool,
    positions: &[Vec3],
    params: CollisionParams,
    displacements: &mut [Vec3],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.min_distance * params.min_distance {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_overlap(from, to, positions, params, displacements);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_overlap(from, to, positions, params, displacements);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (first, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, positions, params, displacements);
            for child_b in &children[first + 1..] {
                accumulate_collision_pairs(
                    child_a,
                    child_b,
                    false,
                    positions,
                    params,
                    displacements,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(child, node_b, false, positions, params, displacements);
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(node_a, child, false, positions, params, displacements);
        }
    }
}

/// Pulls each body's z towards its importance-derived depth.
pub(super) fn apply_depth_anchor(bodies: &mut [Body], targets: &[f32], strength: f32, alpha: f32) {
    for (body, &target) in bodies.iter_mut().zip(targets) {
        body.velocity.z += (target - body.position.z) * strength * alpha;
    }
}
