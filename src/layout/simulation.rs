use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use log::{trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::LayoutConfig;
use super::forces::{
    ChargeParams, CollisionParams, Link, LinkParams, apply_centering, apply_charge,
    apply_collisions, apply_depth_anchor, apply_links,
};
use super::octree::OctNode;
use super::protocol::PositionedNode;
use crate::graph::{GraphEdge, GraphNode};

/// Simulation-internal state of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Body {
    pub(super) position: Vec3,
    pub(super) velocity: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Alpha is still above the convergence threshold.
    Active,
    /// This tick took alpha below the threshold.
    Converged,
    /// Alpha was already below the threshold before the tick.
    Settled,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec3>,
    displacements: Vec<Vec3>,
}

/// A 3D force-directed layout over a fixed node and edge set.
///
/// Each tick composes link springs, Barnes–Hut repulsion, centering, collision
/// and the importance depth anchor, then integrates velocities and cools alpha.
pub struct Simulation {
    nodes: Vec<Arc<GraphNode>>,
    bodies: Vec<Body>,
    links: Vec<Link>,
    depth_targets: Vec<f32>,
    config: LayoutConfig,
    alpha: f32,
    ticks: u64,
    scratch: Scratch,
}

impl Simulation {
    pub fn new(nodes: Vec<GraphNode>, edges: &[GraphEdge], config: LayoutConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut index_by_id: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
        let mut kept = Vec::with_capacity(nodes.len());
        let mut duplicates = 0usize;
        for node in nodes {
            if index_by_id.contains_key(&node.id) {
                duplicates += 1;
                continue;
            }
            index_by_id.insert(node.id.clone(), kept.len());
            kept.push(Arc::new(node));
        }
        if duplicates > 0 {
            warn!(duplicates; "skipped nodes with duplicate ids");
        }

        let spread = config.initial_spread.abs();
        let depth_targets = kept
            .iter()
            .map(|node| config.z_target(node.effective_importance()))
            .collect::<Vec<_>>();
        let bodies = depth_targets
            .iter()
            .map(|&z| {
                let (x, y) = if spread > 0.0 {
                    (
                        rng.random_range(-spread..spread),
                        rng.random_range(-spread..spread),
                    )
                } else {
                    (0.0, 0.0)
                };
                Body {
                    position: Vec3::new(x, y, z),
                    velocity: Vec3::ZERO,
                }
            })
            .collect::<Vec<_>>();

        let links = resolve_links(edges, &index_by_id, kept.len());

        Self {
            nodes: kept,
            bodies,
            links,
            depth_targets,
            alpha: 1.0,
            config,
            ticks: 0,
            scratch: Scratch::default(),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min
    }

    /// Raises alpha to the reheat level. Never lowers it.
    pub fn reheat(&mut self) {
        self.alpha = self.alpha.max(self.config.alpha_reheat);
    }

    /// Advances the simulation by one integration step.
    pub fn tick(&mut self) -> TickOutcome {
        let was_settled = self.is_settled();
        let alpha = self.alpha;

        apply_links(
            &mut self.bodies,
            &self.links,
            LinkParams {
                distance: self.config.link_distance,
                strength: self.config.link_strength,
            },
            alpha,
        );

        self.refresh_positions();
        if let Some(tree) = OctNode::build(&self.scratch.positions) {
            let distance_min = self.config.charge_distance_min;
            let distance_max = self.config.charge_distance_max;
            apply_charge(
                &mut self.bodies,
                &self.scratch.positions,
                &tree,
                ChargeParams {
                    strength: self.config.charge_strength,
                    distance_min_sq: distance_min * distance_min,
                    distance_max_sq: distance_max * distance_max,
                    theta_sq: self.config.theta * self.config.theta,
                },
                alpha,
            );
        }

        apply_centering(&mut self.bodies, self.config.center_strength);

        // Collision acts on current positions so overlaps are gone before integration.
        self.refresh_positions();
        if let Some(tree) = OctNode::build(&self.scratch.positions) {
            apply_collisions(
                &mut self.bodies,
                &self.scratch.positions,
                &tree,
                CollisionParams {
                    min_distance: self.config.collision_radius * 2.0,
                    strength: self.config.collision_strength,
                },
                &mut self.scratch.displacements,
            );
        }

        apply_depth_anchor(
            &mut self.bodies,
            &self.depth_targets,
            self.config.z_strength,
            alpha,
        );

        self.integrate();

        self.alpha *= 1.0 - self.config.alpha_decay;
        self.ticks += 1;
        trace!(tick = self.ticks, alpha = self.alpha; "layout tick");

        if was_settled {
            TickOutcome::Settled
        } else if self.is_settled() {
            TickOutcome::Converged
        } else {
            TickOutcome::Active
        }
    }

    /// Ticks until convergence or until `max_ticks` have run; returns the
    /// number of ticks taken.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        for tick in 0..max_ticks {
            if self.tick() != TickOutcome::Active {
                return tick + 1;
            }
        }
        max_ticks
    }

    /// Owned copy of every node with its current position and velocity.
    pub fn snapshot(&self) -> Vec<PositionedNode> {
        self.nodes
            .iter()
            .zip(&self.bodies)
            .map(|(node, body)| PositionedNode::new(Arc::clone(node), body.position, body.velocity))
            .collect()
    }

    fn refresh_positions(&mut self) {
        self.scratch.positions.clear();
        self.scratch
            .positions
            .extend(self.bodies.iter().map(|body| body.position));
    }

    fn integrate(&mut self) {
        let retain = 1.0 - self.config.velocity_decay;
        let mut reset = 0usize;
        for body in &mut self.bodies {
            let velocity = body.velocity * retain;
            let position = body.position + velocity;
            if velocity.is_finite() && position.is_finite() {
                body.velocity = velocity;
                body.position = position;
            } else {
                reset += 1;
                body.velocity = Vec3::ZERO;
                if !body.position.is_finite() {
                    body.position = Vec3::ZERO;
                }
            }
        }
        if reset > 0 {
            warn!(bodies = reset; "reset non-finite body state");
        }
    }

    #[cfg(test)]
    pub(super) fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }
}

fn resolve_links(
    edges: &[GraphEdge],
    index_by_id: &HashMap<String, usize>,
    node_count: usize,
) -> Vec<Link> {
    let mut pairs = Vec::with_capacity(edges.len());
    let mut dangling = 0usize;
    for edge in edges {
        let (Some(&source), Some(&target)) = (index_by_id.get(&edge.from), index_by_id.get(&edge.to))
        else {
            dangling += 1;
            continue;
        };
        if source == target {
            continue;
        }
        pairs.push((source, target));
    }
    if dangling > 0 {
        warn!(dangling; "dropped edges with missing endpoints");
    }

    let mut degree = vec![0u32; node_count];
    for &(source, target) in &pairs {
        degree[source] += 1;
        degree[target] += 1;
    }

    pairs
        .into_iter()
        .map(|(source, target)| {
            let source_degree = degree[source] as f32;
            let target_degree = degree[target] as f32;
            Link {
                source,
                target,
                bias: source_degree / (source_degree + target_degree),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::graph::{EdgeKind, NodeKind};

    fn node(id: &str) -> GraphNode {
        GraphNode::new(id, NodeKind::App, id)
    }

    fn edge(id: &str, from: &str, to: &str) -> GraphEdge {
        GraphEdge::new(id, from, to, EdgeKind::DependsOn)
    }

    fn seeded() -> LayoutConfig {
        LayoutConfig {
            seed: Some(7),
            tick_interval_ms: 0,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn initial_placement_follows_importance() {
        let nodes = vec![
            node("front").with_importance(1.0),
            node("back").with_importance(0.0),
            node("middle"),
        ];
        let simulation = Simulation::new(nodes, &[], seeded());
        let snapshot = simulation.snapshot();

        assert_eq!(snapshot[0].z, 50.0);
        assert_eq!(snapshot[1].z, -50.0);
        assert_eq!(snapshot[2].z, 0.0);
        for positioned in &snapshot {
            assert!((-100.0..100.0).contains(&positioned.x));
            assert!((-100.0..100.0).contains(&positioned.y));
        }
    }

    #[test]
    fn same_seed_gives_same_start() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let first = Simulation::new(nodes.clone(), &[], seeded()).snapshot();
        let second = Simulation::new(nodes, &[], seeded()).snapshot();
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let nodes = vec![
            node("a"),
            GraphNode::new("a", NodeKind::Issue, "impostor"),
            node("b"),
        ];
        let simulation = Simulation::new(nodes, &[], seeded());
        let snapshot = simulation.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].node.kind, NodeKind::App);
    }

    #[test]
    fn dangling_and_self_loop_edges_are_dropped() {
        let edges = vec![
            edge("e1", "a", "b"),
            edge("e2", "a", "ghost"),
            edge("e3", "ghost", "b"),
            edge("e4", "b", "b"),
        ];
        let mut simulation = Simulation::new(vec![node("a"), node("b")], &edges, seeded());
        assert_eq!(simulation.link_count(), 1);

        simulation.settle(1_000);
        assert!(simulation.snapshot().iter().all(|p| p.position().is_finite()));
    }

    #[test]
    fn link_bias_favours_moving_the_lighter_end() {
        let edges = vec![edge("e1", "hub", "a"), edge("e2", "hub", "b"), edge("e3", "hub", "c")];
        let nodes = vec![node("hub"), node("a"), node("b"), node("c")];
        let simulation = Simulation::new(nodes, &edges, seeded());
        for link in &simulation.links {
            assert!((link.bias - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn alpha_decays_geometrically_and_converges() {
        let mut simulation = Simulation::new(vec![node("a"), node("b")], &[], seeded());
        let mut previous = simulation.alpha();
        let mut converged_at = None;
        for tick in 1..=1_000 {
            let outcome = simulation.tick();
            assert!(simulation.alpha() <= previous);
            assert!((simulation.alpha() - previous * 0.98).abs() < 1e-6);
            previous = simulation.alpha();
            if outcome == TickOutcome::Converged {
                converged_at = Some(tick);
                break;
            }
        }

        // ln(0.001) / ln(0.98) rounds up to 342.
        assert_eq!(converged_at, Some(342));
        assert_eq!(simulation.tick(), TickOutcome::Settled);
    }

    #[test]
    fn reheat_never_lowers_alpha() {
        let mut simulation = Simulation::new(vec![node("a")], &[], seeded());
        simulation.reheat();
        assert_eq!(simulation.alpha(), 1.0);

        simulation.settle(10_000);
        assert!(simulation.is_settled());
        simulation.reheat();
        assert_eq!(simulation.alpha(), 0.3);
        assert!(!simulation.is_settled());
    }

    #[test]
    fn collision_resolves_current_overlap_before_integration() {
        let config = LayoutConfig {
            charge_strength: 0.0,
            center_strength: 0.0,
            ..seeded()
        };
        let mut simulation = Simulation::new(vec![node("a"), node("b")], &[], config);
        {
            let bodies = simulation.bodies_mut();
            bodies[0].position = Vec3::ZERO;
            bodies[0].velocity = Vec3::new(-20.0, 0.0, 0.0);
            bodies[1].position = Vec3::new(10.0, 0.0, 0.0);
            bodies[1].velocity = Vec3::new(20.0, 0.0, 0.0);
        }
        simulation.tick();

        // Overlap of 20 split evenly, then each body moves by 0.7 * 20.
        let snapshot = simulation.snapshot();
        assert!((snapshot[0].x + 24.0).abs() < 1e-3);
        assert!((snapshot[1].x - 34.0).abs() < 1e-3);
    }

    #[test]
    fn non_finite_state_is_reset() {
        let mut simulation = Simulation::new(vec![node("a"), node("b")], &[], seeded());
        simulation.bodies_mut()[0].velocity = Vec3::new(f32::INFINITY, 0.0, 0.0);
        simulation.tick();
        assert!(simulation.snapshot().iter().all(|p| p.position().is_finite()));
    }

    #[test]
    fn empty_and_single_node_graphs_tick() {
        let mut empty = Simulation::new(Vec::new(), &[], seeded());
        assert_eq!(empty.tick(), TickOutcome::Active);
        assert!(empty.snapshot().is_empty());

        let mut single = Simulation::new(vec![node("solo").with_importance(1.0)], &[], seeded());
        single.settle(10_000);
        let solo = &single.snapshot()[0];
        assert!(solo.position().is_finite());
    }

    proptest! {
        #[test]
        fn arbitrary_edges_never_fault(
            links in prop::collection::vec((0usize..12, 0usize..12), 0..40),
            importances in prop::collection::vec(prop::option::of(0.0f32..=1.0), 8),
        ) {
            let nodes = importances
                .iter()
                .enumerate()
                .map(|(index, importance)| {
                    let mut node = node(&format!("n{index}"));
                    node.importance = *importance;
                    node
                })
                .collect::<Vec<_>>();
            // Indices 8..12 reference nodes that do not exist.
            let edges = links
                .iter()
                .enumerate()
                .map(|(index, (from, to))| edge(&format!("e{index}"), &format!("n{from}"), &format!("n{to}")))
                .collect::<Vec<_>>();

            let mut simulation = Simulation::new(nodes, &edges, seeded());
            for _ in 0..60 {
                simulation.tick();
            }
            for positioned in simulation.snapshot() {
                prop_assert!(positioned.position().is_finite());
            }
        }
    }
}
