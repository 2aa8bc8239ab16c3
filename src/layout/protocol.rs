//! Messages exchanged between the layout bridge and the engine thread.

use std::sync::Arc;

use glam::Vec3;

use crate::graph::{GraphEdge, GraphNode};

/// A node together with its simulated position and velocity.
///
/// Only the engine produces these; the canonical [`GraphNode`] never carries
/// coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedNode {
    pub node: Arc<GraphNode>,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: Option<f32>,
    pub vy: Option<f32>,
    pub vz: Option<f32>,
}

impl PositionedNode {
    /// Builds a snapshot entry, replacing non-finite components so that they
    /// never reach a consumer.
    pub fn new(node: Arc<GraphNode>, position: Vec3, velocity: Vec3) -> Self {
        let finite_or_zero = |value: f32| if value.is_finite() { value } else { 0.0 };
        let finite = |value: f32| value.is_finite().then_some(value);

        Self {
            node,
            x: finite_or_zero(position.x),
            y: finite_or_zero(position.y),
            z: finite_or_zero(position.z),
            vx: finite(velocity.x),
            vy: finite(velocity.y),
            vz: finite(velocity.z),
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn velocity(&self) -> Option<Vec3> {
        Some(Vec3::new(self.vx?, self.vy?, self.vz?))
    }
}

/// Bridge → engine.
#[derive(Clone, Debug)]
pub enum LayoutCommand {
    /// Supplies the node and edge set; only honoured by an uninitialised engine.
    Init {
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
    },
    /// Reheat: raise alpha and resume autonomous ticking.
    Update,
    /// Run exactly one integration step and report it.
    Tick,
    /// Halt for good. Idempotent.
    Stop,
}

/// Engine → bridge.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutResult {
    /// One tick's output.
    Positions {
        nodes: Vec<PositionedNode>,
        alpha: f32,
    },
    /// Autonomous convergence reached.
    Done { nodes: Vec<PositionedNode> },
}

impl LayoutResult {
    pub fn nodes(&self) -> &[PositionedNode] {
        match self {
            Self::Positions { nodes, .. } | Self::Done { nodes } => nodes,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}
