//! Off-thread 3D force-directed layout.
//!
//! [`Simulation`] holds the physics, [`LayoutEngine`] wraps it in the
//! command-driven state machine, [`EngineHandle`] runs an engine on a worker
//! thread and [`LayoutBridge`] is the single UI-side owner of that thread.

mod bridge;
mod config;
mod engine;
mod forces;
mod octree;
mod protocol;
mod simulation;

pub use bridge::LayoutBridge;
pub use config::LayoutConfig;
pub use engine::{EngineHandle, EngineState, LayoutEngine};
pub use protocol::{LayoutCommand, LayoutResult, PositionedNode};
pub use simulation::{Simulation, TickOutcome};
