//! Interactive 3D knowledge-graph explorer.
//!
//! The layout runs on its own thread behind [`layout::LayoutBridge`]; the
//! `eframe` viewer in [`app`] only ever reads the bridge's latest snapshot.

pub mod app;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod util;
