use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::TryRecvError;

use log::{debug, error, warn};

use super::config::LayoutConfig;
use super::engine::EngineHandle;
use super::protocol::{LayoutCommand, LayoutResult, PositionedNode};
use crate::graph::GraphData;

/// UI-side owner of the layout engine.
///
/// Holds the latest position mapping, the last reported alpha and whether the
/// engine is still working. At most one engine is alive per bridge; replacing
/// the dataset tears the old one down first, and anything it had queued is
/// discarded with it.
pub struct LayoutBridge {
    data: Arc<GraphData>,
    config: LayoutConfig,
    engine: Option<EngineHandle>,
    positions: HashMap<String, PositionedNode>,
    alpha: f32,
    busy: bool,
}

impl LayoutBridge {
    pub fn new(data: Arc<GraphData>, config: LayoutConfig) -> Self {
        let mut bridge = Self {
            data,
            config,
            engine: None,
            positions: HashMap::new(),
            alpha: 1.0,
            busy: true,
        };
        bridge.start();
        bridge
    }

    pub fn data(&self) -> &Arc<GraphData> {
        &self.data
    }

    /// Swaps in a new dataset. The same `Arc` is a no-op; anything else
    /// restarts the engine from scratch.
    pub fn set_dataset(&mut self, data: Arc<GraphData>) {
        if Arc::ptr_eq(&self.data, &data) {
            return;
        }
        self.shutdown();
        self.data = data;
        self.positions.clear();
        self.alpha = 1.0;
        self.busy = true;
        self.start();
    }

    fn start(&mut self) {
        let mut engine = match EngineHandle::spawn(self.config.clone()) {
            Ok(engine) => engine,
            Err(err) => {
                error!("failed to spawn layout engine: {err}");
                self.busy = false;
                return;
            }
        };
        engine.send(LayoutCommand::Init {
            nodes: self.data.nodes.clone(),
            edges: self.data.edges.clone(),
        });
        debug!(nodes = self.data.nodes.len(); "layout bridge started engine");
        self.engine = Some(engine);
    }

    /// Drains every result the engine has produced so far, in order.
    /// Returns true when at least one result was applied.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        loop {
            let Some(engine) = self.engine.as_ref() else {
                return applied;
            };
            match engine.try_recv() {
                Ok(result) => {
                    self.apply(result);
                    applied = true;
                }
                Err(TryRecvError::Empty) => return applied,
                Err(TryRecvError::Disconnected) => {
                    warn!("layout engine exited unexpectedly");
                    self.engine = None;
                    self.busy = false;
                    return applied;
                }
            }
        }
    }

    fn apply(&mut self, result: LayoutResult) {
        match result {
            LayoutResult::Positions { nodes, alpha } => {
                self.positions = index_by_id(nodes);
                self.alpha = alpha;
                // A manual tick on a settled engine reports positions without
                // waking it up.
                if alpha >= self.config.alpha_min {
                    self.busy = true;
                }
            }
            LayoutResult::Done { nodes } => {
                if !nodes.is_empty() || self.positions.is_empty() {
                    self.positions = index_by_id(nodes);
                }
                self.busy = false;
            }
        }
    }

    /// Asks the engine to warm up again, e.g. after the visible set changed.
    pub fn reheat(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.send(LayoutCommand::Update);
            self.busy = true;
        }
    }

    /// Requests one manual integration step.
    pub fn tick(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.send(LayoutCommand::Tick);
        }
    }

    pub fn positions(&self) -> &HashMap<String, PositionedNode> {
        &self.positions
    }

    pub fn position(&self, id: &str) -> Option<&PositionedNode> {
        self.positions.get(id)
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Fraction of the cooling schedule completed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (1.0 - self.alpha).clamp(0.0, 1.0)
    }

    /// Stops the engine. Results still in flight are dropped along with the
    /// receiver.
    pub fn shutdown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
            debug!("layout bridge tore down engine");
        }
        self.busy = false;
    }
}

impl Drop for LayoutBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn index_by_id(nodes: Vec<PositionedNode>) -> HashMap<String, PositionedNode> {
    nodes
        .into_iter()
        .map(|positioned| (positioned.id().to_owned(), positioned))
        .collect()
}
