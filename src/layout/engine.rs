use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, info};

use super::config::LayoutConfig;
use super::protocol::{LayoutCommand, LayoutResult};
use super::simulation::{Simulation, TickOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Waiting for `Init`.
    Uninitialized,
    /// Ticking with alpha at or above the reheat level.
    Running,
    /// Ticking with alpha between the convergence threshold and the reheat level.
    Cooling,
    /// Converged; idle until reheated.
    Settled,
    /// Terminal. Every command is ignored.
    Stopped,
}

/// Command-driven state machine around a [`Simulation`].
///
/// Independent of threading so it can be driven directly; [`EngineHandle`]
/// runs one on a worker thread.
pub struct LayoutEngine {
    config: LayoutConfig,
    simulation: Option<Simulation>,
    settled: bool,
    stopped: bool,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            simulation: None,
            settled: false,
            stopped: false,
        }
    }

    pub fn state(&self) -> EngineState {
        if self.stopped {
            return EngineState::Stopped;
        }
        match &self.simulation {
            None => EngineState::Uninitialized,
            Some(_) if self.settled => EngineState::Settled,
            Some(simulation) if simulation.alpha() >= self.config.alpha_reheat => {
                EngineState::Running
            }
            Some(_) => EngineState::Cooling,
        }
    }

    /// Whether the engine wants autonomous ticks.
    pub fn is_ticking(&self) -> bool {
        matches!(self.state(), EngineState::Running | EngineState::Cooling)
    }

    pub fn alpha(&self) -> Option<f32> {
        self.simulation.as_ref().map(Simulation::alpha)
    }

    /// Applies one command and returns whatever it emits. Commands that are
    /// invalid in the current state are ignored.
    pub fn handle(&mut self, command: LayoutCommand) -> Vec<LayoutResult> {
        if self.stopped {
            return Vec::new();
        }

        match command {
            LayoutCommand::Init { nodes, edges } => {
                if self.simulation.is_some() {
                    debug!("ignoring init for an initialised engine");
                    return Vec::new();
                }
                let simulation = Simulation::new(nodes, &edges, self.config.clone());
                info!(
                    nodes = simulation.node_count(),
                    links = simulation.link_count();
                    "layout engine started"
                );
                self.simulation = Some(simulation);
                self.settled = false;
                Vec::new()
            }
            LayoutCommand::Update => {
                if let Some(simulation) = self.simulation.as_mut() {
                    simulation.reheat();
                    self.settled = false;
                    debug!(alpha = simulation.alpha(); "layout reheated");
                }
                Vec::new()
            }
            LayoutCommand::Tick => {
                if self.settled {
                    // A manual step while settled reports positions but does
                    // not restart the autonomous loop.
                    self.simulation
                        .as_mut()
                        .map(|simulation| {
                            simulation.tick();
                            vec![LayoutResult::Positions {
                                nodes: simulation.snapshot(),
                                alpha: simulation.alpha(),
                            }]
                        })
                        .unwrap_or_default()
                } else {
                    self.step()
                }
            }
            LayoutCommand::Stop => {
                self.stopped = true;
                self.simulation = None;
                info!("layout engine stopped");
                Vec::new()
            }
        }
    }

    /// Runs one autonomous tick: a `Positions` result, followed by `Done` on
    /// the tick that converges.
    pub fn step(&mut self) -> Vec<LayoutResult> {
        if self.stopped || self.settled {
            return Vec::new();
        }
        let Some(simulation) = self.simulation.as_mut() else {
            return Vec::new();
        };

        let outcome = simulation.tick();
        let nodes = simulation.snapshot();
        let alpha = simulation.alpha();

        if outcome == TickOutcome::Active {
            return vec![LayoutResult::Positions { nodes, alpha }];
        }

        self.settled = true;
        info!(ticks = simulation.ticks(); "layout converged");
        vec![
            LayoutResult::Positions {
                nodes: nodes.clone(),
                alpha,
            },
            LayoutResult::Done { nodes },
        ]
    }
}

/// Owner side of an engine running on its own thread.
///
/// Dropping the handle stops the engine and discards any results still queued.
pub struct EngineHandle {
    commands: Sender<LayoutCommand>,
    results: Receiver<LayoutResult>,
    thread: Option<JoinHandle<()>>,
    stop_sent: bool,
}

impl EngineHandle {
    pub fn spawn(config: LayoutConfig) -> io::Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("layout-engine".to_owned())
            .spawn(move || run_engine(config, command_rx, result_tx))?;

        Ok(Self {
            commands: command_tx,
            results: result_rx,
            thread: Some(thread),
            stop_sent: false,
        })
    }

    /// Queues a command. A command sent to an engine that has already exited
    /// is silently dropped.
    pub fn send(&mut self, command: LayoutCommand) {
        if self.stop_sent {
            return;
        }
        if matches!(command, LayoutCommand::Stop) {
            self.stop_sent = true;
        }
        let _ = self.commands.send(command);
    }

    pub fn stop(&mut self) {
        self.send(LayoutCommand::Stop);
    }

    pub fn try_recv(&self) -> Result<LayoutResult, TryRecvError> {
        self.results.try_recv()
    }

    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<LayoutResult, RecvTimeoutError> {
        self.results.recv_timeout(timeout)
    }

    /// Stops the engine and waits for its thread, returning every result it
    /// produced before stopping.
    pub fn join(mut self) -> Vec<LayoutResult> {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        self.results.try_iter().collect()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_engine(
    config: LayoutConfig,
    commands: Receiver<LayoutCommand>,
    results: Sender<LayoutResult>,
) {
    let interval = config.tick_interval();
    let mut engine = LayoutEngine::new(config);
    let mut next_tick = Instant::now();

    loop {
        let command = if engine.is_ticking() {
            let wait = next_tick.saturating_duration_since(Instant::now());
            match commands.recv_timeout(wait) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        let emitted = match command {
            Some(command) => {
                let emitted = engine.handle(command);
                if engine.state() == EngineState::Stopped {
                    break;
                }
                emitted
            }
            None => {
                next_tick = Instant::now() + interval;
                engine.step()
            }
        };

        if emitted
            .into_iter()
            .any(|result| results.send(result).is_err())
        {
            debug!("layout consumer went away");
            break;
        }
    }
}
