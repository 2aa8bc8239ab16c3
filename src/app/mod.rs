//! Desktop viewer: loads a dataset off the UI thread, then renders the
//! layout bridge's positions through an orbit camera.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use log::{error, info};

use crate::config::{AppConfig, ViewerConfig};
use crate::graph::{GraphData, load_dataset, sample_graph};
use crate::layout::LayoutBridge;

mod camera;
mod graph;
mod render_utils;
mod state;
mod story;
mod ui;

pub use camera::{OrbitCamera, Projected};
pub use state::{Connections, ExplorerState, StoryTransition};
pub use story::{STORY_SCENES, StoryScene};

/// Where the viewer gets its graph from.
#[derive(Clone, Debug)]
pub enum DataSource {
    /// The bundled ecosystem sample.
    Sample,
    File(PathBuf),
}

impl DataSource {
    fn describe(&self) -> String {
        match self {
            Self::Sample => "bundled sample".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }

    fn load(&self) -> anyhow::Result<GraphData> {
        match self {
            Self::Sample => Ok(sample_graph()),
            Self::File(path) => load_dataset(path),
        }
    }
}

type LoadResult = Result<GraphData, String>;

pub struct GraphExplorerApp {
    source: DataSource,
    config: AppConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    data: Arc<GraphData>,
    explorer: ExplorerState,
    bridge: LayoutBridge,
    camera: OrbitCamera,
    viewer: ViewerConfig,
    /// Focus target the camera was last sent towards.
    followed_focus: Option<String>,
    draw_scratch: Vec<DrawNode>,
}

/// A visible node projected for the current frame.
struct DrawNode {
    id: String,
    projected: Projected,
    radius: f32,
}

impl GraphExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: DataSource, config: AppConfig) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: DataSource) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                error!("failed to load dataset from {}: {error}", source.describe());
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: DataSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready(&self, data: GraphData) -> AppState {
        info!(
            nodes = data.nodes.len(),
            edges = data.edges.len();
            "dataset ready"
        );
        AppState::Ready(Box::new(ViewModel::new(data, &self.config)))
    }
}

impl eframe::App for GraphExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut loaded = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(data)) => loaded = Some(data),
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading knowledge graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the knowledge graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        // A reload keeps the view and restarts only the layout.
                        Ok(Ok(data)) => model.replace_data(data),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(data) = loaded {
            transition = Some(self.ready(data));
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
