use std::sync::Arc;

use eframe::egui::{self, Align, Context, Layout};
use log::debug;

use crate::config::AppConfig;
use crate::graph::GraphData;
use crate::layout::LayoutBridge;

use super::super::{DataSource, ExplorerState, OrbitCamera, StoryTransition, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(data: GraphData, config: &AppConfig) -> Self {
        let data = Arc::new(data);
        Self {
            bridge: LayoutBridge::new(Arc::clone(&data), config.layout.clone()),
            data,
            explorer: ExplorerState::default(),
            camera: OrbitCamera::default(),
            viewer: config.viewer.clone(),
            followed_focus: None,
            draw_scratch: Vec::new(),
        }
    }

    /// Swaps in a freshly loaded dataset, keeping filters and camera.
    pub(in crate::app) fn replace_data(&mut self, data: GraphData) {
        self.data = Arc::new(data);
        self.bridge.set_dataset(Arc::clone(&self.data));
        self.explorer.select(None);
        self.explorer.hover(None);
        self.explorer.set_focus(None);
        self.followed_focus = None;
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &DataSource,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.bridge.poll() {
            ctx.request_repaint();
        }
        self.handle_story_keys(ctx);
        self.follow_focus();

        let dt = ctx.input(|input| input.stable_dt).clamp(0.0, 0.1);
        self.camera.animate(dt);
        self.explorer.set_zoom(self.camera.zoom_level());

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("brain-graph");
                    ui.separator();
                    ui.label(format!("source: {}", source.describe()));
                    ui.label(format!("nodes: {}", self.data.nodes.len()));
                    ui.label(format!("edges: {}", self.data.edges.len()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Reheat layout").clicked() {
                        self.bridge.reheat();
                    }
                    if ui
                        .add_enabled(!self.bridge.is_busy(), egui::Button::new("Step layout"))
                        .clicked()
                    {
                        self.bridge.tick();
                    }
                    if ui.button("Reset camera").clicked() {
                        self.camera.reset();
                        self.explorer.set_focus(None);
                        self.followed_focus = None;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.layout_status_text());
                    });
                });
            });

        egui::SidePanel::left("filters")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_filters(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_graph(ui);
                self.draw_loading_overlay(ui);
            });

        self.draw_story_overlay(ctx);

        if self.bridge.is_busy() || self.camera.is_animating() {
            ctx.request_repaint();
        }
    }

    fn layout_status_text(&self) -> String {
        if self.bridge.is_busy() {
            format!("layout: cooling (alpha {:.3})", self.bridge.alpha())
        } else {
            "layout: settled".to_owned()
        }
    }

    /// Sends the camera towards the focus node once it has a position.
    fn follow_focus(&mut self) {
        let focus = self.explorer.focus();
        if focus == self.followed_focus.as_deref() {
            return;
        }
        let Some(focus) = focus else {
            self.followed_focus = None;
            return;
        };
        if let Some(positioned) = self.bridge.position(focus) {
            self.camera.focus_on(positioned.position());
            self.followed_focus = Some(focus.to_owned());
        }
    }

    pub(in crate::app) fn focus_node(&mut self, id: &str) {
        self.explorer.select(Some(id.to_owned()));
        self.explorer.set_focus(Some(id.to_owned()));
        self.followed_focus = None;
        self.bridge.reheat();
    }

    /// Applies a filter change made through the panels.
    pub(in crate::app) fn filters_changed(&mut self) {
        if self.viewer.reheat_on_filter_change {
            debug!("visible kinds changed; reheating layout");
            self.bridge.reheat();
        }
    }

    pub(in crate::app) fn story_moved(&mut self, transition: StoryTransition) {
        if transition == StoryTransition::Moved {
            self.apply_story_scene();
        }
    }

    pub(in crate::app) fn apply_story_scene(&mut self) {
        let kinds_before = self.explorer.visible_kinds().clone();
        let refocused = self.explorer.apply_current_scene();
        if refocused {
            self.followed_focus = None;
            self.bridge.reheat();
        } else if *self.explorer.visible_kinds() != kinds_before {
            self.filters_changed();
        }
    }
}
