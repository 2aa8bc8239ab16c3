use eframe::egui::{self, Align2, Color32, Context, Key, RichText, Ui, vec2};

use super::super::ViewModel;
use super::super::story::{STORY_SCENES, is_last_step};

impl ViewModel {
    /// Progress card over the canvas while the layout is still moving.
    pub(in crate::app) fn draw_loading_overlay(&self, ui: &mut Ui) {
        let hidden = !self.bridge.is_busy() && self.bridge.alpha() < 0.01;
        if hidden {
            return;
        }

        let percent = (self.bridge.progress() * 100.0).round();
        egui::Area::new(egui::Id::new("layout_progress"))
            .anchor(Align2::CENTER_TOP, vec2(0.0, 16.0))
            .interactable(false)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(format!("Computing layout: {percent:.0}% complete"));
                    });
                });
            });
    }

    pub(in crate::app) fn handle_story_keys(&mut self, ctx: &Context) {
        if !self.explorer.story_mode() || ctx.memory(|memory| memory.focused().is_some()) {
            return;
        }
        let (next, prev, exit) = ctx.input(|input| {
            (
                input.key_pressed(Key::ArrowRight) || input.key_pressed(Key::Space),
                input.key_pressed(Key::ArrowLeft),
                input.key_pressed(Key::Escape),
            )
        });

        if exit {
            self.explorer.set_story_mode(false);
        } else if next {
            let transition = self.explorer.next_story_step();
            self.story_moved(transition);
        } else if prev {
            let transition = self.explorer.prev_story_step();
            self.story_moved(transition);
        }
    }

    pub(in crate::app) fn draw_story_overlay(&mut self, ctx: &Context) {
        if !self.explorer.story_mode() {
            return;
        }

        let step = self.explorer.story_step();
        let scene = self.explorer.current_scene();
        let mut action = None;

        egui::Area::new(egui::Id::new("story_overlay"))
            .anchor(Align2::CENTER_BOTTOM, vec2(0.0, -32.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(560.0);
                    ui.horizontal(|ui| {
                        for index in 0..STORY_SCENES.len() {
                            let color = if index <= step {
                                Color32::from_rgb(62, 207, 207)
                            } else {
                                Color32::from_gray(70)
                            };
                            let (rect, _) =
                                ui.allocate_exact_size(vec2(48.0, 4.0), egui::Sense::hover());
                            ui.painter().rect_filled(rect, 2.0, color);
                        }
                        if ui.small_button("✕").clicked() {
                            action = Some(StoryAction::Exit);
                        }
                    });
                    ui.add_space(8.0);
                    ui.label(RichText::new(scene.title).heading());
                    ui.label(scene.description);
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui
                            .add_enabled(step > 0, egui::Button::new("◀ Previous"))
                            .clicked()
                        {
                            action = Some(StoryAction::Prev);
                        }
                        ui.label(format!("{} / {}", step + 1, STORY_SCENES.len()));
                        let next_label = if is_last_step(step) {
                            "Finish"
                        } else {
                            "Next ▶"
                        };
                        if ui.button(next_label).clicked() {
                            action = Some(StoryAction::Next);
                        }
                    });
                });
            });

        match action {
            Some(StoryAction::Exit) => self.explorer.set_story_mode(false),
            Some(StoryAction::Next) => {
                let transition = self.explorer.next_story_step();
                self.story_moved(transition);
            }
            Some(StoryAction::Prev) => {
                let transition = self.explorer.prev_story_step();
                self.story_moved(transition);
            }
            None => {}
        }
    }
}

enum StoryAction {
    Next,
    Prev,
    Exit,
}
