use eframe::egui::{self, RichText, Ui};

use crate::graph::NodeKind;
use crate::util::truncate_label;

use super::super::ViewModel;
use super::super::render_utils::kind_color;

const KIND_GROUPS: [(&str, &[NodeKind]); 4] = [
    ("Core", &[NodeKind::App, NodeKind::Agent]),
    (
        "Spec Kit",
        &[
            NodeKind::SpecConstitution,
            NodeKind::SpecPrd,
            NodeKind::SpecPlan,
            NodeKind::SpecTasks,
        ],
    ),
    (
        "Infrastructure",
        &[NodeKind::SupabaseTable, NodeKind::EdgeFunction, NodeKind::CronJob],
    ),
    (
        "Observability",
        &[NodeKind::Monitor, NodeKind::Event, NodeKind::Issue],
    ),
];

const HEALTH_OVERVIEW: [NodeKind; 3] = [NodeKind::App, NodeKind::Issue, NodeKind::Monitor];
const SPEC_KITS: [NodeKind; 5] = [
    NodeKind::App,
    NodeKind::SpecConstitution,
    NodeKind::SpecPrd,
    NodeKind::SpecPlan,
    NodeKind::SpecTasks,
];

const MAX_SEARCH_RESULTS: usize = 12;

impl ViewModel {
    pub(in crate::app) fn draw_filters(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        ui.add_space(6.0);

        ui.add(
            egui::TextEdit::singleline(self.explorer.search_mut()).hint_text("Search nodes..."),
        );
        self.draw_search_results(ui);

        ui.separator();
        ui.label(RichText::new("Quick actions").small().strong());
        let mut changed = false;
        let all_visible = self.explorer.all_kinds_visible();
        if ui
            .button(if all_visible { "Hide all" } else { "Show all" })
            .clicked()
        {
            changed |= if all_visible {
                self.explorer.set_visible_kinds(Vec::new())
            } else {
                self.explorer.set_visible_kinds(NodeKind::ALL)
            };
        }
        if ui.button("Health overview").clicked() {
            changed |= self.explorer.set_visible_kinds(HEALTH_OVERVIEW);
        }
        if ui.button("Spec kits only").clicked() {
            changed |= self.explorer.set_visible_kinds(SPEC_KITS);
        }

        let story_label = if self.explorer.story_mode() {
            "Stop story mode"
        } else {
            "Start story mode"
        };
        if ui.button(story_label).clicked() {
            let enable = !self.explorer.story_mode();
            self.explorer.set_story_mode(enable);
            if enable {
                self.apply_story_scene();
            }
        }

        egui::ScrollArea::vertical()
            .id_salt("kind_filters")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (group, kinds) in KIND_GROUPS {
                    ui.separator();
                    ui.label(RichText::new(group).small().strong());
                    for &kind in kinds {
                        let mut visible = self.explorer.is_kind_visible(kind);
                        let count = self.data.count_of_kind(kind);
                        ui.horizontal(|ui| {
                            ui.label(RichText::new("●").color(kind_color(kind)));
                            if ui
                                .checkbox(&mut visible, format!("{}  ({count})", kind.label()))
                                .changed()
                            {
                                self.explorer.toggle_kind(kind);
                                changed = true;
                            }
                        });
                    }
                }
            });

        if changed {
            self.filters_changed();
        }
    }

    fn draw_search_results(&mut self, ui: &mut Ui) {
        let matches = self
            .explorer
            .search_matches(&self.data.nodes)
            .into_iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|node| (node.id.clone(), node.label.clone(), node.kind))
            .collect::<Vec<_>>();
        if matches.is_empty() {
            if !self.explorer.search().trim().is_empty() {
                ui.small("No matching nodes.");
            }
            return;
        }

        let mut picked = None;
        for (id, label, kind) in &matches {
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(kind_color(*kind)));
                if ui
                    .link(truncate_label(label, 32))
                    .on_hover_text(id.as_str())
                    .clicked()
                {
                    picked = Some(id.clone());
                }
            });
        }
        if let Some(id) = picked {
            self.focus_node(&id);
        }
    }
}
