use eframe::egui::{self, Color32, RichText, Ui};

use crate::graph::{GraphEdge, GraphNode, HealthStatus};
use crate::util::{format_created_at, truncate_label};

use super::super::ViewModel;
use super::super::render_utils::kind_color;

fn status_color(status: HealthStatus) -> Color32 {
    match status {
        HealthStatus::Healthy => Color32::from_rgb(74, 222, 128),
        HealthStatus::Warning => Color32::from_rgb(250, 204, 21),
        HealthStatus::Error => Color32::from_rgb(239, 68, 68),
        HealthStatus::Unknown => Color32::from_gray(140),
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.explorer.selected().map(str::to_owned) else {
            ui.label("Select a node to view details.");
            return;
        };

        let data = std::sync::Arc::clone(&self.data);
        let Some(node) = data.node(&selected_id) else {
            ui.label("Selected node is not part of the current dataset.");
            return;
        };

        let mut clear = false;
        ui.horizontal(|ui| {
            ui.label(RichText::new("●").color(kind_color(node.kind)));
            ui.small(node.kind.label());
            if ui.small_button("✕").on_hover_text("Clear selection").clicked() {
                clear = true;
            }
        });
        ui.label(RichText::new(node.label.as_str()).strong().size(17.0));
        ui.add_space(6.0);

        let status = node.status.unwrap_or_default();
        ui.horizontal(|ui| {
            ui.label("Status");
            ui.label(RichText::new(status.label()).color(status_color(status)));
        });
        if let Some(importance) = node.importance {
            ui.horizontal(|ui| {
                ui.label("Importance");
                ui.add(
                    egui::ProgressBar::new(importance.clamp(0.0, 1.0))
                        .desired_width(90.0)
                        .text(format!("{:.0}%", importance.clamp(0.0, 1.0) * 100.0)),
                );
            });
        }
        if let Some(slug) = &node.slug {
            ui.label(format!("Project: {slug}"));
        }
        if let Some(created_at) = &node.created_at {
            ui.label(format!("Created: {}", format_created_at(created_at)));
        }

        ui.add_space(6.0);
        let mut focus = false;
        if ui.button("Focus on this node").clicked() {
            focus = true;
        }

        let connections = self.explorer.connections(&data);

        ui.separator();
        let picked = egui::ScrollArea::vertical()
            .id_salt("connections_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let mut picked = None;
                if !connections.incoming.is_empty() {
                    ui.label(
                        RichText::new(format!("Incoming ({})", connections.incoming.len())).strong(),
                    );
                    picked = connection_rows(ui, &connections.incoming);
                }
                if !connections.outgoing.is_empty() {
                    ui.add_space(6.0);
                    ui.label(
                        RichText::new(format!("Outgoing ({})", connections.outgoing.len())).strong(),
                    );
                    picked = picked.or(connection_rows(ui, &connections.outgoing));
                }
                if connections.incoming.is_empty() && connections.outgoing.is_empty() {
                    ui.label("No connections.");
                }
                picked
            })
            .inner;

        if clear {
            self.explorer.select(None);
        } else if focus {
            self.focus_node(&selected_id);
        } else if let Some(id) = picked {
            self.explorer.select(Some(id));
        }
    }
}

/// One clickable row per connection; returns the id of a clicked row.
fn connection_rows(ui: &mut Ui, rows: &[(&GraphEdge, &GraphNode)]) -> Option<String> {
    let mut picked = None;
    for (edge, node) in rows {
        ui.horizontal(|ui| {
            ui.label(RichText::new("●").color(kind_color(node.kind)));
            if ui
                .link(truncate_label(&node.label, 28))
                .on_hover_text(node.id.as_str())
                .clicked()
            {
                picked = Some(node.id.clone());
            }
            ui.small(edge.kind.label());
        });
    }
    picked
}

#[cfg(test)]
mod tests {
    use eframe::egui;

    use super::*;
    use crate::config::AppConfig;
    use crate::graph::sample_graph;

    #[test]
    fn details_panel_lists_connections_and_keeps_selection() {
        let mut model = ViewModel::new(sample_graph(), &AppConfig::default());
        model.explorer.select(Some("app-guardian".to_owned()));
        assert!(!model.explorer.connections(&model.data).outgoing.is_empty());

        let ctx = egui::Context::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| model.draw_details(ui));
            });
        }

        assert_eq!(model.explorer.selected(), Some("app-guardian"));
        assert_eq!(model.explorer.focus(), None);
    }
}
