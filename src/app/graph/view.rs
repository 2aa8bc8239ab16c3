use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use crate::util::truncate_label;

use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, edge_visible, kind_color,
    node_radius,
};
use super::super::{DrawNode, ViewModel};

const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.camera.yaw);
        self.handle_camera_input(ui, rect, &response);

        let data = Arc::clone(&self.data);
        let neighbors = self.explorer.neighbor_ids(&data);
        let search_hits = self
            .explorer
            .search_matches(&data.nodes)
            .into_iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();

        let mut nodes = std::mem::take(&mut self.draw_scratch);
        nodes.clear();
        for positioned in self.explorer.visible_nodes(self.bridge.positions()) {
            let Some(projected) = self.camera.project(rect, positioned.position()) else {
                continue;
            };
            let id = positioned.id();
            let emphasis = if self.explorer.hovered() == Some(id) || self.explorer.selected() == Some(id)
            {
                1.3
            } else if neighbors.contains(id) {
                1.1
            } else {
                1.0
            };
            let radius = node_radius(positioned.node.effective_importance(), projected.scale, emphasis);
            if !circle_visible(rect, projected.screen, radius) {
                continue;
            }
            nodes.push(DrawNode {
                id: id.to_owned(),
                projected,
                radius,
            });
        }
        // Far nodes first so near ones paint over them.
        nodes.sort_by(|a, b| b.projected.depth.total_cmp(&a.projected.depth));

        let hovered = Self::hovered_index(ui, &nodes).map(|index| nodes[index].id.clone());
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
        if hovered.as_deref() != self.explorer.hovered() {
            self.explorer.hover(hovered.clone());
        }
        let clicked = if response.clicked_by(egui::PointerButton::Primary) {
            hovered.clone()
        } else {
            None
        };

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect::<HashMap<_, _>>();
        let active = self.explorer.active_node();
        let zoom_sqrt = self.explorer.zoom().max(0.2).sqrt();

        for edge in self.explorer.visible_edges(&data, self.bridge.positions()) {
            let (Some(&from), Some(&to)) = (
                index_by_id.get(edge.from.as_str()),
                index_by_id.get(edge.to.as_str()),
            ) else {
                continue;
            };
            let start = nodes[from].projected.screen;
            let end = nodes[to].projected.screen;
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }

            let stroke = if self.explorer.is_edge_highlighted(edge, &neighbors) {
                Stroke::new(
                    (2.0 * zoom_sqrt).clamp(1.0, 3.0),
                    Color32::from_rgba_unmultiplied(120, 220, 230, 204),
                )
            } else {
                Stroke::new(
                    (1.0 * zoom_sqrt).clamp(0.5, 1.6),
                    Color32::from_rgba_unmultiplied(140, 150, 170, 38),
                )
            };
            painter.line_segment([start, end], stroke);
        }

        let mut selection_animating = false;
        for node in &nodes {
            let Some(positioned) = self.bridge.position(&node.id) else {
                continue;
            };
            let id = node.id.as_str();
            let is_selected = self.explorer.selected() == Some(id);
            let is_hovered = self.explorer.hovered() == Some(id);
            let is_neighbor = neighbors.contains(id);
            let is_search_hit = search_hits.contains(id);

            let base_color = kind_color(positioned.node.kind);
            let unselected_color = if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.35)
            } else if is_search_hit {
                blend_color(base_color, SEARCH_COLOR, 0.6)
            } else if is_neighbor {
                dim_color(base_color, 0.9)
            } else if active.is_some() || !search_hits.is_empty() {
                dim_color(base_color, 0.45)
            } else {
                dim_color(base_color, 0.8)
            };

            let selection_mix = ui
                .ctx()
                .animate_bool(ui.make_persistent_id(("node-selection", id)), is_selected);
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }
            let color = blend_color(unselected_color, SELECTED_COLOR, selection_mix * 0.5);

            painter.circle_filled(
                node.projected.screen,
                node.radius * 1.5,
                Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 38),
            );
            painter.circle_filled(node.projected.screen, node.radius, color);
            if selection_mix > 0.0 {
                let halo_alpha = (60.0 + selection_mix * 140.0) as u8;
                painter.circle_stroke(
                    node.projected.screen,
                    node.radius + 3.0 + (1.0 - selection_mix) * 6.0,
                    Stroke::new(
                        1.0 + selection_mix,
                        Color32::from_rgba_unmultiplied(245, 206, 93, halo_alpha),
                    ),
                );
            }

            let show_label = self.explorer.zoom() > 0.5
                || is_hovered
                || is_selected
                || (is_search_hit && self.explorer.zoom() > 0.2);
            if show_label {
                let text = if self.explorer.zoom() > 0.8 || is_selected {
                    format!("{}  ·  {}", positioned.node.label, positioned.node.kind.label())
                } else {
                    truncate_label(&positioned.node.label, 24)
                };
                painter.text(
                    node.projected.screen + vec2(0.0, -(node.radius + 4.0)),
                    Align2::CENTER_BOTTOM,
                    text,
                    FontId::proportional(12.0),
                    Color32::from_gray(235),
                );
            }
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(hovered_id) = hovered.as_deref()
            && let Some(node) = data.node(hovered_id)
        {
            let status = node.status.unwrap_or_default();
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}  |  {}", node.label, node.kind.label(), status.label()),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if nodes.is_empty() && !self.bridge.positions().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes match the current filters.",
                FontId::proportional(14.0),
                Color32::from_gray(170),
            );
        }

        self.draw_scratch = nodes;
        self.apply_graph_click(clicked);
    }
}
