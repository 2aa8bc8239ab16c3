use eframe::egui::{self, Rect, Ui};

use super::super::{DrawNode, ViewModel};

impl ViewModel {
    pub(in crate::app) fn handle_camera_input(
        &mut self,
        ui: &Ui,
        _rect: Rect,
        response: &egui::Response,
    ) {
        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                self.camera.zoom_by(scroll);
            }
        }

        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
        {
            self.camera.orbit(response.drag_delta());
        }
    }

    /// Index into `nodes` of the node under the pointer. Front-most wins when
    /// several overlap.
    pub(in crate::app) fn hovered_index(ui: &Ui, nodes: &[DrawNode]) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.projected.screen.distance(pointer) <= node.radius)
            .min_by(|a, b| a.1.projected.depth.total_cmp(&b.1.projected.depth))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn apply_graph_click(&mut self, clicked: Option<String>) {
        if let Some(id) = clicked {
            self.explorer.toggle_selection(&id);
        }
    }
}
