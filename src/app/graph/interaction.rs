use eframe::egui::{self, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Forwards primary clicks and drags to the engine in world coordinates.
    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let (now, modifier) = ui.input(|input| {
            (
                input.time,
                input.modifiers.command || input.modifiers.ctrl,
            )
        });
        let pointer = response
            .interact_pointer_pos()
            .map(|screen| screen_to_world(rect, self.pan, self.zoom, screen));

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(world) = pointer
            && let Some(index) = self.engine.node_at(world)
        {
            self.engine.drag_start(index, world);
        }

        if response.dragged_by(egui::PointerButton::Primary)
            && let Some(world) = pointer
        {
            self.engine.drag_to(world);
        }

        if response.drag_stopped() {
            self.engine.drag_end();
        }

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(world) = pointer
        {
            match self.engine.node_at(world) {
                Some(index) => self.engine.click_node(index, modifier, now),
                None => self.engine.click_canvas(now),
            }
        }

        self.engine.poll(now);
        self.absorb_engine_events();
    }
}
