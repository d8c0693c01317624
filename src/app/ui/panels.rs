use eframe::egui::{self, Align, Context, Layout, Vec2};
use pathwaygraph::{EngineEvent, PathwayEngine};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(engine: PathwayEngine) -> Self {
        Self {
            engine,
            search: String::new(),
            details: None,
            selected_leaves: Vec::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            layout_moving: true,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("pathwaygraph");
                    ui.separator();
                    ui.label(format!("file: {source}"));
                    ui.label(format!("nodes: {}", self.engine.graph().nodes.len()));
                    ui.label(format!("links: {}", self.engine.graph().links.len()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload inputs"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let status = if self.layout_moving {
                            format!("settling (alpha {:.3})", self.engine.simulation().alpha())
                        } else {
                            "settled".to_owned()
                        };
                        ui.label(status);
                    });
                });
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if is_loading {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Reloading pathway...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                } else {
                    self.draw_graph(ui);
                }
            });
    }

    pub(in crate::app) fn absorb_engine_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                EngineEvent::Details(text) => self.details = text,
                EngineEvent::SelectionChanged(leaves) => self.selected_leaves = leaves,
            }
        }
    }
}
