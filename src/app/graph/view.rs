use std::time::Duration;

use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, vec2,
};
use pathwaygraph::engine::circle_radius;
use pathwaygraph::pathway::{LinkIdx, LinkKind, NodeIdx, NodeKind, NodeShape};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, dim_color, draw_background, link_color, regulation_color, screen_to_world,
    segment_visible, world_to_screen,
};

const DIM_FACTOR: f32 = 0.35;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.handle_graph_pointer(ui, rect, &response);

        self.layout_moving = self.engine.tick();
        if self.layout_moving || self.engine.dragged_node().is_some() {
            ui.ctx().request_repaint();
        } else if self.engine.has_pending_click() || !self.engine.ptms_revealed() {
            ui.ctx().request_repaint_after(Duration::from_millis(50));
        }

        self.draw_groups(&painter, rect);
        self.draw_links(&painter, rect);
        self.draw_nodes(&painter, rect);

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| {
                self.engine
                    .node_at(screen_to_world(rect, self.pan, self.zoom, pointer))
            });
        if let Some(index) = hovered {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
            let node = self.engine.graph().node(index);
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}", node.id, node.kind.type_name()),
                FontId::proportional(13.0),
                Color32::from_gray(40),
            );
        }
    }

    fn screen(&self, rect: Rect, world: egui::Vec2) -> Pos2 {
        world_to_screen(rect, self.pan, self.zoom, world)
    }

    fn draw_groups(&self, painter: &egui::Painter, rect: Rect) {
        let graph = self.engine.graph();
        for index in graph.node_indices() {
            let NodeKind::Group(group) = &graph.node(index).kind else {
                continue;
            };
            if group.hull.len() < 3 || !self.engine.is_rendered(index) {
                continue;
            }

            let mut fill = Color32::from_rgba_unmultiplied(120, 150, 200, 40);
            let mut outline = Color32::from_rgb(110, 130, 170);
            if self.engine.node_dimmed(index) {
                fill = dim_color(fill, DIM_FACTOR);
                outline = dim_color(outline, DIM_FACTOR);
            }
            let points = group
                .hull
                .iter()
                .map(|&point| self.screen(rect, point))
                .collect::<Vec<_>>();
            painter.add(egui::Shape::convex_polygon(
                points,
                fill,
                Stroke::new(1.2, outline),
            ));
        }
    }

    fn draw_links(&self, painter: &egui::Painter, rect: Rect) {
        let graph = self.engine.graph();
        let zoom_sqrt = self.zoom.sqrt();
        for (index, link) in graph.links.iter().enumerate() {
            let link_index = LinkIdx(index);
            if !self.engine.is_link_rendered(link_index) {
                continue;
            }

            let start = self.screen(rect, link.geometry.rim_source);
            let end = self.screen(rect, link.geometry.rim_target);
            if !segment_visible(rect, start, end, 8.0) {
                continue;
            }

            let highlighted = self.engine.link_highlighted(link_index);
            if link.kind != LinkKind::Relation {
                let color = Color32::from_rgba_unmultiplied(120, 120, 120, 90);
                painter.line_segment(
                    [start, end],
                    Stroke::new(0.8, if highlighted { color } else { dim_color(color, DIM_FACTOR) }),
                );
                continue;
            }

            let mut color = link_color(&link.types);
            if !highlighted {
                color = dim_color(color, DIM_FACTOR);
            }
            let stroke = Stroke::new((1.4 * zoom_sqrt).clamp(0.7, 3.2), color);
            painter.line_segment([start, end], stroke);

            if link.is_undirected() {
                continue;
            }
            let delta = end - start;
            if delta.length_sq() <= 1.0 {
                continue;
            }
            let direction = delta.normalized();
            let normal = vec2(-direction.y, direction.x);
            let size = (7.0 * zoom_sqrt).clamp(4.0, 12.0);
            if link.types.iter().any(|kind| kind.contains("inhibition")) {
                painter.line_segment([end + normal * size * 0.6, end - normal * size * 0.6], stroke);
            } else {
                let base = end - direction * size;
                painter.add(egui::Shape::convex_polygon(
                    vec![end, base + normal * size * 0.45, base - normal * size * 0.45],
                    color,
                    Stroke::NONE,
                ));
            }
        }
    }

    fn draw_nodes(&self, painter: &egui::Painter, rect: Rect) {
        let graph = self.engine.graph();
        let config = self.engine.config();
        let font = FontId::proportional((12.0 * self.zoom).clamp(6.0, 26.0));
        let small_font = FontId::proportional((9.0 * self.zoom).clamp(5.0, 20.0));

        for index in graph.node_indices() {
            let node = graph.node(index);
            if matches!(node.kind, NodeKind::Group(_)) || !self.engine.is_rendered(index) {
                continue;
            }

            let center = self.screen(rect, node.pos);
            let dimmed = self.engine.node_dimmed(index);
            let shade = |color: Color32| {
                if dimmed {
                    dim_color(color, DIM_FACTOR)
                } else {
                    color
                }
            };
            let outline = Stroke::new(
                config.labels.outline_half_thickness * 2.0 * self.zoom.sqrt(),
                shade(Color32::from_gray(60)),
            );

            match (&node.kind, node.geometry.shape) {
                (NodeKind::Ptm(ptm), _) => {
                    let radius = circle_radius(node, config) * self.zoom;
                    painter.circle_filled(center, radius, shade(regulation_color(ptm.regulation)));
                    painter.circle_stroke(center, radius, outline);
                }
                (NodeKind::PtmSummary(summary), _) => {
                    let radius = circle_radius(node, config) * self.zoom;
                    let fill = blend_color(
                        regulation_color(summary.regulation),
                        Color32::WHITE,
                        0.25,
                    );
                    painter.circle_filled(center, radius, shade(fill));
                    painter.circle_stroke(center, radius, outline);
                    painter.text(
                        center,
                        Align2::CENTER_CENTER,
                        summary.count_label.as_str(),
                        small_font.clone(),
                        shade(Color32::WHITE),
                    );
                }
                (_, NodeShape::Rectangle) => {
                    let half = vec2(
                        node.geometry.label_width * 0.5,
                        config.labels.half_height,
                    ) * self.zoom;
                    let fill = match node.kind {
                        NodeKind::PathwayRef { .. } => Color32::from_rgb(233, 226, 246),
                        NodeKind::Misc { .. } => Color32::from_rgb(236, 236, 236),
                        _ => Color32::from_rgb(226, 240, 228),
                    };
                    let body = Rect::from_center_size(center, half * 2.0);
                    painter.rect_filled(body, CornerRadius::same(3), shade(fill));
                    painter.rect_stroke(body, CornerRadius::same(3), outline, StrokeKind::Inside);
                    painter.text(
                        center,
                        Align2::CENTER_CENTER,
                        node.kind.label(),
                        font.clone(),
                        shade(Color32::from_gray(25)),
                    );

                    if let NodeKind::GeneProtein(gene) = &node.kind
                        && let Some(counts) = gene.counts
                    {
                        painter.text(
                            body.center_bottom() + vec2(0.0, 2.0),
                            Align2::CENTER_TOP,
                            format!("+{} -{} ={}", counts.up, counts.down, counts.not),
                            small_font.clone(),
                            shade(Color32::from_gray(70)),
                        );
                    }
                }
                _ => {
                    let radius = circle_radius(node, config) * self.zoom;
                    painter.circle_filled(center, radius, shade(Color32::from_rgb(250, 236, 200)));
                    painter.circle_stroke(center, radius, outline);
                    let label = node.kind.label();
                    if !label.is_empty() {
                        painter.text(
                            center + vec2(radius + 4.0, 0.0),
                            Align2::LEFT_CENTER,
                            label,
                            small_font.clone(),
                            shade(Color32::from_gray(40)),
                        );
                    }
                }
            }
        }
    }

    pub(in crate::app) fn focus_node(&mut self, index: NodeIdx) {
        let position = self.engine.graph().node(index).pos;
        self.pan = -position * self.zoom;
    }
}
