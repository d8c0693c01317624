mod click;
mod drag;
mod events;
mod geometry;
mod physics;
mod selection;
mod visibility;

use std::cmp::Reverse;
use std::collections::VecDeque;

use eframe::egui::Vec2;
use log::{debug, info};

use crate::config::EngineConfig;
use crate::error::GraphError;
use crate::pathway::{
    Endpoint, Graph, LinkIdx, NodeIdx, NodeKind, NodeShape, PathwayInput, PathwayMetadata,
    build_graph,
};

pub use click::{ClickAction, ClickTarget};
pub use events::{EngineEvent, SelectedLeaf};
pub use geometry::{circle_radius, node_contains, polygon_contains, update_geometry};
pub use physics::Simulation;
pub use selection::is_selected;
pub use visibility::clusters_consistent;

use click::ClickState;
use drag::DragState;
use physics::seed_ptm_positions;
use visibility::RevealTimer;

/// Engine context: the merged graph plus every piece of interaction state that mutates it.
pub struct PathwayEngine {
    graph: Graph,
    config: EngineConfig,
    simulation: Simulation,
    click: ClickState,
    drag: Option<DragState>,
    reveal: RevealTimer,
    events: VecDeque<EngineEvent>,
}

impl PathwayEngine {
    pub fn new(input: PathwayInput, config: EngineConfig) -> Result<Self, GraphError> {
        let mut graph = build_graph(input)?;
        update_geometry(&mut graph, &config.labels);
        seed_ptm_positions(&mut graph, &config.physics, &config.labels);
        update_geometry(&mut graph, &config.labels);

        info!(
            "engine ready for `{}`: {} nodes, {} links",
            graph.metadata.identifier,
            graph.nodes.len(),
            graph.links.len()
        );

        Ok(Self {
            graph,
            config,
            simulation: Simulation::default(),
            click: ClickState::default(),
            drag: None,
            reveal: RevealTimer::Unarmed,
            events: VecDeque::new(),
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metadata(&self) -> &PathwayMetadata {
        &self.graph.metadata
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Timer work: releases a debounced single click and the one-shot PTM reveal.
    pub fn poll(&mut self, now: f64) {
        if let Some(action) = self.click.poll(now) {
            self.apply_click(action);
        }
        if self
            .reveal
            .poll(now, self.config.interaction.ptm_reveal_delay_secs)
        {
            debug!("revealing PTM nodes");
        }
    }

    /// One simulation frame followed by the geometry pass; returns whether nodes still move.
    pub fn tick(&mut self) -> bool {
        let moving = self
            .simulation
            .step(&mut self.graph, &self.config.physics, &self.config.labels);
        update_geometry(&mut self.graph, &self.config.labels);
        moving
    }

    /// Whether a double-click window is still open; callers should keep polling.
    pub fn has_pending_click(&self) -> bool {
        self.click.is_pending()
    }

    pub fn press(&mut self, target: ClickTarget, modifier: bool, now: f64) {
        let window = self.config.interaction.double_click_window_secs;
        if let Some(action) = self.click.press(target, modifier, now, window) {
            self.apply_click(action);
        }
    }

    pub fn click_node(&mut self, index: NodeIdx, modifier: bool, now: f64) {
        if !self.known_node(index) {
            return;
        }
        self.press(ClickTarget::Node(index), modifier, now);
    }

    pub fn click_canvas(&mut self, now: f64) {
        self.press(ClickTarget::Canvas, false, now);
    }

    fn apply_click(&mut self, action: ClickAction) {
        match action {
            ClickAction::Single {
                target: ClickTarget::Node(index),
                modifier,
            } => self.select_node(index, modifier),
            ClickAction::Single {
                target: ClickTarget::Canvas,
                ..
            }
            | ClickAction::Double {
                target: ClickTarget::Canvas,
            } => self.clear_selection(),
            ClickAction::Double {
                target: ClickTarget::Node(index),
            } => {
                self.toggle_cluster(index);
            }
        }
    }

    /// Confirmed single click on a node, bypassing the debounce.
    pub fn select_node(&mut self, index: NodeIdx, modifier: bool) {
        if !self.known_node(index) {
            return;
        }
        let selected = selection::apply_node_click(&mut self.graph, index, modifier);
        let details = if selected && !modifier {
            events::describe(&self.graph, index)
        } else {
            None
        };
        self.events.push_back(EngineEvent::Details(details));
        self.emit_selection();
    }

    pub fn clear_selection(&mut self) {
        selection::clear_selection(&mut self.graph);
        self.events.push_back(EngineEvent::Details(None));
        self.emit_selection();
    }

    /// Selects everything downstream of the node with this id, or with this exact label.
    ///
    /// A label shared by several nodes is ambiguous and leaves the selection untouched.
    pub fn select_downstream(&mut self, key: &str) {
        let Some(start) = self.find_start(key) else {
            return;
        };
        selection::select_downstream(&mut self.graph, start);
        self.emit_selection();
    }

    fn find_start(&self, key: &str) -> Option<NodeIdx> {
        if let Some(index) = self.graph.node_by_id(key) {
            return Some(index);
        }

        let mut matches = self.graph.node_indices().filter(|&index| {
            let kind = &self.graph.node(index).kind;
            !kind.is_ptm_like() && kind.label() == key
        });
        match (matches.next(), matches.next()) {
            (Some(index), None) => Some(index),
            (None, _) => {
                debug!("select downstream: no node matches `{key}`");
                None
            }
            (Some(_), Some(_)) => {
                debug!("select downstream: `{key}` is ambiguous");
                None
            }
        }
    }

    fn emit_selection(&mut self) {
        let leaves = events::selected_leaves(&self.graph);
        self.events.push_back(EngineEvent::SelectionChanged(leaves));
    }

    /// Double click: a badge expands, a PTM dot folds its cluster back.
    pub fn toggle_cluster(&mut self, index: NodeIdx) -> bool {
        if !self.known_node(index) {
            return false;
        }
        let kind = &self.graph.node(index).kind;
        let (is_summary, is_ptm) = (
            matches!(kind, NodeKind::PtmSummary(_)),
            matches!(kind, NodeKind::Ptm(_)),
        );
        if is_summary {
            self.expand_summary(index)
        } else if is_ptm {
            self.collapse_ptm(index)
        } else {
            false
        }
    }

    pub fn expand_summary(&mut self, summary: NodeIdx) -> bool {
        if !self.known_node(summary) {
            return false;
        }
        let changed = visibility::expand_summary(&mut self.graph, summary);
        self.after_visibility_change(changed);
        changed
    }

    pub fn collapse_ptm(&mut self, ptm: NodeIdx) -> bool {
        if !self.known_node(ptm) {
            return false;
        }
        let changed = visibility::collapse_cluster(&mut self.graph, ptm);
        self.after_visibility_change(changed);
        changed
    }

    pub fn expand_all(&mut self) -> usize {
        let changed = visibility::expand_all(&mut self.graph);
        self.after_visibility_change(changed > 0);
        changed
    }

    pub fn collapse_all(&mut self) -> usize {
        let changed = visibility::collapse_all(&mut self.graph);
        self.after_visibility_change(changed > 0);
        changed
    }

    fn after_visibility_change(&mut self, changed: bool) {
        if changed {
            self.simulation.reheat(self.config.physics.drag_alpha_target);
            update_geometry(&mut self.graph, &self.config.labels);
        }
    }

    /// Drawn this frame: visible, and for PTM-like nodes only once the reveal delay passed.
    pub fn is_rendered(&self, index: NodeIdx) -> bool {
        if !self.known_node(index) {
            return false;
        }
        let node = self.graph.node(index);
        node.visible && (!node.kind.is_ptm_like() || self.reveal.is_revealed())
    }

    pub fn ptms_revealed(&self) -> bool {
        self.reveal.is_revealed()
    }

    pub fn is_link_rendered(&self, link: LinkIdx) -> bool {
        if !self.known_link(link) {
            return false;
        }
        self.graph
            .link(link)
            .endpoints()
            .is_some_and(|(source, target)| {
                self.endpoint_rendered(source) && self.endpoint_rendered(target)
            })
    }

    fn endpoint_rendered(&self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Node(index) => self.is_rendered(index),
            Endpoint::Link(anchor) => self.graph.link(anchor).endpoints().is_some_and(|ends| {
                [ends.0, ends.1]
                    .into_iter()
                    .all(|end| end.node().is_some_and(|index| self.is_rendered(index)))
            }),
        }
    }

    pub fn node_dimmed(&self, index: NodeIdx) -> bool {
        self.known_node(index) && selection::node_dimmed(&self.graph, index)
    }

    pub fn link_highlighted(&self, link: LinkIdx) -> bool {
        self.known_link(link) && selection::link_highlighted(&self.graph, link)
    }

    pub fn selected_leaf_count(&self) -> usize {
        events::selected_leaf_count(&self.graph)
    }

    pub fn describe(&self, index: NodeIdx) -> Option<String> {
        if !self.known_node(index) {
            return None;
        }
        events::describe(&self.graph, index)
    }

    /// Topmost rendered node under a world-space point: dots first, then labels, then groups.
    pub fn node_at(&self, point: Vec2) -> Option<NodeIdx> {
        self.graph
            .node_indices()
            .filter(|&index| self.is_rendered(index))
            .filter(|&index| node_contains(self.graph.node(index), point, &self.config))
            .min_by_key(|&index| {
                let node = self.graph.node(index);
                let layer = match node.geometry.shape {
                    _ if node.kind.is_ptm_like() => 0,
                    NodeShape::Circle | NodeShape::Rectangle => 1,
                    NodeShape::Polygon => 2,
                };
                // Later nodes are painted on top.
                (layer, Reverse(index))
            })
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    /// Indices come from callers; one from another graph is ignored rather than trusted.
    fn known_node(&self, index: NodeIdx) -> bool {
        let known = index.0 < self.graph.nodes.len();
        if !known {
            debug!("ignoring unknown node index {}", index.0);
        }
        known
    }

    fn known_link(&self, link: LinkIdx) -> bool {
        let known = link.0 < self.graph.links.len();
        if !known {
            debug!("ignoring unknown link index {}", link.0);
        }
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::{GeneProteinRecord, InertRecord, PtmMeasurement, SkeletonNode};

    fn engine() -> PathwayEngine {
        let gene = |id: &str, label: &str, x: f32| {
            SkeletonNode::GeneProtein(GeneProteinRecord {
                id: id.to_owned(),
                label: label.to_owned(),
                gene_names: vec![label.to_owned()],
                x,
                ..GeneProteinRecord::default()
            })
        };
        PathwayEngine::new(
            PathwayInput {
                nodes: vec![
                    gene("a", "AKT1", 0.0),
                    gene("b", "AKT1", 200.0),
                    gene("c", "MTOR", 400.0),
                ],
                ptm: vec![
                    PtmMeasurement {
                        gene_names: vec!["MTOR".to_owned()],
                        regulation: "up".to_owned(),
                        ..PtmMeasurement::default()
                    };
                    2
                ],
                ..PathwayInput::default()
            },
            EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn single_click_waits_for_the_double_click_window() {
        let mut engine = engine();
        let c = engine.graph().node_by_id("c").unwrap();

        engine.click_node(c, false, 1.0);
        assert!(engine.drain_events().is_empty());
        assert!(engine.has_pending_click());

        engine.poll(1.3);
        let events = engine.drain_events();
        assert!(matches!(&events[0], EngineEvent::Details(Some(text)) if text.starts_with("MTOR")));
        assert!(matches!(&events[1], EngineEvent::SelectionChanged(leaves) if leaves.len() == 2));
    }

    #[test]
    fn double_click_on_badge_expands_without_selecting() {
        let mut engine = engine();
        let summary = engine.graph().node_by_id("ptmsummary-c-up").unwrap();

        engine.click_node(summary, false, 1.0);
        engine.click_node(summary, false, 1.1);
        engine.poll(5.0);

        assert!(engine.drain_events().is_empty());
        assert!(!engine.graph().node(summary).visible);
        assert!(clusters_consistent(engine.graph()));
    }

    #[test]
    fn ambiguous_label_leaves_selection_alone() {
        let mut engine = engine();
        engine.select_downstream("AKT1");
        assert!(engine.drain_events().is_empty());

        engine.select_downstream("MTOR");
        let events = engine.drain_events();
        assert_eq!(events.len(), 1);
        let a = engine.graph().node_by_id("a").unwrap();
        assert!(engine.node_dimmed(a));
    }

    #[test]
    fn ptm_like_nodes_render_after_reveal_delay() {
        let mut engine = engine();
        let summary = engine.graph().node_by_id("ptmsummary-c-up").unwrap();
        let c = engine.graph().node_by_id("c").unwrap();

        engine.poll(0.0);
        assert!(engine.is_rendered(c));
        assert!(!engine.is_rendered(summary));

        engine.poll(2.0);
        assert!(engine.is_rendered(summary));
    }

    #[test]
    fn overlapping_nodes_hit_the_one_painted_last() {
        let compound = |id: &str| {
            SkeletonNode::Compound(InertRecord {
                id: id.to_owned(),
                ..InertRecord::default()
            })
        };
        let engine = PathwayEngine::new(
            PathwayInput {
                nodes: vec![compound("under"), compound("over")],
                ..PathwayInput::default()
            },
            EngineConfig::default(),
        )
        .unwrap();

        let over = engine.graph().node_by_id("over").unwrap();
        assert_eq!(engine.node_at(Vec2::ZERO), Some(over));
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut engine = engine();
        let stale = NodeIdx(engine.graph().nodes.len() + 3);
        let stale_link = LinkIdx(engine.graph().links.len());

        engine.click_node(stale, false, 1.0);
        engine.poll(5.0);
        engine.select_node(stale, true);
        engine.drag_start(stale, Vec2::ZERO);
        engine.drag_to(Vec2::new(10.0, 0.0));
        engine.drag_end();

        assert!(engine.drain_events().is_empty());
        assert!(!engine.toggle_cluster(stale));
        assert!(!engine.expand_summary(stale));
        assert!(!engine.collapse_ptm(stale));
        assert!(!engine.is_rendered(stale));
        assert!(!engine.node_dimmed(stale));
        assert_eq!(engine.describe(stale), None);
        assert!(!engine.is_link_rendered(stale_link));
        assert!(!engine.link_highlighted(stale_link));
        assert_eq!(engine.dragged_node(), None);
    }

    #[test]
    fn hit_testing_prefers_dots_over_labels() {
        let mut engine = engine();
        engine.poll(0.0);
        engine.poll(10.0);
        let summary = engine.graph().node_by_id("ptmsummary-c-up").unwrap();
        let c = engine.graph().node_by_id("c").unwrap();

        let c_pos = engine.graph().node(c).pos;
        assert_eq!(engine.node_at(c_pos), Some(c));
        let badge = engine.graph().node(summary).pos;
        assert_eq!(engine.node_at(badge), Some(summary));
        assert_eq!(engine.node_at(c_pos + Vec2::new(500.0, 500.0)), None);
    }
}
