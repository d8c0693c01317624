use eframe::egui::Vec2;
use log::debug;

use crate::pathway::{NodeIdx, NodeKind};

use super::PathwayEngine;

pub(super) struct DragState {
    node: NodeIdx,
    /// Nodes pinned for the gesture: the node itself, or every member of a dragged group.
    pinned: Vec<NodeIdx>,
    last_pointer: Vec2,
}

impl PathwayEngine {
    /// Pins `index` (or all members of a group) and keeps the layout warm until release.
    pub fn drag_start(&mut self, index: NodeIdx, pointer: Vec2) {
        self.drag_end();
        if !self.known_node(index) {
            return;
        }

        let pinned = match &self.graph.node(index).kind {
            NodeKind::Group(group) => group.components.clone(),
            _ => vec![index],
        };
        for &node in &pinned {
            let node = self.graph.node_mut(node);
            node.fixed = Some(node.pos);
            node.velocity = Vec2::ZERO;
        }

        debug!(
            "drag start on `{}` ({} pinned)",
            self.graph.node(index).id,
            pinned.len()
        );
        self.drag = Some(DragState {
            node: index,
            pinned,
            last_pointer: pointer,
        });
        self.simulation
            .set_alpha_target(self.config.physics.drag_alpha_target);
    }

    /// Moves the pinned nodes rigidly by the pointer delta.
    pub fn drag_to(&mut self, pointer: Vec2) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let delta = pointer - drag.last_pointer;
        drag.last_pointer = pointer;

        for &index in &drag.pinned {
            let node = self.graph.node_mut(index);
            let target = node.fixed.unwrap_or(node.pos) + delta;
            node.fixed = Some(target);
            node.pos = target;
        }
    }

    pub fn drag_end(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        for index in drag.pinned {
            let node = self.graph.node_mut(index);
            node.fixed = None;
            node.velocity = Vec2::ZERO;
        }
        self.simulation.set_alpha_target(0.0);
    }

    pub fn dragged_node(&self) -> Option<NodeIdx> {
        self.drag.as_ref().map(|drag| drag.node)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::config::EngineConfig;
    use crate::engine::PathwayEngine;
    use crate::pathway::{GeneProteinRecord, GroupRecord, PathwayInput, SkeletonNode};

    fn engine() -> PathwayEngine {
        let gene = |id: &str, x: f32| {
            SkeletonNode::GeneProtein(GeneProteinRecord {
                id: id.to_owned(),
                label: id.to_uppercase(),
                x,
                ..GeneProteinRecord::default()
            })
        };
        PathwayEngine::new(
            PathwayInput {
                nodes: vec![
                    gene("a", 0.0),
                    gene("b", 100.0),
                    gene("c", 300.0),
                    SkeletonNode::Group(GroupRecord {
                        id: "g".to_owned(),
                        label: None,
                        component_node_ids: vec!["a".to_owned(), "b".to_owned()],
                    }),
                ],
                ..PathwayInput::default()
            },
            EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn dragging_a_node_pins_it_to_the_pointer_path() {
        let mut engine = engine();
        let c = engine.graph().node_by_id("c").unwrap();

        engine.drag_start(c, vec2(300.0, 0.0));
        engine.drag_to(vec2(320.0, 15.0));
        for _ in 0..10 {
            engine.tick();
        }

        assert_eq!(engine.graph().node(c).pos, vec2(320.0, 15.0));
        assert!(engine.simulation().alpha() > 0.0);
        assert_eq!(engine.dragged_node(), Some(c));

        engine.drag_end();
        assert_eq!(engine.graph().node(c).fixed, None);
        assert_eq!(engine.dragged_node(), None);
    }

    #[test]
    fn dragging_a_group_moves_members_rigidly() {
        let mut engine = engine();
        let group = engine.graph().node_by_id("g").unwrap();
        let a = engine.graph().node_by_id("a").unwrap();
        let b = engine.graph().node_by_id("b").unwrap();

        engine.drag_start(group, vec2(50.0, 0.0));
        engine.drag_to(vec2(60.0, 40.0));
        engine.tick();

        assert_eq!(engine.graph().node(a).pos, vec2(10.0, 40.0));
        assert_eq!(engine.graph().node(b).pos, vec2(110.0, 40.0));
        assert_eq!(engine.graph().node(group).pos, vec2(60.0, 40.0));

        engine.drag_end();
        assert_eq!(engine.graph().node(a).fixed, None);
    }
}
