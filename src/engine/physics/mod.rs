mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use log::{debug, trace};

use crate::config::{LabelMetrics, PhysicsConfig};
use crate::pathway::{Endpoint, Graph, NodeIdx, NodeKind};
use crate::util::stable_pair;

use super::geometry::tether_distance;
use forces::{CollisionParams, Tether, accumulate_collision_pairs, accumulate_tethers};
use quadtree::QuadNode;

const GOLDEN_ANGLE: f32 = 2.399_963;

#[derive(Default)]
struct PhysicsScratch {
    slot_of: Vec<Option<usize>>,
    active: Vec<NodeIdx>,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    radii: Vec<f32>,
    forces: Vec<Vec2>,
    tethers: Vec<Tether>,
}

impl PhysicsScratch {
    fn reset(&mut self, node_count: usize) {
        self.slot_of.clear();
        self.slot_of.resize(node_count, None);
        self.active.clear();
        self.positions.clear();
        self.velocities.clear();
        self.radii.clear();
        self.forces.clear();
        self.tethers.clear();
    }
}

/// Cooling force simulation over the visible nodes; groups are positioned by the geometry pass.
pub struct Simulation {
    alpha: f32,
    alpha_target: f32,
    settled: bool,
    scratch: PhysicsScratch,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
            settled: false,
            scratch: PhysicsScratch::default(),
        }
    }
}

impl Simulation {
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Keeps the simulation warm (drag) or lets it cool again (`0.0`).
    pub(crate) fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.max(0.0);
        if target > 0.0 {
            self.settled = false;
        }
    }

    /// Raises alpha to at least `alpha` so newly shown nodes get placed.
    pub(crate) fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha);
        self.settled = false;
    }

    /// Advances one frame; returns whether the layout is still moving.
    pub(crate) fn step(
        &mut self,
        graph: &mut Graph,
        physics: &PhysicsConfig,
        labels: &LabelMetrics,
    ) -> bool {
        self.alpha += (self.alpha_target - self.alpha) * physics.alpha_decay;
        if self.alpha < physics.alpha_min {
            if !self.settled {
                debug!("layout settled (alpha {:.4})", self.alpha);
                self.settled = true;
            }
            return false;
        }
        self.settled = false;

        let scratch = &mut self.scratch;
        scratch.reset(graph.nodes.len());
        for (index, node) in graph.nodes.iter().enumerate() {
            if !node.visible || matches!(node.kind, NodeKind::Group(_)) {
                continue;
            }

            scratch.slot_of[index] = Some(scratch.active.len());
            scratch.active.push(NodeIdx(index));
            scratch.positions.push(node.pos);
            scratch.velocities.push(node.velocity);
            scratch.radii.push(if node.kind.is_ptm_like() {
                physics.ptm_radius
            } else {
                0.0
            });
        }
        scratch.forces.resize(scratch.active.len(), Vec2::ZERO);

        for link in &graph.links {
            if !link.is_tether() {
                continue;
            }
            let Some((Endpoint::Node(ptm), Endpoint::Node(owner))) = link.endpoints() else {
                continue;
            };
            let (Some(ptm_slot), Some(owner_slot)) = (scratch.slot_of[ptm.0], scratch.slot_of[owner.0])
            else {
                continue;
            };
            scratch.tethers.push(Tether {
                ptm: ptm_slot,
                owner: owner_slot,
                distance: tether_distance(graph.node(owner), physics, labels),
            });
        }

        accumulate_tethers(
            &scratch.tethers,
            &scratch.positions,
            &scratch.velocities,
            physics.tether_strength * self.alpha,
            &mut scratch.forces,
        );

        let colliding = (0..scratch.active.len())
            .filter(|&slot| scratch.radii[slot] > 0.0)
            .collect::<Vec<_>>();
        if colliding.len() > 1
            && let Some(tree) = QuadNode::build(&scratch.positions, colliding)
        {
            let max_collision_distance = physics.ptm_radius * 2.0;
            accumulate_collision_pairs(
                &tree,
                &tree,
                true,
                &scratch.positions,
                &scratch.radii,
                CollisionParams {
                    collision_strength: physics.collision_strength,
                    max_collision_distance_sq: max_collision_distance * max_collision_distance,
                },
                &mut scratch.forces,
            );
        }

        let retained = 1.0 - physics.velocity_decay.clamp(0.0, 1.0);
        let max_speed_sq = physics.max_speed * physics.max_speed;
        for (slot, &index) in scratch.active.iter().enumerate() {
            let node = &mut graph.nodes[index.0];
            if let Some(fixed) = node.fixed {
                node.pos = fixed;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = (scratch.velocities[slot] + scratch.forces[slot]) * retained;
            let speed_sq = velocity.length_sq();
            if speed_sq > max_speed_sq {
                velocity *= physics.max_speed / speed_sq.sqrt();
            }
            node.velocity = velocity;
            node.pos += velocity;
        }

        trace!(
            "physics step: alpha {:.4}, {} active, {} tethers",
            self.alpha,
            scratch.active.len(),
            scratch.tethers.len()
        );
        true
    }
}

/// Places every PTM-like node on a spiral around its owner at the tether distance.
pub(crate) fn seed_ptm_positions(graph: &mut Graph, physics: &PhysicsConfig, labels: &LabelMetrics) {
    let mut placed_per_owner: HashMap<NodeIdx, usize> = HashMap::new();

    for index in 0..graph.nodes.len() {
        let Some(owner) = graph.nodes[index].kind.owner() else {
            continue;
        };
        let owner_node = graph.node(owner);
        let center = owner_node.pos;
        let distance = tether_distance(owner_node, physics, labels);

        let order = placed_per_owner.entry(owner).or_insert(0);
        let (jx, _) = stable_pair(&graph.nodes[index].id);
        let angle = (*order as f32) * GOLDEN_ANGLE + jx * 0.2;
        *order += 1;

        let node = &mut graph.nodes[index];
        node.pos = center + vec2(angle.cos(), angle.sin()) * distance;
        node.velocity = Vec2::ZERO;
    }
}
