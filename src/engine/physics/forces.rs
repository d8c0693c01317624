use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) collision_strength: f32,
    pub(super) max_collision_distance_sq: f32,
}

/// Spring from a PTM-like slot to its owner slot, at rest when `distance` apart.
#[derive(Clone, Copy, Debug)]
pub(super) struct Tether {
    pub(super) ptm: usize,
    pub(super) owner: usize,
    pub(super) distance: f32,
}

fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Pulls each PTM-like slot toward its rest distance from the owner; owners keep their place.
pub(super) fn accumulate_tethers(
    tethers: &[Tether],
    positions: &[Vec2],
    velocities: &[Vec2],
    strength: f32,
    forces: &mut [Vec2],
) {
    for tether in tethers {
        let (ptm, owner) = (tether.ptm, tether.owner);
        if ptm == owner {
            continue;
        }

        let mut delta = positions[owner] - (positions[ptm] + velocities[ptm]);
        if delta.length_sq() <= 0.0001 * 0.0001 {
            delta = fallback_direction(ptm, owner) * 0.001;
        }
        let distance = delta.length();
        let pull = (distance - tether.distance) / distance * strength;
        forces[ptm] += delta * pull;
    }
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    if min_distance <= 0.0 {
        return;
    }

    let delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        fallback_direction(from, to)
    };

    let overlap_push = (min_distance - distance) * params.collision_strength;
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let from_share = to_sq / (from_sq + to_sq);

    forces[from] += direction * overlap_push * from_share;
    forces[to] -= direction * overlap_push * (1.0 - from_share);
}

pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_collision_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for i in 0..node_a.indices.len() {
                for j in (i + 1)..node_a.indices.len() {
                    collide_pair(
                        node_a.indices[i],
                        node_a.indices[j],
                        positions,
                        radii,
                        params,
                        forces,
                    );
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide_pair(from, to, positions, radii, params, forces);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, forces);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, forces,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, forces);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, forces);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: CollisionParams = CollisionParams {
        collision_strength: 1.0,
        max_collision_distance_sq: 400.0,
    };

    #[test]
    fn overlapping_dots_push_apart_symmetrically() {
        let positions = vec![vec2(0.0, 0.0), vec2(4.0, 0.0)];
        let radii = vec![5.0, 5.0];
        let mut forces = vec![Vec2::ZERO; 2];
        let tree = QuadNode::build(&positions, vec![0, 1]).unwrap();

        accumulate_collision_pairs(&tree, &tree, true, &positions, &radii, PARAMS, &mut forces);

        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
        assert!((forces[0].x + forces[1].x).abs() < 1e-5);
    }

    #[test]
    fn zero_radius_nodes_never_repel_each_other() {
        let positions = vec![vec2(0.0, 0.0), vec2(0.5, 0.0)];
        let radii = vec![0.0, 0.0];
        let mut forces = vec![Vec2::ZERO; 2];
        let tree = QuadNode::build(&positions, vec![0, 1]).unwrap();

        accumulate_collision_pairs(&tree, &tree, true, &positions, &radii, PARAMS, &mut forces);

        assert_eq!(forces, vec![Vec2::ZERO; 2]);
    }

    #[test]
    fn tether_pulls_distant_ptm_toward_owner() {
        let positions = vec![vec2(100.0, 0.0), vec2(0.0, 0.0)];
        let velocities = vec![Vec2::ZERO; 2];
        let mut forces = vec![Vec2::ZERO; 2];
        let tethers = [Tether {
            ptm: 0,
            owner: 1,
            distance: 20.0,
        }];

        accumulate_tethers(&tethers, &positions, &velocities, 1.0, &mut forces);

        assert!((forces[0].x + 80.0).abs() < 1e-3);
        assert_eq!(forces[1], Vec2::ZERO);
    }
}
