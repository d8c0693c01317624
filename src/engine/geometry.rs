use std::cmp::Ordering;

use eframe::egui::{Rect, Vec2, pos2, vec2};

use crate::config::{EngineConfig, LabelMetrics, PhysicsConfig};
use crate::pathway::{Endpoint, Graph, LinkGeometry, LinkIdx, Node, NodeIdx, NodeKind, NodeShape};

/// Rest length of a PTM tether: just outside the owner's rim.
pub(crate) fn tether_distance(owner: &Node, physics: &PhysicsConfig, labels: &LabelMetrics) -> f32 {
    let rim = match owner.geometry.shape {
        NodeShape::Circle => labels.circle_radius,
        NodeShape::Rectangle | NodeShape::Polygon => {
            owner.geometry.half_width().max(labels.circle_radius)
        }
    };
    rim * physics.tether_distance_factor
}

pub fn circle_radius(node: &Node, config: &EngineConfig) -> f32 {
    match node.kind {
        NodeKind::Ptm(_) => config.physics.ptm_radius,
        NodeKind::PtmSummary(_) => config.labels.summary_radius,
        _ => config.labels.circle_radius,
    }
}

/// Recomputes every derived shape from the current positions.
pub fn update_geometry(graph: &mut Graph, labels: &LabelMetrics) {
    update_extents(graph, labels);
    update_groups(graph, labels);
    update_links(graph, labels);
}

fn update_extents(graph: &mut Graph, labels: &LabelMetrics) {
    for node in &mut graph.nodes {
        let geometry = &mut node.geometry;
        match geometry.shape {
            NodeShape::Circle => {
                geometry.label_width = 0.0;
                geometry.left_x = node.pos.x;
                geometry.right_x = node.pos.x;
            }
            NodeShape::Rectangle => {
                let width = labels.label_width(node.kind.label());
                geometry.label_width = width;
                geometry.left_x = node.pos.x - width * 0.5;
                geometry.right_x = node.pos.x + width * 0.5;
            }
            // Filled in from the hull below.
            NodeShape::Polygon => {}
        }
    }
}

fn update_groups(graph: &mut Graph, labels: &LabelMetrics) {
    for index in 0..graph.nodes.len() {
        let NodeKind::Group(group) = &graph.nodes[index].kind else {
            continue;
        };

        let mut corners = Vec::with_capacity(group.components.len() * 4);
        let mut position_sum = Vec2::ZERO;
        let mut member_count = 0usize;
        for &member in &group.components {
            let node = graph.node(member);
            if !node.visible {
                continue;
            }
            let top = node.pos.y - labels.half_height;
            let bottom = node.pos.y + labels.half_height;
            for x in [node.geometry.left_x, node.geometry.right_x] {
                corners.push(vec2(x, top));
                corners.push(vec2(x, bottom));
            }
            position_sum += node.pos;
            member_count += 1;
        }

        let hull = convex_hull(corners);
        let centroid = polygon_centroid(&hull);
        let bounds = bounding_rect(&hull);
        let anchor = (member_count > 0).then(|| position_sum / member_count as f32);

        let node = &mut graph.nodes[index];
        if let Some(anchor) = anchor {
            node.pos = anchor;
            node.fixed = Some(anchor);
        }
        node.velocity = Vec2::ZERO;
        match bounds {
            Some(bounds) => {
                node.geometry.left_x = bounds.min.x;
                node.geometry.right_x = bounds.max.x;
            }
            None => {
                node.geometry.left_x = node.pos.x;
                node.geometry.right_x = node.pos.x;
            }
        }
        if let NodeKind::Group(group) = &mut node.kind {
            group.hull = hull;
            group.centroid = centroid;
            group.bounds = bounds;
        }
    }
}

fn update_links(graph: &mut Graph, labels: &LabelMetrics) {
    // Anchors resolve in one hop, so plain links are placed first.
    for anchored_pass in [false, true] {
        for index in 0..graph.links.len() {
            let link = &graph.links[index];
            if link.has_anchor() != anchored_pass {
                continue;
            }
            let Some((source, target)) = link.endpoints() else {
                continue;
            };

            let source_box = endpoint_box(graph, source, labels);
            let target_box = endpoint_box(graph, target, labels);
            let (from, to) = connect(&source_box, &target_box, labels);
            let geometry = rim_offset(from, to, link.is_undirected(), labels);
            graph.links[index].geometry = geometry;
        }
    }
}

/// Horizontal and vertical footprint of one link endpoint.
#[derive(Clone, Copy, Debug)]
struct EndpointBox {
    center: Vec2,
    x: (f32, f32),
    y: (f32, f32),
    group: bool,
    labeled: bool,
}

fn endpoint_box(graph: &Graph, endpoint: Endpoint, labels: &LabelMetrics) -> EndpointBox {
    match endpoint {
        Endpoint::Link(LinkIdx(index)) => {
            let center = graph.links[index].geometry.midpoint();
            EndpointBox {
                center,
                x: (center.x, center.x),
                y: (center.y, center.y),
                group: false,
                labeled: false,
            }
        }
        Endpoint::Node(NodeIdx(index)) => {
            let node = &graph.nodes[index];
            let x = (node.geometry.left_x, node.geometry.right_x);
            match (&node.kind, node.geometry.shape) {
                (NodeKind::Group(group), _) => {
                    let y = group
                        .bounds
                        .map_or((node.pos.y, node.pos.y), |bounds| (bounds.min.y, bounds.max.y));
                    EndpointBox {
                        center: group.centroid.unwrap_or(node.pos),
                        x,
                        y,
                        group: true,
                        labeled: false,
                    }
                }
                (_, NodeShape::Rectangle) => EndpointBox {
                    center: node.pos,
                    x,
                    y: (node.pos.y - labels.half_height, node.pos.y + labels.half_height),
                    group: false,
                    labeled: true,
                },
                _ => EndpointBox {
                    center: node.pos,
                    x,
                    y: (node.pos.y, node.pos.y),
                    group: false,
                    labeled: false,
                },
            }
        }
    }
}

/// Connects two ranges at their facing extents, or at the middle of their overlap.
pub(crate) fn connect_axis(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    if a.1 < b.0 {
        (a.1, b.0)
    } else if b.1 < a.0 {
        (a.0, b.1)
    } else {
        let middle = (a.0.max(b.0) + a.1.min(b.1)) * 0.5;
        (middle, middle)
    }
}

fn clamp_into(value: f32, range: (f32, f32)) -> f32 {
    value.max(range.0).min(range.1)
}

fn connect(a: &EndpointBox, b: &EndpointBox, labels: &LabelMetrics) -> (Vec2, Vec2) {
    match (a.group, b.group) {
        (true, true) => {
            let (ax, bx) = connect_axis(a.x, b.x);
            let (ay, by) = connect_axis(a.y, b.y);
            (vec2(ax, ay), vec2(bx, by))
        }
        (true, false) | (false, true) => {
            let (ay, by) = connect_axis(a.y, b.y);
            let (ax, bx) = if ay == by {
                connect_axis(a.x, b.x)
            } else {
                (clamp_into(b.center.x, a.x), clamp_into(a.center.x, b.x))
            };
            (vec2(ax, ay), vec2(bx, by))
        }
        (false, false) => {
            let (ax, bx) = connect_axis(a.x, b.x);
            let (mut ay, mut by) = (a.center.y, b.center.y);
            // Stacked labels meet at their top and bottom edges.
            if ax == bx && a.labeled && b.labeled {
                let direction = if ay <= by { 1.0 } else { -1.0 };
                ay += direction * labels.half_height;
                by -= direction * labels.half_height;
            }
            (vec2(ax, ay), vec2(bx, by))
        }
    }
}

fn rim_offset(source: Vec2, target: Vec2, undirected: bool, labels: &LabelMetrics) -> LinkGeometry {
    let delta = target - source;
    let length = delta.length();
    if length <= f32::EPSILON {
        return LinkGeometry {
            source,
            target,
            rim_source: source,
            rim_target: target,
        };
    }

    let direction = delta / length;
    let outline = labels.outline_half_thickness;
    let clearance = if undirected {
        outline
    } else {
        outline + labels.arrow_clearance
    };
    LinkGeometry {
        source,
        target,
        rim_source: source + direction * outline,
        rim_target: target - direction * clearance,
    }
}

fn convex_hull(mut points: Vec<Vec2>) -> Vec<Vec2> {
    points.sort_by(|a, b| match a.x.total_cmp(&b.x) {
        Ordering::Equal => a.y.total_cmp(&b.y),
        other => other,
    });
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut lower: Vec<Vec2> = Vec::with_capacity(points.len());
    for &point in &points {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], point) <= 0.0 {
            lower.pop();
        }
        lower.push(point);
    }

    let mut upper: Vec<Vec2> = Vec::with_capacity(points.len());
    for &point in points.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], point) <= 0.0 {
            upper.pop();
        }
        upper.push(point);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn polygon_centroid(hull: &[Vec2]) -> Option<Vec2> {
    if hull.is_empty() {
        return None;
    }

    let mut twice_area = 0.0;
    let mut weighted = Vec2::ZERO;
    for (i, &current) in hull.iter().enumerate() {
        let next = hull[(i + 1) % hull.len()];
        let cross = current.x * next.y - next.x * current.y;
        twice_area += cross;
        weighted += (current + next) * cross;
    }

    if twice_area.abs() <= f32::EPSILON {
        let sum = hull.iter().fold(Vec2::ZERO, |sum, &point| sum + point);
        return Some(sum / hull.len() as f32);
    }
    Some(weighted / (3.0 * twice_area))
}

fn bounding_rect(points: &[Vec2]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect::from_min_max(pos2(first.x, first.y), pos2(first.x, first.y));
    for point in &points[1..] {
        rect.extend_with(pos2(point.x, point.y));
    }
    Some(rect)
}

/// Even-odd containment test; an empty or degenerate polygon contains nothing.
pub fn polygon_contains(polygon: &[Vec2], point: Vec2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = polygon[polygon.len() - 1];
    for &current in polygon {
        if (current.y > point.y) != (previous.y > point.y) {
            let crossing_x =
                (previous.x - current.x) * (point.y - current.y) / (previous.y - current.y) + current.x;
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// Whether `point` (world space) falls on the drawn shape of `node`.
pub fn node_contains(node: &Node, point: Vec2, config: &EngineConfig) -> bool {
    match (&node.kind, node.geometry.shape) {
        (NodeKind::Group(group), _) => polygon_contains(&group.hull, point),
        (_, NodeShape::Rectangle) => {
            let half_height = config.labels.half_height;
            Rect::from_min_max(
                pos2(node.geometry.left_x, node.pos.y - half_height),
                pos2(node.geometry.right_x, node.pos.y + half_height),
            )
            .contains(pos2(point.x, point.y))
        }
        _ => (point - node.pos).length() <= circle_radius(node, config),
    }
}
