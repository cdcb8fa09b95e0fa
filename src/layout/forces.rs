use eframe::egui::{Vec2, vec2};

use crate::model::Node;
use crate::util::Jiggle;

use super::quadtree::QuadNode;

#[derive(Clone, Copy, Debug)]
pub(super) struct ManyBodyParams {
    pub(super) strength: f32,
    pub(super) theta: f32,
    pub(super) distance_min_sq: f32,
    pub(super) distance_max_sq: f32,
}

pub(super) fn accumulate_many_body(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ManyBodyParams,
    alpha: f32,
    jiggle: &mut Jiggle,
    velocity: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.indices {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            let mut distance_sq = delta.length_sq();
            if distance_sq >= params.distance_max_sq {
                continue;
            }
            if delta.x == 0.0 {
                delta.x = jiggle.next();
                distance_sq += delta.x * delta.x;
            }
            if delta.y == 0.0 {
                delta.y = jiggle.next();
                distance_sq += delta.y * delta.y;
            }
            if distance_sq < params.distance_min_sq {
                distance_sq = (params.distance_min_sq * distance_sq).sqrt();
            }
            *velocity += delta * (params.strength * alpha / distance_sq);
        }
        return;
    }

    let delta = cell.center_of_mass - point;
    let distance_sq = delta.length_sq();
    let side = cell.bounds.side_length();
    let far_enough = !cell.bounds.contains(point)
        && (side * side) / (params.theta * params.theta) < distance_sq;

    if far_enough {
        if distance_sq < params.distance_max_sq {
            let distance_sq = if distance_sq < params.distance_min_sq {
                (params.distance_min_sq * distance_sq).sqrt()
            } else {
                distance_sq
            };
            *velocity += delta * (params.strength * cell.mass * alpha / distance_sq);
        }
        return;
    }

    for child in cell.children() {
        accumulate_many_body(child, index, positions, params, alpha, jiggle, velocity);
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct CollideParams {
    pub(super) radius: f32,
    pub(super) strength: f32,
}

/// Pushes overlapping circles apart. Works on predicted positions
/// (`position + velocity`) and writes into `deltas`, applied by the caller.
pub(super) fn accumulate_collisions(
    cell_a: &QuadNode,
    cell_b: &QuadNode,
    same_cell: bool,
    predicted: &[Vec2],
    params: CollideParams,
    jiggle: &mut Jiggle,
    deltas: &mut [Vec2],
) {
    let reach = params.radius * 2.0;
    if cell_a.bounds.distance_sq_to(cell_b.bounds) > reach * reach {
        return;
    }

    if cell_a.is_leaf() && cell_b.is_leaf() {
        if same_cell {
            for (offset, &from) in cell_a.indices.iter().enumerate() {
                for &to in &cell_a.indices[offset + 1..] {
                    separate_pair(from, to, predicted, params, jiggle, deltas);
                }
            }
        } else {
            for &from in &cell_a.indices {
                for &to in &cell_b.indices {
                    separate_pair(from, to, predicted, params, jiggle, deltas);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = cell_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collisions(child_a, child_a, true, predicted, params, jiggle, deltas);
            for child_b in &children[offset + 1..] {
                accumulate_collisions(child_a, child_b, false, predicted, params, jiggle, deltas);
            }
        }
        return;
    }

    let split_a = if cell_a.is_leaf() {
        false
    } else if cell_b.is_leaf() {
        true
    } else {
        cell_a.bounds.half_extent >= cell_b.bounds.half_extent
    };

    if split_a {
        for child in cell_a.children() {
            accumulate_collisions(child, cell_b, false, predicted, params, jiggle, deltas);
        }
    } else {
        for child in cell_b.children() {
            accumulate_collisions(cell_a, child, false, predicted, params, jiggle, deltas);
        }
    }
}

fn separate_pair(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    params: CollideParams,
    jiggle: &mut Jiggle,
    deltas: &mut [Vec2],
) {
    let min_distance = params.radius * 2.0;
    let mut delta = predicted[from] - predicted[to];
    if delta.x == 0.0 {
        delta.x = jiggle.next();
    }
    if delta.y == 0.0 {
        delta.y = jiggle.next();
    }

    let distance = delta.length();
    if distance >= min_distance {
        return;
    }

    // Equal radii: the push is shared evenly between both nodes.
    let push = delta * ((min_distance - distance) / distance * params.strength * 0.5);
    deltas[from] += push;
    deltas[to] -= push;
}

#[derive(Clone, Copy, Debug)]
pub(super) struct LinkParams {
    pub(super) distance: f32,
}

pub(super) fn apply_links(
    nodes: &mut [Node],
    links: &[(usize, usize)],
    params: LinkParams,
    alpha: f32,
    jiggle: &mut Jiggle,
) {
    let mut counts = vec![0usize; nodes.len()];
    for &(source, target) in links {
        counts[source] += 1;
        counts[target] += 1;
    }

    for &(source, target) in links {
        if source == target {
            continue;
        }

        let source_next = nodes[source].position + nodes[source].velocity;
        let target_next = nodes[target].position + nodes[target].velocity;
        let mut delta = target_next - source_next;
        if delta.x == 0.0 {
            delta.x = jiggle.next();
        }
        if delta.y == 0.0 {
            delta.y = jiggle.next();
        }

        let distance = delta.length();
        let strength = 1.0 / counts[source].min(counts[target]).max(1) as f32;
        let bias = counts[source] as f32 / (counts[source] + counts[target]) as f32;
        let correction = delta * ((distance - params.distance) / distance * alpha * strength);

        nodes[target].velocity -= correction * bias;
        nodes[source].velocity += correction * (1.0 - bias);
    }
}

pub(super) fn apply_center(nodes: &mut [Node], center: Vec2) {
    if nodes.is_empty() {
        return;
    }

    let centroid = nodes
        .iter()
        .fold(Vec2::ZERO, |sum, node| sum + node.position)
        / nodes.len() as f32;
    let shift = centroid - center;
    if shift.length_sq() <= f32::EPSILON {
        return;
    }

    for node in nodes {
        node.position -= shift;
    }
}

pub(super) fn apply_baseline(nodes: &mut [Node], baseline: f32, strength: f32, alpha: f32) {
    for node in nodes {
        node.velocity += vec2(0.0, (baseline - node.position.y) * strength * alpha);
    }
}
