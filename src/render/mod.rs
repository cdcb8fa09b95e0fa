mod arc;

use std::collections::HashMap;

use eframe::egui::{Pos2, pos2};
use log::trace;

use crate::layout::LayoutMode;
use crate::model::{Edge, GraphModel, NodeId};

pub use arc::ArcGeometry;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportBounds {
    pub width: f32,
    pub vertical_bound: f32,
    pub radius: f32,
}

/// Keeps every node inside the drawable area. The clamped value is written
/// back, so the next step starts from it.
pub fn clamp_positions(model: &mut GraphModel, bounds: ViewportBounds) {
    let r = bounds.radius;
    for node in model.nodes_mut() {
        node.position.x = node.position.x.min(bounds.width - r).max(r);
        node.position.y = node.position.y.min(bounds.vertical_bound - r).max(r);
    }
}

pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Presence {
    Entering { since: f64 },
    Present,
    Exiting { since: f64 },
}

impl Presence {
    pub fn is_exiting(self) -> bool {
        matches!(self, Self::Exiting { .. })
    }

    fn factor(self, now: f64, duration: f64) -> f32 {
        match self {
            Self::Entering { since } => ease_cubic_in_out(progress(since, now, duration)),
            Self::Present => 1.0,
            Self::Exiting { since } => 1.0 - ease_cubic_in_out(progress(since, now, duration)),
        }
    }
}

fn progress(since: f64, now: f64, duration: f64) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    ((now - since) / duration).clamp(0.0, 1.0) as f32
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Motion {
    from: Pos2,
    since: f64,
}

#[derive(Clone, Debug)]
struct NodeVisual {
    id: NodeId,
    center: Pos2,
    motion: Option<Motion>,
    presence: Presence,
}

impl NodeVisual {
    fn drawn_center(&self, now: f64, duration: f64) -> Pos2 {
        match self.motion {
            Some(motion) => {
                let t = ease_cubic_in_out(progress(motion.since, now, duration));
                motion.from.lerp(self.center, t)
            }
            None => self.center,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub source: NodeId,
    pub target: NodeId,
}

impl From<&Edge> for EdgeKey {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source.clone(),
            target: edge.target.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeShape {
    Line { from: Pos2, to: Pos2 },
    Arc(ArcGeometry),
}

impl EdgeShape {
    fn is_line(&self) -> bool {
        matches!(self, Self::Line { .. })
    }
}

#[derive(Clone, Debug)]
struct EdgeVisual {
    key: EdgeKey,
    shape: EdgeShape,
    presence: Presence,
}

#[derive(Clone, Copy, Debug)]
pub struct NodeFrame<'a> {
    pub id: &'a NodeId,
    pub center: Pos2,
    /// 0 when fully faded out, 1 when fully shown.
    pub presence: f32,
    pub exiting: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct EdgeFrame<'a> {
    pub key: &'a EdgeKey,
    pub shape: &'a EdgeShape,
    pub presence: f32,
    pub exiting: bool,
}

/// Visual counterpart of the model, reconciled by key on every rebind.
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<NodeVisual>,
    edges: Vec<EdgeVisual>,
    transition_secs: f64,
}

impl Scene {
    pub fn new(transition_secs: f64) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            transition_secs,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn rebind(&mut self, model: &GraphModel, mode: &LayoutMode, now: f64) {
        self.rebind_nodes(model, mode, now);
        self.rebind_edges(model, mode, now);
        trace!(
            "scene rebound: {} node visuals, {} edge visuals",
            self.nodes.len(),
            self.edges.len()
        );
    }

    fn rebind_nodes(&mut self, model: &GraphModel, mode: &LayoutMode, now: f64) {
        let duration = self.transition_secs;
        let mut previous = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>();
        let slot_by_id = previous
            .iter()
            .enumerate()
            .filter_map(|(slot, visual)| visual.as_ref().map(|visual| (visual.id.clone(), slot)))
            .collect::<HashMap<_, _>>();

        let mut next = Vec::with_capacity(model.node_count());
        for node in model.nodes() {
            let target = pos2(node.position.x, node.position.y);
            let reused = slot_by_id
                .get(&node.id)
                .and_then(|&slot| previous[slot].take())
                .filter(|visual| !visual.presence.is_exiting());

            let visual = match reused {
                Some(mut visual) => {
                    visual.motion = match mode {
                        LayoutMode::Force => None,
                        LayoutMode::Linear(_) => Some(Motion {
                            from: visual.drawn_center(now, duration),
                            since: now,
                        }),
                    };
                    visual.center = target;
                    visual
                }
                None => NodeVisual {
                    id: node.id.clone(),
                    center: target,
                    motion: None,
                    presence: Presence::Entering { since: now },
                },
            };
            next.push(visual);
        }

        for mut visual in previous.into_iter().flatten() {
            if model.contains_node(visual.id.as_str()) && visual.presence.is_exiting() {
                continue;
            }
            if !visual.presence.is_exiting() {
                visual.center = visual.drawn_center(now, duration);
                visual.motion = None;
                visual.presence = Presence::Exiting { since: now };
            }
            next.push(visual);
        }

        self.nodes = next;
    }

    fn rebind_edges(&mut self, model: &GraphModel, mode: &LayoutMode, now: f64) {
        let mut previous = std::mem::take(&mut self.edges)
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>();
        let slot_by_key = previous
            .iter()
            .enumerate()
            .filter_map(|(slot, visual)| visual.as_ref().map(|visual| (visual.key.clone(), slot)))
            .collect::<HashMap<_, _>>();

        let mut next = Vec::with_capacity(model.edge_count());
        let mut retired = Vec::new();
        for edge in model.edges() {
            let Some(shape) = edge_shape(model, edge, mode) else {
                continue;
            };
            let key = EdgeKey::from(edge);
            let previous_visual = slot_by_key
                .get(&key)
                .and_then(|&slot| previous[slot].take());

            let visual = match previous_visual {
                Some(mut visual)
                    if !visual.presence.is_exiting()
                        && visual.shape.is_line() == shape.is_line() =>
                {
                    visual.shape = shape;
                    visual
                }
                other => {
                    retired.extend(other);
                    EdgeVisual {
                        key,
                        shape,
                        presence: Presence::Entering { since: now },
                    }
                }
            };
            next.push(visual);
        }

        let linear = !mode.is_force();
        for mut visual in previous.into_iter().flatten().chain(retired) {
            // Straight segments mean nothing once x is pinned.
            if linear && visual.shape.is_line() {
                continue;
            }
            if !visual.presence.is_exiting() {
                visual.presence = Presence::Exiting { since: now };
            }
            next.push(visual);
        }

        self.edges = next;
    }

    /// Moves visuals onto the current node positions without any transition.
    pub fn sync(&mut self, model: &GraphModel) {
        for visual in &mut self.nodes {
            if visual.presence.is_exiting() {
                continue;
            }
            if let Some(node) = model.node(visual.id.as_str()) {
                visual.center = pos2(node.position.x, node.position.y);
            }
        }

        for visual in &mut self.edges {
            if visual.presence.is_exiting() {
                continue;
            }
            let (Some(source), Some(target)) = (
                model.node(visual.key.source.as_str()),
                model.node(visual.key.target.as_str()),
            ) else {
                continue;
            };
            match &mut visual.shape {
                EdgeShape::Line { from, to } => {
                    *from = pos2(source.position.x, source.position.y);
                    *to = pos2(target.position.x, target.position.y);
                }
                // Unpinned nodes can drift sideways under collision.
                EdgeShape::Arc(arc) => {
                    *arc = ArcGeometry::between(
                        source.fx.unwrap_or(source.position.x),
                        target.fx.unwrap_or(target.position.x),
                        arc.start.y,
                    );
                }
            }
        }
    }

    /// Settles finished transitions and drops fully faded visuals.
    pub fn prune(&mut self, now: f64) {
        let duration = self.transition_secs;
        let finished = |presence: Presence| match presence {
            Presence::Entering { since } | Presence::Exiting { since } => {
                progress(since, now, duration) >= 1.0
            }
            Presence::Present => false,
        };

        self.nodes.retain(|visual| !(visual.presence.is_exiting() && finished(visual.presence)));
        for visual in &mut self.nodes {
            if finished(visual.presence) {
                visual.presence = Presence::Present;
            }
            if visual
                .motion
                .is_some_and(|motion| progress(motion.since, now, duration) >= 1.0)
            {
                visual.motion = None;
            }
        }

        self.edges.retain(|visual| !(visual.presence.is_exiting() && finished(visual.presence)));
        for visual in &mut self.edges {
            if finished(visual.presence) {
                visual.presence = Presence::Present;
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        self.nodes
            .iter()
            .any(|visual| visual.presence != Presence::Present || visual.motion.is_some())
            || self
                .edges
                .iter()
                .any(|visual| visual.presence != Presence::Present)
    }

    pub fn nodes(&self, now: f64) -> impl Iterator<Item = NodeFrame<'_>> {
        let duration = self.transition_secs;
        self.nodes.iter().map(move |visual| NodeFrame {
            id: &visual.id,
            center: visual.drawn_center(now, duration),
            presence: visual.presence.factor(now, duration),
            exiting: visual.presence.is_exiting(),
        })
    }

    pub fn edges(&self, now: f64) -> impl Iterator<Item = EdgeFrame<'_>> {
        let duration = self.transition_secs;
        self.edges.iter().map(move |visual| EdgeFrame {
            key: &visual.key,
            shape: &visual.shape,
            presence: visual.presence.factor(now, duration),
            exiting: visual.presence.is_exiting(),
        })
    }

    pub fn node_visual_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_visual_count(&self) -> usize {
        self.edges.len()
    }
}

fn edge_shape(model: &GraphModel, edge: &Edge, mode: &LayoutMode) -> Option<EdgeShape> {
    let source = model.node(edge.source.as_str())?;
    let target = model.node(edge.target.as_str())?;
    Some(match mode {
        LayoutMode::Force => EdgeShape::Line {
            from: pos2(source.position.x, source.position.y),
            to: pos2(target.position.x, target.position.y),
        },
        LayoutMode::Linear(layout) => EdgeShape::Arc(ArcGeometry::between(
            source.fx.unwrap_or(source.position.x),
            target.fx.unwrap_or(target.position.x),
            layout.baseline,
        )),
    })
}
