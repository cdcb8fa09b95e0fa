use eframe::egui::Pos2;

use crate::model::NodeId;
use crate::render::EdgeShape;

use super::interaction::DragState;
use super::labels::{Emphasis, label_text};
use super::GraphView;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeTone {
    Normal,
    Hovered,
    Candidate,
    Focused,
    Unfocused,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeTone {
    Normal,
    Hovered,
    Unfocused,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawNode {
    pub id: NodeId,
    pub center: Pos2,
    pub radius: f32,
    pub tone: NodeTone,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawEdge {
    pub shape: EdgeShape,
    pub tone: EdgeTone,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawLabel {
    pub anchor: Pos2,
    pub text: String,
    pub opacity: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub edges: Vec<DrawEdge>,
    pub nodes: Vec<DrawNode>,
    pub labels: Vec<DrawLabel>,
    pub guide: Option<[Pos2; 2]>,
}

impl GraphView {
    pub fn draw_list(&self, now: f64) -> DrawList {
        let radius = self.config.node_radius;
        let hovered = self.hover.as_ref().filter(|_| self.drag.is_idle());
        let candidate = self.drag.candidate();

        let edges = self
            .scene
            .edges(now)
            .map(|frame| {
                let key = frame.key;
                let tone = if hovered.is_some_and(|id| *id == key.source || *id == key.target) {
                    EdgeTone::Hovered
                } else if self.highlight.edge(&key.source, &key.target) == Emphasis::Unfocused {
                    EdgeTone::Unfocused
                } else {
                    EdgeTone::Normal
                };
                DrawEdge {
                    shape: *frame.shape,
                    tone,
                    opacity: frame.presence,
                }
            })
            .collect();

        let mut nodes = Vec::new();
        let mut labels = Vec::new();
        for frame in self.scene.nodes(now) {
            let emphasis = self.highlight.node(frame.id);
            let tone = if candidate == Some(frame.id) {
                NodeTone::Candidate
            } else if hovered == Some(frame.id) {
                NodeTone::Hovered
            } else {
                match emphasis {
                    Emphasis::Focused => NodeTone::Focused,
                    Emphasis::Unfocused => NodeTone::Unfocused,
                    Emphasis::Default => NodeTone::Normal,
                }
            };
            let scale = match tone {
                NodeTone::Candidate | NodeTone::Focused => 2.0,
                _ => 1.0,
            };
            // Exiting nodes shrink away instead of fading.
            let (node_radius, opacity) = if frame.exiting {
                (radius * scale * frame.presence, 1.0)
            } else {
                (radius * scale, frame.presence)
            };

            if !frame.exiting
                && let Some(index) = self.model.index_of(frame.id.as_str())
            {
                let node = &self.model.nodes()[index];
                if node.show_text {
                    let text = label_text(node, index, &self.label_selector);
                    if !text.is_empty() {
                        labels.push(DrawLabel {
                            anchor: frame.center,
                            text,
                            opacity,
                        });
                    }
                }
            }

            nodes.push(DrawNode {
                id: frame.id.clone(),
                center: frame.center,
                radius: node_radius,
                tone,
                opacity,
            });
        }

        let guide = match &self.drag {
            DragState::Idle => None,
            DragState::PlacingEdge {
                source, pointer, ..
            } => self
                .model
                .node(source.as_str())
                .map(|node| [node.position.to_pos2(), *pointer]),
        };

        DrawList {
            edges,
            nodes,
            labels,
            guide,
        }
    }
}
