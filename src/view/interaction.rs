use std::fmt;

use eframe::egui::Pos2;
use log::{debug, info, warn};
use serde_json::Value;

use crate::error::GraphError;
use crate::model::{Node, NodeId};

use super::detail::{DetailSink, NodeDetails};
use super::{DeferredTask, GraphView};

const DEFAULT_YEAR: u32 = 2023;

#[derive(Clone, Debug, PartialEq)]
pub enum DragState {
    Idle,
    PlacingEdge {
        source: NodeId,
        candidate: Option<NodeId>,
        /// Set when the press pinned the source, so release knows to unpin it.
        auto_pinned: bool,
        pointer: Pos2,
    },
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn source(&self) -> Option<&NodeId> {
        match self {
            Self::Idle => None,
            Self::PlacingEdge { source, .. } => Some(source),
        }
    }

    pub fn candidate(&self) -> Option<&NodeId> {
        match self {
            Self::Idle => None,
            Self::PlacingEdge { candidate, .. } => candidate.as_ref(),
        }
    }

    pub(super) fn involves(&self, id: &str) -> bool {
        self.source().is_some_and(|source| source.as_str() == id)
            || self.candidate().is_some_and(|candidate| candidate.as_str() == id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    Click(Pos2),
    Press { node: NodeId, pos: Pos2 },
    Move(Pos2),
    Enter(NodeId),
    Leave(NodeId),
    Release,
}

/// Rejected edge placements. The host shows these and blocks the canvas
/// until they are acknowledged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    SelfLoop,
    DuplicateEdge,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop => f.write_str("Self loops not allowed"),
            Self::DuplicateEdge => f.write_str("Edge already exists"),
        }
    }
}

impl GraphView {
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn hovered(&self) -> Option<&NodeId> {
        self.hover.as_ref()
    }

    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        now: f64,
        sink: &mut dyn DetailSink,
    ) -> Option<Notice> {
        self.clock = now;

        match event {
            PointerEvent::Click(pos) => {
                self.add_node_at(pos);
                None
            }
            PointerEvent::Press { node, pos } => {
                self.begin_edge(node, pos, sink);
                None
            }
            PointerEvent::Move(pos) => {
                if let DragState::PlacingEdge { pointer, .. } = &mut self.drag {
                    *pointer = pos;
                }
                None
            }
            PointerEvent::Enter(node) => {
                match &mut self.drag {
                    // The source itself can become the candidate; releasing
                    // on it is reported as a self loop.
                    DragState::PlacingEdge { candidate, .. } => *candidate = Some(node),
                    DragState::Idle => self.hover_in(node, sink),
                }
                None
            }
            PointerEvent::Leave(node) => {
                match &mut self.drag {
                    DragState::PlacingEdge { candidate, .. } => {
                        if candidate.as_ref() == Some(&node) {
                            *candidate = None;
                        }
                        if self.hover.as_ref() == Some(&node) {
                            self.hover = None;
                        }
                    }
                    DragState::Idle => self.hover_out(&node, sink),
                }
                None
            }
            PointerEvent::Release => self.release(),
        }
    }

    fn add_node_at(&mut self, pos: Pos2) {
        if !self.drag.is_idle() || !self.click_to_add_armed() || self.node_at(pos).is_some() {
            return;
        }

        let id = self.next_free_id();
        let mut node = Node::new(id.clone(), pos.to_vec2());
        node.attributes
            .insert("year".to_owned(), Value::from(DEFAULT_YEAR));
        if let Err(error) = self.model.add_node(node) {
            warn!("click-to-add skipped: {error}");
            return;
        }

        info!("added node {id} at ({:.1}, {:.1})", pos.x, pos.y);
        self.redraw();
    }

    fn begin_edge(&mut self, source: NodeId, pos: Pos2, sink: &mut dyn DetailSink) {
        if !self.drag_to_connect || !self.drag.is_idle() {
            return;
        }

        let pin = self.layout.mode().is_force();
        let Some(node) = self.model.node_mut(source.as_str()) else {
            return;
        };
        let auto_pinned = pin && !node.is_pinned();
        if auto_pinned {
            node.pin_at_current_position();
        }

        // Hover is suspended while the gesture owns the pointer.
        if self.hover.take().is_some() {
            sink.clear();
        }
        self.click_to_add.armed = false;
        self.cancel(DeferredTask::RearmClickToAdd);
        debug!("placing edge from {source}");
        self.drag = DragState::PlacingEdge {
            source,
            candidate: None,
            auto_pinned,
            pointer: pos,
        };
    }

    fn release(&mut self) -> Option<Notice> {
        let DragState::PlacingEdge {
            source, candidate, ..
        } = &self.drag
        else {
            return None;
        };
        let source = source.clone();
        let candidate = candidate.clone();

        let mut connected = false;
        let notice = match candidate {
            None => {
                debug!("edge placement from {source} cancelled");
                None
            }
            Some(target) => match self.model.add_edge(source.as_str(), target.as_str()) {
                Ok(()) => {
                    info!("connected {source} -> {target}");
                    connected = true;
                    None
                }
                Err(GraphError::SelfLoop(_)) => Some(Notice::SelfLoop),
                Err(GraphError::DuplicateEdge { .. }) => Some(Notice::DuplicateEdge),
                Err(error) => {
                    warn!("edge placement failed: {error}");
                    None
                }
            },
        };

        self.finish_drag();
        if connected {
            self.redraw();
        }
        notice
    }

    pub(super) fn finish_drag(&mut self) {
        let previous = std::mem::replace(&mut self.drag, DragState::Idle);
        if let DragState::PlacingEdge {
            source,
            auto_pinned: true,
            ..
        } = previous
            && let Some(node) = self.model.node_mut(source.as_str())
        {
            node.unpin();
        }
        self.schedule(
            DeferredTask::RearmClickToAdd,
            self.config.click_rearm_delay_secs,
        );
    }

    fn hover_in(&mut self, id: NodeId, sink: &mut dyn DetailSink) {
        let Some(index) = self.model.index_of(id.as_str()) else {
            return;
        };
        sink.publish(NodeDetails::from_node(&self.model.nodes()[index], index));
        self.hover = Some(id);
    }

    fn hover_out(&mut self, id: &NodeId, sink: &mut dyn DetailSink) {
        if self.hover.as_ref() == Some(id) {
            self.hover = None;
        }
        sink.clear();
    }
}
