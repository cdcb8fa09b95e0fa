mod detail;
mod draw;
mod interaction;
mod labels;

use std::collections::HashSet;

use eframe::egui::{Pos2, Vec2};
use log::{debug, info, warn};
use serde_json::Value;

use crate::config::ViewConfig;
use crate::error::GraphError;
use crate::layout::{LayoutEngine, LayoutMode};
use crate::model::{Edge, GraphModel, LoadReport, NodeField, NodeId, RawEdge, RawNode, RemovedNode};
use crate::render::{Scene, ViewportBounds, clamp_positions};

pub use detail::{DetailSink, DetailSlot, NodeDetails};
pub use draw::{DrawEdge, DrawLabel, DrawList, DrawNode, EdgeTone, NodeTone};
pub use interaction::{DragState, Notice, PointerEvent};
pub use labels::{Emphasis, Highlight, LabelField, label_text};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepLoop {
    pub vertical_bound: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredTask {
    StartLinearSimulation,
    RearmClickToAdd,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Deferred {
    due: f64,
    task: DeferredTask,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ClickToAdd {
    enabled: bool,
    armed: bool,
}

/// Owns the graph, its layout and its visuals, and applies every edit.
/// Driven by the host's frame loop through [`GraphView::tick`].
pub struct GraphView {
    config: ViewConfig,
    viewport: Vec2,
    model: GraphModel,
    layout: LayoutEngine,
    scene: Scene,
    step_loop: Option<StepLoop>,
    deferred: Vec<Deferred>,
    drag: DragState,
    hover: Option<NodeId>,
    highlight: Highlight,
    label_selector: String,
    click_to_add: ClickToAdd,
    drag_to_connect: bool,
    next_node_id: u64,
    clock: f64,
}

impl GraphView {
    pub fn new(config: ViewConfig, viewport: Vec2) -> Self {
        Self {
            layout: LayoutEngine::new(config, viewport),
            scene: Scene::new(config.transition_secs),
            config,
            viewport,
            model: GraphModel::new(),
            step_loop: None,
            deferred: Vec::new(),
            drag: DragState::Idle,
            hover: None,
            highlight: Highlight::default(),
            label_selector: LabelField::Name.selector().to_owned(),
            click_to_add: ClickToAdd::default(),
            drag_to_connect: false,
            next_node_id: 0,
            clock: 0.0,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn mode(&self) -> &LayoutMode {
        self.layout.mode()
    }

    pub fn step_loop(&self) -> Option<StepLoop> {
        self.step_loop
    }

    pub fn is_simulating(&self) -> bool {
        self.step_loop.is_some() && self.layout.simulation().is_running()
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = DeferredTask> + '_ {
        self.deferred.iter().map(|deferred| deferred.task)
    }

    pub fn label_selector(&self) -> &str {
        &self.label_selector
    }

    pub fn set_label_selector(&mut self, selector: impl Into<String>) {
        self.label_selector = selector.into();
    }

    pub fn load(&mut self, nodes: &[RawNode], edges: &[RawEdge]) -> LoadReport {
        self.step_loop = None;
        self.deferred.clear();
        self.drag = DragState::Idle;
        self.hover = None;
        self.highlight.clear();

        let report = self.model.load(nodes, edges, self.viewport * 0.5);
        for rejected in &report.rejected {
            warn!("{rejected}");
        }
        self.next_node_id = self.model.node_count() as u64;
        if self.click_to_add.enabled {
            self.click_to_add.armed = true;
        }

        self.layout.reset_force_directed();
        self.scene.clear();
        self.scene.rebind(&self.model, self.layout.mode(), self.clock);
        self.layout.simulation_mut().restart();
        self.start_layout_step(self.viewport.y);

        info!(
            "graph loaded with {} nodes and {} edges",
            report.node_count, report.edge_count
        );
        report
    }

    pub fn redraw(&mut self) {
        self.scene.rebind(&self.model, self.layout.mode(), self.clock);

        let reheat = self.config.forces.reheat_alpha;
        match self.layout.mode() {
            LayoutMode::Force => {
                self.layout.simulation_mut().reheat(reheat);
                if self.step_loop.is_none() {
                    self.start_layout_step(self.viewport.y);
                }
            }
            LayoutMode::Linear(_) => {
                if !self.is_pending(DeferredTask::StartLinearSimulation) {
                    self.layout.simulation_mut().reheat(reheat);
                }
            }
        }
    }

    pub fn start_layout_step(&mut self, vertical_bound: f32) {
        if let Some(previous) = self.step_loop.replace(StepLoop { vertical_bound }) {
            debug!(
                "replacing step loop bounded at {} with {vertical_bound}",
                previous.vertical_bound
            );
        }
    }

    pub fn switch_to_linear_layout(&mut self, field: &str) -> Result<(), GraphError> {
        let placed = NodeField::parse(field)
            .ok_or_else(|| GraphError::UnsupportedLayoutField(field.to_owned()))
            .and_then(|field| self.layout.place_linear(&mut self.model, field));
        if let Err(error) = placed {
            warn!("linear layout rejected: {error}");
            return Err(error);
        }

        self.step_loop = None;
        self.cancel(DeferredTask::StartLinearSimulation);
        self.scene.rebind(&self.model, self.layout.mode(), self.clock);
        self.schedule(
            DeferredTask::StartLinearSimulation,
            self.config.linear_settle_delay_secs,
        );
        Ok(())
    }

    pub fn switch_to_force_layout(&mut self) {
        self.step_loop = None;
        self.cancel(DeferredTask::StartLinearSimulation);
        for node in self.model.nodes_mut() {
            node.unpin();
        }

        self.layout.reset_force_directed();
        self.scene.rebind(&self.model, self.layout.mode(), self.clock);
        self.layout.simulation_mut().restart();
        self.start_layout_step(self.viewport.y);
        debug!("switched to force layout");
    }

    /// Runs due timers, then one layout step. Returns whether anything is
    /// still moving and the host should keep repainting.
    pub fn tick(&mut self, now: f64) -> bool {
        self.clock = now;
        self.run_due_tasks(now);

        if let Some(step_loop) = self.step_loop
            && self.layout.simulation().is_running()
        {
            self.layout.step(&mut self.model);
            clamp_positions(
                &mut self.model,
                ViewportBounds {
                    width: self.viewport.x,
                    vertical_bound: step_loop.vertical_bound,
                    radius: self.config.node_radius,
                },
            );
            self.scene.sync(&self.model);
        }

        self.scene.prune(now);

        self.is_simulating()
            || self.scene.is_animating()
            || !self.deferred.is_empty()
            || !self.drag.is_idle()
    }

    fn run_due_tasks(&mut self, now: f64) {
        let (due, pending): (Vec<Deferred>, Vec<Deferred>) = std::mem::take(&mut self.deferred)
            .into_iter()
            .partition(|deferred| deferred.due <= now);
        self.deferred = pending;

        for deferred in due {
            match deferred.task {
                DeferredTask::StartLinearSimulation => {
                    if self.layout.start_linear_simulation() {
                        self.layout.simulation_mut().restart();
                        self.start_layout_step(self.layout.vertical_bound());
                    }
                }
                DeferredTask::RearmClickToAdd => {
                    self.click_to_add.armed = self.click_to_add.enabled;
                }
            }
        }
    }

    fn schedule(&mut self, task: DeferredTask, delay_secs: f64) {
        self.cancel(task);
        self.deferred.push(Deferred {
            due: self.clock + delay_secs,
            task,
        });
    }

    fn cancel(&mut self, task: DeferredTask) {
        self.deferred.retain(|deferred| deferred.task != task);
    }

    fn is_pending(&self, task: DeferredTask) -> bool {
        self.deferred.iter().any(|deferred| deferred.task == task)
    }

    pub fn show_all_labels(&mut self) {
        labels::show_all(&mut self.model);
    }

    pub fn hide_all_labels(&mut self) {
        labels::hide_all(&mut self.model);
    }

    pub fn set_labeled_set(&mut self, ids: &HashSet<NodeId>) {
        labels::set_labeled(&mut self.model, ids);
    }

    pub fn highlight(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.highlight.set(ids);
    }

    pub fn clear_highlight(&mut self) {
        self.highlight.clear();
    }

    pub fn highlight_state(&self) -> &Highlight {
        &self.highlight
    }

    pub fn query(&mut self, token: &str) -> Vec<NodeId> {
        let matches = labels::query(&self.model, token);
        if matches.is_empty() {
            self.clear_highlight();
            self.hide_all_labels();
        } else {
            let ids = matches.iter().cloned().collect::<HashSet<_>>();
            self.set_labeled_set(&ids);
            self.highlight(ids);
        }
        debug!("query {token:?} matched {} nodes", matches.len());
        matches
    }

    pub fn update_attribute(&mut self, id: &str, key: &str, value: Value) -> Result<(), GraphError> {
        self.model
            .update_attribute(id, key, value)
            .inspect_err(|error| warn!("attribute update skipped: {error}"))?;
        self.redraw();
        Ok(())
    }

    pub fn remove_node(&mut self, id: &str) -> Result<RemovedNode, GraphError> {
        let removed = self
            .model
            .remove_node(id)
            .inspect_err(|error| warn!("node removal skipped: {error}"))?;

        self.highlight.forget(id);
        if self.hover.as_ref().is_some_and(|hovered| hovered.as_str() == id) {
            self.hover = None;
        }
        if self.drag.involves(id) {
            self.finish_drag();
        }
        debug!(
            "removed node {id} with {} incident edges",
            removed.edges.len()
        );
        self.redraw();
        Ok(removed)
    }

    pub fn remove_edge(&mut self, source: &str, target: &str) -> Result<Edge, GraphError> {
        let edge = self
            .model
            .remove_edge(source, target)
            .inspect_err(|error| warn!("edge removal skipped: {error}"))?;
        self.redraw();
        Ok(edge)
    }

    pub fn enable_click_to_add(&mut self) {
        self.click_to_add = ClickToAdd {
            enabled: true,
            armed: self.drag.is_idle(),
        };
    }

    pub fn disable_click_to_add(&mut self) {
        self.click_to_add = ClickToAdd::default();
        self.cancel(DeferredTask::RearmClickToAdd);
    }

    pub fn click_to_add_armed(&self) -> bool {
        self.click_to_add.enabled && self.click_to_add.armed
    }

    pub fn enable_drag_to_connect(&mut self) {
        self.drag_to_connect = true;
    }

    pub fn disable_drag_to_connect(&mut self) {
        self.drag_to_connect = false;
        if !self.drag.is_idle() {
            self.finish_drag();
        }
    }

    pub fn drag_to_connect_enabled(&self) -> bool {
        self.drag_to_connect
    }

    pub fn pan_zoom_enabled(&self) -> bool {
        self.drag.is_idle()
    }

    pub fn node_at(&self, pos: Pos2) -> Option<NodeId> {
        self.model
            .nodes()
            .iter()
            .rev()
            .filter_map(|node| {
                let radius = self.node_radius(&node.id);
                let distance = node.position.to_pos2().distance(pos);
                (distance <= radius).then_some((node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node.id.clone())
    }

    fn node_radius(&self, id: &NodeId) -> f32 {
        match self.highlight.node(id) {
            Emphasis::Focused => self.config.node_radius * 2.0,
            _ => self.config.node_radius,
        }
    }

    fn next_free_id(&mut self) -> NodeId {
        loop {
            let candidate = self.next_node_id.to_string();
            self.next_node_id += 1;
            if !self.model.contains_node(&candidate) {
                return NodeId::from(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn view() -> GraphView {
        let mut view = GraphView::new(ViewConfig::default(), vec2(600.0, 400.0));
        view.load(
            &[
                RawNode::new("0", 1).with_attribute("year", 1999),
                RawNode::new("1", 2).with_attribute("year", 2004),
                RawNode::new("2", 3).with_attribute("year", 1994),
            ],
            &[RawEdge::new("0", "1")],
        );
        view
    }

    #[test]
    fn load_attaches_a_force_step_loop() {
        let view = view();

        assert_eq!(view.step_loop(), Some(StepLoop { vertical_bound: 400.0 }));
        assert!(view.is_simulating());
        assert!(view.mode().is_force());
    }

    #[test]
    fn starting_a_step_loop_replaces_the_previous_one() {
        let mut view = view();
        view.start_layout_step(120.0);
        view.start_layout_step(240.0);

        assert_eq!(view.step_loop(), Some(StepLoop { vertical_bound: 240.0 }));
    }

    #[test]
    fn ticks_keep_nodes_inside_the_viewport() {
        let mut view = view();
        for frame in 0..200 {
            view.tick(f64::from(frame) / 60.0);
        }

        for node in view.model().nodes() {
            assert!((5.0..=595.0).contains(&node.position.x));
            assert!((5.0..=395.0).contains(&node.position.y));
        }
    }

    #[test]
    fn linear_simulation_starts_after_the_settle_delay() {
        let mut view = view();
        view.tick(0.0);
        view.switch_to_linear_layout("year").expect("years are numeric");

        assert_eq!(view.step_loop(), None);
        assert!(!view.is_simulating());

        view.tick(0.5);
        assert_eq!(view.step_loop(), None);

        view.tick(1.0);
        let bound = view.step_loop().map(|step_loop| step_loop.vertical_bound);
        assert_eq!(bound, Some(400.0 / 3.0 + 20.0));
        assert!(view.is_simulating());
    }

    #[test]
    fn reload_drops_pending_linear_start() {
        let mut view = view();
        view.switch_to_linear_layout("rank").expect("ranks are numeric");
        view.load(&[RawNode::new("a", 1)], &[]);

        assert_eq!(view.pending_tasks().count(), 0);
        assert!(view.mode().is_force());
    }

    #[test]
    fn rejected_linear_field_changes_nothing() {
        let mut view = view();
        view.update_attribute("2", "year", Value::from("unknown"))
            .expect("attribute exists");
        let before = view.model().nodes()[0].position;

        assert!(matches!(
            view.switch_to_linear_layout("year"),
            Err(GraphError::NonNumericField { .. })
        ));
        assert!(matches!(
            view.switch_to_linear_layout("genre"),
            Err(GraphError::UnsupportedLayoutField(_))
        ));
        assert!(view.mode().is_force());
        assert!(view.step_loop().is_some());
        assert_eq!(view.model().nodes()[0].position, before);
    }

    #[test]
    fn empty_query_clears_highlight_and_labels() {
        let mut view = view();
        assert_eq!(view.query("1"), vec![NodeId::from("0"), NodeId::from("1")]);
        assert!(view.highlight_state().is_active());

        assert!(view.query("Inception").is_empty());
        assert!(!view.highlight_state().is_active());
        assert!(view.model().nodes().iter().all(|node| !node.show_text));
    }

    #[test]
    fn switching_back_to_force_unpins_everything() {
        let mut view = view();
        view.switch_to_linear_layout("rank").expect("ranks are numeric");
        view.switch_to_force_layout();

        assert!(view.model().nodes().iter().all(|node| !node.is_pinned()));
        assert_eq!(view.pending_tasks().count(), 0);
        assert_eq!(view.step_loop(), Some(StepLoop { vertical_bound: 400.0 }));
    }

    #[test]
    fn node_at_finds_the_circle_under_the_pointer() {
        let view = view();
        let node = &view.model().nodes()[1];
        let pos = node.position.to_pos2() + vec2(3.0, 0.0);

        assert_eq!(view.node_at(pos), Some(node.id.clone()));
        assert_eq!(view.node_at(pos2(-100.0, -100.0)), None);
    }
}
