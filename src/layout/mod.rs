mod forces;
mod linear;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use log::debug;

use crate::config::ViewConfig;
use crate::error::GraphError;
use crate::model::{GraphModel, Node, NodeField};
use crate::util::Jiggle;

use forces::{
    CollideParams, LinkParams, ManyBodyParams, accumulate_collisions, accumulate_many_body,
    apply_baseline, apply_center, apply_links,
};
use quadtree::QuadNode;

pub use linear::{LinearScale, extent, field_values};

pub const ALPHA_MIN: f32 = 0.001;
const ALPHA_STEPS_TO_SETTLE: f32 = 300.0;

#[derive(Clone, Copy, Debug)]
enum ForceSet {
    Directed {
        link: LinkParams,
        many_body: ManyBodyParams,
        center: Vec2,
    },
    Linear {
        collide: CollideParams,
        baseline: f32,
        baseline_strength: f32,
    },
}

#[derive(Clone, Debug)]
pub struct Simulation {
    alpha: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,
    forces: ForceSet,
    running: bool,
    jiggle: Jiggle,
    scratch: Vec<Vec2>,
}

impl Simulation {
    fn new(forces: ForceSet, velocity_decay: f32) -> Self {
        Self {
            alpha: 1.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / ALPHA_STEPS_TO_SETTLE),
            alpha_target: 0.0,
            velocity_decay,
            forces,
            running: false,
            jiggle: Jiggle::default(),
            scratch: Vec::new(),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn restart(&mut self) {
        self.running = true;
    }

    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.running = true;
    }

    pub fn step(&mut self, nodes: &mut [Node], links: &[(usize, usize)]) -> bool {
        if !self.running {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;

        match self.forces {
            ForceSet::Directed {
                link,
                many_body,
                center,
            } => {
                apply_links(nodes, links, link, alpha, &mut self.jiggle);

                self.scratch.clear();
                self.scratch.extend(nodes.iter().map(|node| node.position));
                if let Some(tree) = QuadNode::build(&self.scratch) {
                    for (index, node) in nodes.iter_mut().enumerate() {
                        accumulate_many_body(
                            &tree,
                            index,
                            &self.scratch,
                            many_body,
                            alpha,
                            &mut self.jiggle,
                            &mut node.velocity,
                        );
                    }
                }

                apply_center(nodes, center);
            }
            ForceSet::Linear {
                collide,
                baseline,
                baseline_strength,
            } => {
                self.scratch.clear();
                self.scratch
                    .extend(nodes.iter().map(|node| node.position + node.velocity));
                if let Some(tree) = QuadNode::build(&self.scratch) {
                    let mut deltas = vec![Vec2::ZERO; nodes.len()];
                    accumulate_collisions(
                        &tree,
                        &tree,
                        true,
                        &self.scratch,
                        collide,
                        &mut self.jiggle,
                        &mut deltas,
                    );
                    for (node, delta) in nodes.iter_mut().zip(deltas) {
                        node.velocity += delta;
                    }
                }

                apply_baseline(nodes, baseline, baseline_strength, alpha);
            }
        }

        let retain = 1.0 - self.velocity_decay;
        for node in nodes.iter_mut() {
            match node.fx {
                Some(fx) => {
                    node.position.x = fx;
                    node.velocity.x = 0.0;
                }
                None => {
                    node.velocity.x *= retain;
                    node.position.x += node.velocity.x;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.position.y = fy;
                    node.velocity.y = 0.0;
                }
                None => {
                    node.velocity.y *= retain;
                    node.position.y += node.velocity.y;
                }
            }
        }

        if self.alpha < ALPHA_MIN {
            self.running = false;
        }
        self.running
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearLayout {
    pub field: NodeField,
    pub baseline: f32,
    pub scale: LinearScale,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutMode {
    Force,
    Linear(LinearLayout),
}

impl LayoutMode {
    pub fn is_force(&self) -> bool {
        matches!(self, Self::Force)
    }
}

#[derive(Clone, Debug)]
pub struct LayoutEngine {
    config: ViewConfig,
    viewport: Vec2,
    mode: LayoutMode,
    simulation: Simulation,
}

impl LayoutEngine {
    pub fn new(config: ViewConfig, viewport: Vec2) -> Self {
        let forces = Self::directed_forces(&config, viewport);
        Self {
            simulation: Simulation::new(forces, config.forces.velocity_decay),
            config,
            viewport,
            mode: LayoutMode::Force,
        }
    }

    fn directed_forces(config: &ViewConfig, viewport: Vec2) -> ForceSet {
        let cutoff = config.many_body_cutoff();
        ForceSet::Directed {
            link: LinkParams {
                distance: config.forces.link_distance,
            },
            many_body: ManyBodyParams {
                strength: config.forces.many_body_strength,
                theta: config.forces.theta,
                distance_min_sq: 1.0,
                distance_max_sq: cutoff * cutoff,
            },
            center: viewport * 0.5,
        }
    }

    pub fn mode(&self) -> &LayoutMode {
        &self.mode
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn reset_force_directed(&mut self) {
        self.simulation.stop();
        self.simulation = Simulation::new(
            Self::directed_forces(&self.config, self.viewport),
            self.config.forces.velocity_decay,
        );
        self.mode = LayoutMode::Force;
    }

    /// Pins every node's x to its `field` value and parks it on the baseline.
    /// Nothing is touched when any node lacks a numeric value.
    pub fn place_linear(
        &mut self,
        model: &mut GraphModel,
        field: NodeField,
    ) -> Result<LinearLayout, GraphError> {
        let values = field_values(model, field)?;

        self.simulation.stop();

        let baseline = self.viewport.y / 3.0;
        let domain = extent(&values).unwrap_or((0.0, 0.0));
        let scale = LinearScale::new(
            domain,
            (
                self.config.margin.left,
                self.viewport.x - self.config.margin.right,
            ),
        );

        for (node, value) in model.nodes_mut().iter_mut().zip(values) {
            let x = scale.map(value);
            node.position = vec2(x, baseline);
            node.velocity = Vec2::ZERO;
            node.fx = Some(x);
            node.fy = None;
        }

        let layout = LinearLayout {
            field,
            baseline,
            scale,
        };
        self.mode = LayoutMode::Linear(layout);
        debug!(
            "linear layout on {} over {:?}",
            field.label(),
            scale.domain()
        );
        Ok(layout)
    }

    pub fn start_linear_simulation(&mut self) -> bool {
        let LayoutMode::Linear(layout) = self.mode else {
            return false;
        };

        let forces = ForceSet::Linear {
            collide: CollideParams {
                radius: self.config.node_radius,
                strength: self.config.forces.collide_strength,
            },
            baseline: layout.baseline,
            baseline_strength: self.config.forces.baseline_strength,
        };
        self.simulation = Simulation::new(forces, self.config.forces.velocity_decay);
        true
    }

    pub fn step(&mut self, model: &mut GraphModel) -> bool {
        let links = model.edge_indices();
        self.simulation.step(model.nodes_mut(), &links)
    }

    pub fn vertical_bound(&self) -> f32 {
        match self.mode {
            LayoutMode::Force => self.viewport.y,
            LayoutMode::Linear(layout) => {
                layout.baseline + self.config.node_radius * self.config.linear_bound_slack_radii
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{RawEdge, RawNode};

    use super::*;

    fn viewport() -> Vec2 {
        vec2(600.0, 400.0)
    }

    fn loaded(nodes: &[RawNode], edges: &[RawEdge]) -> GraphModel {
        let mut model = GraphModel::new();
        model.load(nodes, edges, viewport() * 0.5);
        model
    }

    #[test]
    fn alpha_decays_until_the_simulation_stops() {
        let mut model = loaded(&[RawNode::new("a", 1), RawNode::new("b", 2)], &[]);
        let mut engine = LayoutEngine::new(ViewConfig::default(), viewport());
        engine.simulation_mut().restart();

        let mut steps = 0;
        while engine.step(&mut model) {
            steps += 1;
            assert!(steps < 1000, "simulation never settled");
        }

        assert!(engine.simulation().alpha() < ALPHA_MIN);
        assert!((290..=310).contains(&steps));
    }

    #[test]
    fn repulsion_pushes_close_nodes_apart() {
        let mut a = RawNode::new("a", 1);
        a.x = Some(300.0);
        a.y = Some(200.0);
        let mut b = RawNode::new("b", 2);
        b.x = Some(302.0);
        b.y = Some(200.0);
        let mut model = loaded(&[a, b], &[]);
        let mut engine = LayoutEngine::new(ViewConfig::default(), viewport());
        engine.simulation_mut().restart();

        for _ in 0..20 {
            engine.step(&mut model);
        }

        let distance = (model.nodes()[0].position - model.nodes()[1].position).length();
        assert!(distance > 10.0, "nodes stayed at {distance}");
    }

    #[test]
    fn repulsion_is_ignored_beyond_the_cutoff() {
        let mut a = RawNode::new("a", 1);
        a.x = Some(0.0);
        a.y = Some(200.0);
        let mut b = RawNode::new("b", 2);
        b.x = Some(600.0);
        b.y = Some(200.0);
        let mut model = loaded(&[a, b], &[]);
        let mut engine = LayoutEngine::new(ViewConfig::default(), viewport());
        engine.simulation_mut().restart();
        engine.step(&mut model);

        assert_eq!(model.nodes()[0].velocity, Vec2::ZERO);
        assert_eq!(model.nodes()[1].velocity, Vec2::ZERO);
    }

    #[test]
    fn springs_pull_linked_nodes_toward_rest_distance() {
        let mut a = RawNode::new("a", 1);
        a.x = Some(100.0);
        a.y = Some(200.0);
        let mut b = RawNode::new("b", 2);
        b.x = Some(500.0);
        b.y = Some(200.0);
        let mut model = loaded(&[a, b], &[RawEdge::new("a", "b")]);
        let mut engine = LayoutEngine::new(ViewConfig::default(), viewport());
        engine.simulation_mut().restart();

        while engine.step(&mut model) {}

        let distance = (model.nodes()[0].position - model.nodes()[1].position).length();
        assert!(distance < 200.0, "link did not contract: {distance}");
    }

    #[test]
    fn centering_moves_the_centroid_to_the_viewport_center() {
        let mut a = RawNode::new("a", 1);
        a.x = Some(10.0);
        a.y = Some(10.0);
        let mut b = RawNode::new("b", 2);
        b.x = Some(30.0);
        b.y = Some(10.0);
        let mut model = loaded(&[a, b], &[]);
        let mut engine = LayoutEngine::new(ViewConfig::default(), viewport());
        engine.simulation_mut().restart();
        engine.step(&mut model);

        let centroid = (model.nodes()[0].position + model.nodes()[1].position) * 0.5;
        assert!((centroid - viewport() * 0.5).length() < 1.0);
    }

    #[test]
    fn pinned_axes_do_not_move() {
        let mut model = loaded(
            &[RawNode::new("a", 1), RawNode::new("b", 2), RawNode::new("c", 3)],
            &[RawEdge::new("a", "b")],
        );
        model.nodes_mut()[0].position = vec2(42.0, 24.0);
        model.nodes_mut()[0].pin_at_current_position();
        let mut engine = LayoutEngine::new(ViewConfig::default(), viewport());
        engine.simulation_mut().restart();

        for _ in 0..50 {
            engine.step(&mut model);
        }

        assert_eq!(model.nodes()[0].position, vec2(42.0, 24.0));
    }

    #[test]
    fn linear_placement_pins_x_by_field_order() {
        let mut model = loaded(
            &[
                RawNode::new("a", 3),
                RawNode::new("b", 1),
                RawNode::new("c", 2),
            ],
            &[],
        );
        let mut engine = LayoutEngine::new(ViewConfig::default(), viewport());
        let layout = engine
            .place_linear(&mut model, NodeField::Rank)
            .expect("ranks are numeric");

        let x_of = |id: &str| model.node(id).and_then(|node| node.fx).unwrap_or(f32::NAN);
        assert_eq!(x_of("b"), 20.0);
        assert_eq!(x_of("c"), 302.5);
        assert_eq!(x_of("a"), 585.0);
        assert_eq!(layout.baseline, 400.0 / 3.0);
        assert!(!engine.simulation().is_running());
        assert!(engine.vertical_bound() > layout.baseline);
    }

    #[test]
    fn linear_simulation_spreads_shared_positions_vertically() {
        let mut model = loaded(
            &[
                RawNode::new("a", 1),
                RawNode::new("b", 1),
                RawNode::new("c", 5),
            ],
            &[],
        );
        let mut engine = LayoutEngine::new(ViewConfig::default(), viewport());
        engine
            .place_linear(&mut model, NodeField::Rank)
            .expect("ranks are numeric");
        assert!(engine.start_linear_simulation());
        engine.simulation_mut().restart();

        for _ in 0..120 {
            engine.step(&mut model);
        }

        let a = model.node("a").expect("a").position;
        let b = model.node("b").expect("b").position;
        assert_eq!(a.x, b.x);
        assert!((a.y - b.y).abs() >= 5.0, "no vertical spread: {a:?} {b:?}");
    }
}
