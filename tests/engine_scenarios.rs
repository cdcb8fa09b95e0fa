use cinegraph::data::sample_dataset;
use cinegraph::layout::LayoutMode;
use cinegraph::model::NodeField;
use cinegraph::view::{DeferredTask, EdgeTone, NodeDetails, NodeTone};
use cinegraph::{GraphError, GraphView, NodeId, Notice, PointerEvent, RawEdge, RawNode, ViewConfig};
use eframe::egui::{pos2, vec2};
use serde_json::json;

fn movie(id: &str, rank: u32, name: &str, year: u32) -> RawNode {
    RawNode::new(id, rank)
        .with_attribute("name", name)
        .with_attribute("year", year)
        .with_attribute("genre", "Drama")
}

fn movies() -> Vec<RawNode> {
    vec![
        movie("a", 3, "Heat", 1995),
        movie("b", 1, "Alien", 1979),
        movie("c", 2, "Ran", 1985),
    ]
}

fn loaded(nodes: &[RawNode], edges: &[RawEdge]) -> GraphView {
    let mut view = GraphView::new(ViewConfig::default(), vec2(960.0, 640.0));
    view.load(nodes, edges);
    view.enable_click_to_add();
    view.enable_drag_to_connect();
    view
}

fn drag(view: &mut GraphView, source: &str, target: &str, now: f64) -> Option<Notice> {
    let mut sink: Option<NodeDetails> = None;
    view.handle_pointer(
        PointerEvent::Press {
            node: NodeId::from(source),
            pos: pos2(0.0, 0.0),
        },
        now,
        &mut sink,
    );
    view.handle_pointer(PointerEvent::Enter(NodeId::from(target)), now, &mut sink);
    view.handle_pointer(PointerEvent::Release, now, &mut sink)
}

fn degree(view: &GraphView, id: &str) -> usize {
    view.model().node(id).map_or(0, |node| node.degree)
}

#[test]
fn load_counts_degrees_from_edges() {
    let view = loaded(&movies(), &[RawEdge::new("a", "b"), RawEdge::new("a", "c")]);

    assert_eq!(degree(&view, "a"), 2);
    assert_eq!(degree(&view, "b"), 1);
    assert_eq!(degree(&view, "c"), 1);
    assert!(view.step_loop().is_some());
    assert!(view.mode().is_force());
}

#[test]
fn dragging_onto_the_source_reports_a_self_loop() {
    let mut view = loaded(&movies(), &[]);

    assert_eq!(drag(&mut view, "a", "a", 0.0), Some(Notice::SelfLoop));
    assert_eq!(view.model().edge_count(), 0);
    assert_eq!(Notice::SelfLoop.to_string(), "Self loops not allowed");
}

#[test]
fn reverse_edges_count_as_duplicates() {
    let mut view = loaded(&movies(), &[RawEdge::new("a", "b")]);

    assert_eq!(drag(&mut view, "b", "a", 0.0), Some(Notice::DuplicateEdge));
    assert_eq!(view.model().edge_count(), 1);
    assert_eq!(degree(&view, "a"), 1);

    assert_eq!(drag(&mut view, "b", "c", 0.5), None);
    assert_eq!(view.model().edge_count(), 2);
    assert_eq!(degree(&view, "b"), 2);
}

#[test]
fn query_without_matches_clears_focus_and_labels() {
    let mut view = loaded(&movies(), &[]);

    let found = view.query("Heat");
    assert_eq!(found, vec![NodeId::from("a")]);
    assert!(view.highlight_state().is_active());
    assert!(view.model().node("a").is_some_and(|node| node.show_text));

    assert!(view.query("Inception").is_empty());
    assert!(!view.highlight_state().is_active());
    assert!(view.model().nodes().iter().all(|node| !node.show_text));
}

#[test]
fn removing_a_node_cascades_to_its_edges() {
    let mut view = loaded(
        &movies(),
        &[RawEdge::new("a", "b"), RawEdge::new("a", "c"), RawEdge::new("b", "c")],
    );

    let removed = view.remove_node("a").expect("node exists");
    assert_eq!(removed.edges.len(), 2);
    assert_eq!(view.model().edge_count(), 1);
    assert_eq!(degree(&view, "b"), 1);
    assert_eq!(degree(&view, "c"), 1);
    assert!(matches!(
        view.remove_node("a"),
        Err(GraphError::UnknownNode(id)) if id == "a"
    ));
}

#[test]
fn linear_layout_orders_nodes_by_rank() {
    let mut view = loaded(&movies(), &[RawEdge::new("a", "b")]);
    view.switch_to_linear_layout("rank").expect("ranks are numeric");

    let x = |id: &str| view.model().node(id).map(|node| node.position.x).unwrap_or(f32::NAN);
    assert!(x("b") < x("c"));
    assert!(x("c") < x("a"));
    assert!((x("b") - 20.0).abs() < 1e-3);
    assert!((x("a") - 945.0).abs() < 1e-3);

    let baseline = 640.0 / 3.0;
    assert!(
        view.model()
            .nodes()
            .iter()
            .all(|node| (node.position.y - baseline).abs() < 1e-3 && node.fx.is_some())
    );
    assert!(matches!(
        view.mode(),
        LayoutMode::Linear(layout) if layout.field == NodeField::Rank
    ));
}

#[test]
fn linear_layout_on_text_field_leaves_graph_untouched() {
    let mut view = loaded(&movies(), &[]);
    let before = view
        .model()
        .nodes()
        .iter()
        .map(|node| node.position)
        .collect::<Vec<_>>();

    assert!(view.switch_to_linear_layout("name").is_err());
    assert!(view.mode().is_force());
    let after = view
        .model()
        .nodes()
        .iter()
        .map(|node| node.position)
        .collect::<Vec<_>>();
    assert_eq!(before, after);
}

#[test]
fn ticks_keep_nodes_inside_the_viewport() {
    let mut far = movie("far", 4, "Tenet", 2020);
    far.x = Some(5_000.0);
    far.y = Some(-300.0);
    let mut nodes = movies();
    nodes.push(far);
    let mut view = loaded(&nodes, &[]);

    for frame in 1..=20 {
        view.tick(f64::from(frame) / 60.0);
    }

    for node in view.model().nodes() {
        assert!((5.0..=955.0).contains(&node.position.x), "{:?}", node.position);
        assert!((5.0..=635.0).contains(&node.position.y), "{:?}", node.position);
    }
}

#[test]
fn only_one_step_loop_survives_layout_switches() {
    let mut view = loaded(&movies(), &[]);
    assert_eq!(view.step_loop().map(|step| step.vertical_bound), Some(640.0));

    view.switch_to_linear_layout("year").expect("years are numeric");
    assert!(view.step_loop().is_none());

    view.switch_to_force_layout();
    assert_eq!(view.step_loop().map(|step| step.vertical_bound), Some(640.0));
    assert!(
        view.pending_tasks()
            .all(|task| task != DeferredTask::StartLinearSimulation)
    );
}

#[test]
fn linear_simulation_starts_after_the_settle_delay() {
    let mut view = loaded(&movies(), &[]);
    view.tick(1.0);
    view.switch_to_linear_layout("rank").expect("ranks are numeric");
    view.switch_to_linear_layout("year").expect("years are numeric");

    let pending = view
        .pending_tasks()
        .filter(|task| *task == DeferredTask::StartLinearSimulation)
        .count();
    assert_eq!(pending, 1);

    view.tick(1.5);
    assert!(view.step_loop().is_none());

    view.tick(2.05);
    let bound = view.step_loop().map(|step| step.vertical_bound);
    assert_eq!(bound, Some(640.0 / 3.0 + 20.0));
    assert!(view.pending_tasks().next().is_none());
}

#[test]
fn click_to_add_rearms_after_an_edge_gesture() {
    let mut view = loaded(&movies(), &[]);
    let mut sink: Option<NodeDetails> = None;

    view.handle_pointer(
        PointerEvent::Press {
            node: NodeId::from("a"),
            pos: pos2(0.0, 0.0),
        },
        1.0,
        &mut sink,
    );
    assert!(!view.click_to_add_armed());

    view.handle_pointer(PointerEvent::Release, 1.0, &mut sink);
    view.handle_pointer(PointerEvent::Click(pos2(40.0, 40.0)), 1.05, &mut sink);
    assert_eq!(view.model().node_count(), 3);

    view.tick(1.25);
    assert!(view.click_to_add_armed());
    view.handle_pointer(PointerEvent::Click(pos2(40.0, 40.0)), 1.3, &mut sink);
    assert_eq!(view.model().node_count(), 4);

    let added = view.model().node("3").expect("new node takes the next id");
    assert_eq!(added.attributes.get("year"), Some(&json!(2023)));
    assert_eq!(added.degree, 0);
}

#[test]
fn bundled_sample_loads_cleanly() {
    let dataset = sample_dataset().expect("sample parses");
    let mut view = GraphView::new(ViewConfig::default(), vec2(960.0, 640.0));
    let report = view.load(&dataset.nodes, &dataset.edges);

    assert!(report.rejected.is_empty(), "{:?}", report.rejected);
    assert_eq!(report.node_count, dataset.nodes.len());
    assert!(view.switch_to_linear_layout("year").is_ok());
}

#[test]
fn hovered_source_loses_emphasis_once_the_pointer_leaves() {
    let mut view = loaded(&movies(), &[RawEdge::new("a", "b")]);
    let mut sink: Option<NodeDetails> = None;
    let events = [
        PointerEvent::Enter(NodeId::from("a")),
        PointerEvent::Press {
            node: NodeId::from("a"),
            pos: pos2(0.0, 0.0),
        },
        PointerEvent::Leave(NodeId::from("a")),
        PointerEvent::Enter(NodeId::from("c")),
        PointerEvent::Release,
        PointerEvent::Leave(NodeId::from("c")),
    ];
    for event in events {
        assert_eq!(view.handle_pointer(event, 0.5, &mut sink), None);
    }

    assert_eq!(view.model().edge_count(), 2);
    assert_eq!(view.hovered(), None);
    assert!(sink.is_none());
    let list = view.draw_list(0.5);
    assert!(list.nodes.iter().all(|node| node.tone != NodeTone::Hovered));
    assert!(list.edges.iter().all(|edge| edge.tone != EdgeTone::Hovered));
}
