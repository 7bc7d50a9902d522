//! Integration tests for the node scene
//!
//! Tests node moving, selection, edge paths and rendering of a whole scene.

use kurbo::{Affine, BezPath, PathEl, Point, Size};
use nodeui_core::canvas::Canvas;
use nodeui_core::color::NodeColor;
use nodeui_core::config::EditorConfig;
use nodeui_core::geometry::{RowRole, SocketDirection};
use nodeui_core::gesture::{ConnectionRequest, EventResult, SocketRef};
use nodeui_core::node_visual::NodeVisual;
use nodeui_core::panel::StaticPanel;
use nodeui_core::renderer::Surface;
use nodeui_core::scene::{ConnectionHandler, NodeScene, SceneGesture, SocketLocator};
use std::rc::Rc;
use vello::Scene;

struct RejectAll;

impl ConnectionHandler for RejectAll {
    fn try_connect(&mut self, _request: &ConnectionRequest, _locator: &SocketLocator<'_>) -> bool {
        false
    }
}

#[derive(Default)]
struct StrokeRecorder {
    strokes: Vec<NodeColor>,
}

impl Surface for StrokeRecorder {
    fn fill_path(&mut self, _transform: Affine, _path: &BezPath, _color: NodeColor) {}

    fn stroke_path(&mut self, _transform: Affine, _path: &BezPath, _width: f64, color: NodeColor) {
        self.strokes.push(color);
    }
}

fn make_node(position: Point) -> NodeVisual {
    let panel = Rc::new(
        StaticPanel::new(Size::new(80.0, 40.0))
            .with_row(RowRole::INPUT, 10.0)
            .with_row(RowRole::OUTPUT, 30.0),
    );
    let mut node = NodeVisual::new().with_position(position).with_panel(panel);
    node.sync_panel_size();
    node
}

/// Two nodes side by side, the second one on top
fn setup_scene() -> (NodeScene, Vec<uuid::Uuid>) {
    let mut scene = NodeScene::new();
    let a = scene.add_node(make_node(Point::new(0.0, 0.0)));
    let b = scene.add_node(make_node(Point::new(200.0, 100.0)));
    (scene, vec![a, b])
}

#[test]
fn test_body_press_selects_and_moves_node() {
    let (mut scene, ids) = setup_scene();

    assert_eq!(scene.pointer_press(Point::new(240.0, 120.0)), EventResult::Accepted);
    assert_eq!(scene.selected(), Some(ids[1]));
    assert!(matches!(scene.gesture(), SceneGesture::MovingNode { .. }));

    scene.pointer_move(Point::new(260.0, 150.0));
    assert!(scene.pointer_release(Point::new(260.0, 150.0), &mut RejectAll).is_none());

    let node = scene.node(ids[1]).unwrap();
    assert_eq!(node.position(), Point::new(220.0, 130.0));
    let item = node.item().unwrap();
    assert_eq!(scene.canvas().map_to_canvas(item, Point::ZERO), Point::new(220.0, 130.0));
    assert_eq!(scene.gesture(), SceneGesture::Idle);
}

#[test]
fn test_empty_press_clears_selection() {
    let (mut scene, ids) = setup_scene();
    scene.select(Some(ids[0]));

    assert_eq!(scene.pointer_press(Point::new(-100.0, -100.0)), EventResult::Ignored);
    assert_eq!(scene.selected(), None);
    assert_eq!(scene.gesture(), SceneGesture::Idle);
}

#[test]
fn test_topmost_node_gets_press() {
    let mut scene = NodeScene::new();
    let bottom = scene.add_node(make_node(Point::new(0.0, 0.0)));
    let top = scene.add_node(make_node(Point::new(20.0, 20.0)));

    scene.pointer_press(Point::new(50.0, 40.0));
    assert_eq!(scene.selected(), Some(top));
    assert_ne!(scene.selected(), Some(bottom));
}

#[test]
fn test_moved_node_sockets_follow() {
    let (mut scene, ids) = setup_scene();
    scene.move_node(ids[0], Point::new(50.0, 60.0));

    let socket = SocketRef {
        node: ids[0],
        index: 0,
        direction: SocketDirection::Input,
    };
    assert_eq!(scene.locator().socket_center(socket), Some(Point::new(55.0, 75.0)));
    assert_eq!(scene.locator().socket_at(Point::new(55.0, 75.0)), Some(socket));
}

#[test]
fn test_covered_socket_is_not_found() {
    let mut scene = NodeScene::new();
    let bottom = scene.add_node(make_node(Point::new(0.0, 0.0)));
    let input = Point::new(5.0, 15.0);
    assert_eq!(scene.locator().socket_at(input).map(|s| s.node), Some(bottom));

    // body of the top node now covers the bottom node's input socket
    scene.add_node(make_node(Point::new(-20.0, 0.0)));
    assert_eq!(scene.locator().socket_at(input), None);

    // and a press there moves the top node instead of starting a drag
    scene.pointer_press(input);
    assert!(matches!(scene.gesture(), SceneGesture::MovingNode { .. }));
    assert_eq!(scene.canvas().curves().count(), 0);
}

#[test]
fn test_edge_path_between_sockets() {
    let (scene, ids) = setup_scene();
    let from = SocketRef {
        node: ids[0],
        index: 1,
        direction: SocketDirection::Output,
    };
    let to = SocketRef {
        node: ids[1],
        index: 0,
        direction: SocketDirection::Input,
    };

    let path = scene.edge_path(from, to).unwrap();
    let start = Point::new(95.0, 35.0);
    let end = Point::new(205.0, 115.0);
    assert_eq!(path.elements()[0], PathEl::MoveTo(start));
    assert_eq!(
        path.elements()[1],
        PathEl::CurveTo(Point::new(150.0, 35.0), Point::new(150.0, 115.0), end)
    );

    let missing = SocketRef { index: 7, ..to };
    assert!(scene.edge_path(from, missing).is_none());
}

#[test]
fn test_render_order_edges_nodes_previews() {
    let (mut scene, ids) = setup_scene();
    let config = EditorConfig::default();
    let palette = &config.palette;
    scene.select(Some(ids[0]));

    let output = scene.node(ids[0]).unwrap().sockets()[1].center();
    scene.pointer_press(output);
    scene.pointer_move(Point::new(300.0, 300.0));

    let edge = (
        SocketRef {
            node: ids[0],
            index: 1,
            direction: SocketDirection::Output,
        },
        SocketRef {
            node: ids[1],
            index: 0,
            direction: SocketDirection::Input,
        },
    );

    let mut recorder = StrokeRecorder::default();
    scene.render(&mut recorder, Affine::IDENTITY, &config, &[edge]);

    // edge, 2 sockets + outline per node, preview
    assert_eq!(recorder.strokes.len(), 1 + 3 + 3 + 1);
    assert_eq!(recorder.strokes[0], palette.preview_stroke);
    assert_eq!(recorder.strokes[3], palette.highlight);
    assert_eq!(recorder.strokes[6], palette.base);
    assert_eq!(recorder.strokes[7], palette.preview_stroke);

    scene.pointer_release(Point::new(300.0, 300.0), &mut RejectAll);
}

#[test]
fn test_render_to_vello_scene() {
    let (scene, _ids) = setup_scene();
    let mut vello_scene = Scene::new();

    // Should not panic
    scene.render(&mut vello_scene, Affine::scale(2.0), &EditorConfig::default(), &[]);
}

#[test]
fn test_remove_node_clears_selection() {
    let (mut scene, ids) = setup_scene();
    scene.select(Some(ids[1]));

    let node = scene.remove_node(ids[1]).unwrap();
    assert_eq!(node.id(), ids[1]);
    assert_eq!(scene.selected(), None);
    assert_eq!(scene.nodes().len(), 1);

    scene.select(Some(ids[1]));
    assert_eq!(scene.selected(), None);
}
