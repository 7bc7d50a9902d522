//! Node scene
//!
//! Owns the node visuals of one canvas together with the canvas registry,
//! routes pointer events to them and paints everything in order. Sockets get
//! first claim on a press; a press on a node body outside its sockets selects
//! the node and drags it around.
//!
//! Completed connection drags are handed to a `ConnectionHandler`. The scene
//! only reports where the drag started and where it ended; the handler
//! decides whether that makes a connection.

use crate::canvas::{Canvas, CanvasRegistry};
use crate::config::EditorConfig;
use crate::geometry::make_curve;
use crate::gesture::{ConnectionRequest, EventResult, GestureState, NodeId, SocketRef};
use crate::hit_test::hit_test_nodes;
use crate::node_visual::NodeVisual;
use crate::panel::ControlPanel;
use crate::renderer::{render_curve, Surface};
use kurbo::{Affine, BezPath, Point, Vec2};
use std::rc::Rc;

/// Receives finished connection drags
pub trait ConnectionHandler {
    /// Decide what a drag from `request.origin` released at
    /// `request.release_point` means. `locator` can be used to find the
    /// socket under the release point. Returns true if a connection was made.
    fn try_connect(&mut self, request: &ConnectionRequest, locator: &SocketLocator<'_>) -> bool;
}

/// Read-only socket lookup over the nodes of a scene
#[derive(Clone, Copy)]
pub struct SocketLocator<'a> {
    nodes: &'a [NodeVisual],
}

impl<'a> SocketLocator<'a> {
    pub fn new(nodes: &'a [NodeVisual]) -> Self {
        Self { nodes }
    }

    /// Socket under a canvas point
    ///
    /// Only the topmost node under the point is tested, so sockets covered
    /// by another node's body are never reported.
    pub fn socket_at(&self, canvas_point: Point) -> Option<SocketRef> {
        let node = hit_test_nodes(
            self.nodes.iter().map(|node| (node, node.extent(), node.transform())),
            canvas_point,
        )?;
        node.hit_test(node.map_to_local(canvas_point))
            .map(|socket| SocketRef::new(node.id(), &socket))
    }

    /// Canvas-space center of a socket
    pub fn socket_center(&self, socket: SocketRef) -> Option<Point> {
        let node = self.nodes.iter().find(|node| node.id() == socket.node)?;
        node.sockets()
            .iter()
            .find(|s| s.index == socket.index && s.direction == socket.direction)
            .map(|s| node.transform() * s.center())
    }
}

/// Interaction currently owned by the scene
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SceneGesture {
    #[default]
    Idle,
    /// A node is dragging a connection from one of its sockets
    Connecting(NodeId),
    /// A node is being moved; `grab_offset` is pointer minus node position
    MovingNode { node: NodeId, grab_offset: Vec2 },
}

/// Nodes of one canvas, and the canvas they are registered with
///
/// The scene is the only owner of node registration: every node it holds is
/// attached, and every node leaving it (removed, cleared or dropped with the
/// scene) is detached, live preview curve included.
#[derive(Debug, Default)]
pub struct NodeScene<C: Canvas = CanvasRegistry> {
    canvas: C,
    /// Paint order; last is topmost
    nodes: Vec<NodeVisual>,
    selected: Option<NodeId>,
    gesture: SceneGesture,
}

impl NodeScene {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Canvas> NodeScene<C> {
    /// Scene over an existing canvas
    pub fn with_canvas(canvas: C) -> Self {
        Self {
            canvas,
            nodes: Vec::new(),
            selected: None,
            gesture: SceneGesture::Idle,
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn nodes(&self) -> &[NodeVisual] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeVisual> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id() == id)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<NodeId>) {
        self.selected = id.filter(|id| self.index_of(*id).is_some());
    }

    pub fn gesture(&self) -> SceneGesture {
        self.gesture
    }

    pub fn locator(&self) -> SocketLocator<'_> {
        SocketLocator::new(&self.nodes)
    }

    /// Attach a node and put it on top
    pub fn add_node(&mut self, mut node: NodeVisual) -> NodeId {
        node.attach(&mut self.canvas);
        let id = node.id();
        self.nodes.push(node);
        id
    }

    /// Detach and hand back a node
    ///
    /// Any gesture the node was part of ends without a connection request.
    pub fn remove_node(&mut self, id: NodeId) -> Option<NodeVisual> {
        let index = self.index_of(id)?;
        let mut node = self.nodes.remove(index);
        node.detach(&mut self.canvas);

        match self.gesture {
            SceneGesture::Connecting(active) | SceneGesture::MovingNode { node: active, .. } if active == id => {
                self.gesture = SceneGesture::Idle;
            }
            _ => {}
        }
        if self.selected == Some(id) {
            self.selected = None;
        }

        Some(node)
    }

    /// Detach every node
    pub fn clear(&mut self) {
        for mut node in self.nodes.drain(..) {
            node.detach(&mut self.canvas);
        }
        self.selected = None;
        self.gesture = SceneGesture::Idle;
    }

    /// Replace a node's panel, re-hosting it on the canvas
    ///
    /// A connection drag from that node is cancelled.
    pub fn set_panel(&mut self, id: NodeId, panel: Rc<dyn ControlPanel>) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        self.nodes[index].set_panel(panel, &mut self.canvas);
        if self.gesture == SceneGesture::Connecting(id) {
            self.gesture = SceneGesture::Idle;
        }
    }

    /// Move a node to a canvas position
    pub fn move_node(&mut self, id: NodeId, position: Point) {
        if let Some(index) = self.index_of(id) {
            self.nodes[index].set_position(position, &mut self.canvas);
        }
    }

    /// Re-read a node's panel size after the panel changed
    pub fn sync_panel_size(&mut self, id: NodeId) {
        if let Some(index) = self.index_of(id) {
            self.nodes[index].sync_panel_size();
        }
    }

    pub fn pointer_press(&mut self, canvas_point: Point) -> EventResult {
        if self.gesture != SceneGesture::Idle {
            log::debug!("Press ignored during {:?}", self.gesture);
            return EventResult::Accepted;
        }

        let hit = hit_test_nodes(
            self.nodes
                .iter()
                .enumerate()
                .map(|(index, node)| (index, node.extent(), node.transform())),
            canvas_point,
        );
        let Some(index) = hit else {
            self.selected = None;
            return EventResult::Ignored;
        };

        let node = &mut self.nodes[index];
        let local_point = node.map_to_local(canvas_point);
        if node.pointer_press(local_point, &mut self.canvas) == EventResult::Accepted {
            self.gesture = SceneGesture::Connecting(node.id());
            return EventResult::Accepted;
        }

        self.selected = Some(node.id());
        self.gesture = SceneGesture::MovingNode {
            node: node.id(),
            grab_offset: canvas_point - node.position(),
        };
        EventResult::Accepted
    }

    pub fn pointer_move(&mut self, canvas_point: Point) -> EventResult {
        match self.gesture {
            SceneGesture::Idle => EventResult::Ignored,
            SceneGesture::Connecting(id) => match self.index_of(id) {
                Some(index) => self.nodes[index].pointer_move(canvas_point, &mut self.canvas),
                None => EventResult::Ignored,
            },
            SceneGesture::MovingNode { node, grab_offset } => {
                self.move_node(node, canvas_point - grab_offset);
                EventResult::Accepted
            }
        }
    }

    /// End the current gesture
    ///
    /// For a connection drag the handler is called exactly once and the
    /// request is returned as well.
    pub fn pointer_release(
        &mut self,
        canvas_point: Point,
        handler: &mut dyn ConnectionHandler,
    ) -> Option<ConnectionRequest> {
        let gesture = std::mem::take(&mut self.gesture);
        let SceneGesture::Connecting(id) = gesture else {
            return None;
        };

        let index = self.index_of(id)?;
        let request = self.nodes[index].pointer_release(canvas_point, &mut self.canvas)?;

        let connected = handler.try_connect(&request, &SocketLocator::new(&self.nodes));
        log::debug!("Connection request {:?} accepted: {}", request, connected);
        Some(request)
    }

    /// Canvas-space curve between two sockets
    pub fn edge_path(&self, from: SocketRef, to: SocketRef) -> Option<BezPath> {
        let locator = self.locator();
        Some(make_curve(locator.socket_center(from)?, locator.socket_center(to)?))
    }

    /// Paint edges, then nodes bottom to top, then live preview curves
    pub fn render(
        &self,
        surface: &mut dyn Surface,
        base_transform: Affine,
        config: &EditorConfig,
        edges: &[(SocketRef, SocketRef)],
    ) {
        for (from, to) in edges {
            match self.edge_path(*from, *to) {
                Some(path) => render_curve(surface, base_transform, &path, config),
                None => log::trace!("Skipping edge {:?} -> {:?}, socket not found", from, to),
            }
        }

        for node in &self.nodes {
            node.render(surface, base_transform, config, self.selected == Some(node.id()));
        }

        for node in &self.nodes {
            if let GestureState::Dragging(drag) = node.gesture_state() {
                render_curve(surface, base_transform, &make_curve(drag.anchor, drag.endpoint), config);
            }
        }
    }
}

impl<C: Canvas + Default> NodeScene<C> {
    /// Detach every node and hand back the canvas
    pub fn into_canvas(mut self) -> C {
        self.clear();
        std::mem::take(&mut self.canvas)
    }
}

impl<C: Canvas> Drop for NodeScene<C> {
    fn drop(&mut self) {
        self.clear();
    }
}
