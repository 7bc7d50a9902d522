//! Drag-to-connect gesture
//!
//! A press on a socket starts a drag, moves update a preview curve from the
//! socket to the pointer, and the release removes the curve and produces a
//! connection request for whoever owns graph connections. Deciding whether
//! the request is valid is not done here.

use crate::canvas::{Canvas, ItemId};
use crate::geometry::{make_curve, Socket, SocketDirection};
use crate::hit_test::hit_test_sockets;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a node in a scene
pub type NodeId = Uuid;

/// Identity of a socket on a particular node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketRef {
    pub node: NodeId,
    /// Row index of the socket
    pub index: usize,
    pub direction: SocketDirection,
}

impl SocketRef {
    pub fn new(node: NodeId, socket: &Socket) -> Self {
        Self {
            node,
            index: socket.index,
            direction: socket.direction,
        }
    }
}

/// What a finished drag hands to the connection owner
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub origin: SocketRef,
    /// Pointer position at release, canvas space
    pub release_point: Point,
}

/// Whether a pointer event was consumed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventResult {
    Accepted,
    /// Not claimed; the container should apply its default handling
    Ignored,
}

/// A drag in progress
#[derive(Clone, Debug, PartialEq)]
pub struct DragGesture {
    pub origin: SocketRef,
    /// Canvas-space center of the origin socket at press time
    pub anchor: Point,
    /// Latest pointer position, canvas space
    pub endpoint: Point,
    /// Preview curve registered with the canvas
    pub preview: ItemId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(DragGesture),
}

/// Press/drag/release state machine for one node visual
#[derive(Debug, Default)]
pub struct ConnectionGesture {
    state: GestureState,
}

impl ConnectionGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    /// Handle a press at a node-local point
    ///
    /// If the point is inside one of `sockets` a drag starts: the socket
    /// center is mapped to canvas space through `node_item` and a degenerate
    /// preview curve is registered there. A press while a drag is already
    /// live is swallowed without touching it.
    pub fn press(
        &mut self,
        node: NodeId,
        node_item: ItemId,
        sockets: &[Socket],
        local_point: Point,
        canvas: &mut dyn Canvas,
    ) -> EventResult {
        if let GestureState::Dragging(drag) = &self.state {
            log::debug!("Press ignored, already dragging from {:?}", drag.origin);
            return EventResult::Accepted;
        }

        let Some(hit) = hit_test_sockets(sockets, local_point) else {
            return EventResult::Ignored;
        };

        let socket = &sockets[hit];
        let origin = SocketRef::new(node, socket);
        let anchor = canvas.map_to_canvas(node_item, socket.center());
        let preview = canvas.add_curve(node_item, make_curve(anchor, anchor));

        log::debug!("Connection drag started from {:?} at {:?}", origin, anchor);
        self.state = GestureState::Dragging(DragGesture {
            origin,
            anchor,
            endpoint: anchor,
            preview,
        });
        EventResult::Accepted
    }

    /// Follow the pointer with the preview curve
    pub fn drag(&mut self, canvas_point: Point, canvas: &mut dyn Canvas) -> EventResult {
        let GestureState::Dragging(drag) = &mut self.state else {
            return EventResult::Ignored;
        };

        drag.endpoint = canvas_point;
        canvas.set_curve_path(drag.preview, make_curve(drag.anchor, canvas_point));
        log::trace!("Connection drag moved to {:?}", canvas_point);
        EventResult::Accepted
    }

    /// End the drag wherever the pointer is
    ///
    /// The preview curve is removed no matter where the release happens.
    /// Returns None if no drag was live.
    pub fn release(&mut self, canvas_point: Point, canvas: &mut dyn Canvas) -> Option<ConnectionRequest> {
        let GestureState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return None;
        };

        canvas.remove_item(drag.preview);
        log::debug!("Connection drag from {:?} released at {:?}", drag.origin, canvas_point);

        Some(ConnectionRequest {
            origin: drag.origin,
            release_point: canvas_point,
        })
    }

    /// Drop a live drag without producing a request
    ///
    /// Returns true if a drag was cancelled.
    pub fn cancel(&mut self, canvas: &mut dyn Canvas) -> bool {
        let GestureState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return false;
        };

        canvas.remove_item(drag.preview);
        log::debug!("Connection drag from {:?} cancelled", drag.origin);
        true
    }
}
