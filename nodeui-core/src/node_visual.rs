//! On-canvas visual of a single node
//!
//! A node visual is a rounded box sized around an embedded panel, with a
//! socket on the left edge for every input row and on the right edge for
//! every output row. Outline, extent and sockets are derived from the
//! current size and rows whenever they are asked for; only the size, the
//! position and the panel reference are stored.

use crate::canvas::{Canvas, ItemId};
use crate::config::EditorConfig;
use crate::geometry::{
    clamp_content_size, compute_extent, compute_outline, compute_sockets, Socket, MIN_CONTENT_SIZE,
    PANEL_OFFSET,
};
use crate::gesture::{ConnectionGesture, ConnectionRequest, EventResult, GestureState, NodeId};
use crate::hit_test::hit_test_sockets;
use crate::panel::ControlPanel;
use crate::renderer::Surface;
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Size};
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Items a node visual has registered with a canvas
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Attachment {
    item: ItemId,
    proxy: Option<ItemId>,
}

pub struct NodeVisual {
    id: NodeId,
    /// Top-left corner in canvas space
    position: Point,
    /// Content size requested by the panel
    size: Size,
    panel: Option<Rc<dyn ControlPanel>>,
    attachment: Option<Attachment>,
    gesture: ConnectionGesture,
}

impl NodeVisual {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: NodeId) -> Self {
        Self {
            id,
            position: Point::ZERO,
            size: MIN_CONTENT_SIZE,
            panel: None,
            attachment: None,
            gesture: ConnectionGesture::new(),
        }
    }

    /// Set the initial position (before attaching)
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Set the embedded panel (before attaching)
    pub fn with_panel(mut self, panel: Rc<dyn ControlPanel>) -> Self {
        self.panel = Some(panel);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn panel(&self) -> Option<&Rc<dyn ControlPanel>> {
        self.panel.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Canvas item of the node shape, while attached
    pub fn item(&self) -> Option<ItemId> {
        self.attachment.map(|a| a.item)
    }

    /// Canvas item of the panel proxy, while attached with a panel
    pub fn proxy_item(&self) -> Option<ItemId> {
        self.attachment.and_then(|a| a.proxy)
    }

    pub fn gesture_state(&self) -> &GestureState {
        self.gesture.state()
    }

    /// Replace the embedded panel
    ///
    /// On a detached node this only stores the panel. On an attached node the
    /// old proxy is swapped for one hosting the new panel, so an attached
    /// node with a panel always has a proxy. Socket indices may change with
    /// the rows, so a live connection drag is cancelled.
    pub(crate) fn set_panel(&mut self, panel: Rc<dyn ControlPanel>, canvas: &mut dyn Canvas) {
        if let Some(attachment) = self.attachment.as_mut() {
            self.gesture.cancel(canvas);
            if let Some(old) = attachment.proxy.take() {
                canvas.remove_item(old);
            }
            let proxy = canvas.add_proxy(attachment.item, Rc::clone(&panel), PANEL_OFFSET);
            attachment.proxy = Some(proxy);
            log::debug!("Node {} now hosts its panel in proxy {}", self.id, proxy);
        }
        self.panel = Some(panel);
    }

    /// Register the node shape, and the panel proxy if a panel is set
    ///
    /// Canvas registration is owned by `NodeScene`, which detaches every
    /// node it removes or drops.
    pub(crate) fn attach(&mut self, canvas: &mut dyn Canvas) {
        if self.is_attached() {
            log::debug!("Node {} is already attached", self.id);
            return;
        }

        let item = canvas.add_shape(self.position);
        let proxy = self
            .panel
            .as_ref()
            .map(|panel| canvas.add_proxy(item, Rc::clone(panel), PANEL_OFFSET));

        log::debug!("Attached node {} as item {}", self.id, item);
        self.attachment = Some(Attachment { item, proxy });
    }

    /// Unregister everything this node put on the canvas
    ///
    /// A live connection drag is cancelled first so its preview curve is
    /// never left behind.
    pub(crate) fn detach(&mut self, canvas: &mut dyn Canvas) {
        let Some(attachment) = self.attachment.take() else {
            return;
        };

        self.gesture.cancel(canvas);
        if let Some(proxy) = attachment.proxy {
            canvas.remove_item(proxy);
        }
        canvas.remove_item(attachment.item);
        log::debug!("Detached node {}", self.id);
    }

    /// Move the node, keeping the canvas item in sync
    pub fn set_position(&mut self, position: Point, canvas: &mut dyn Canvas) {
        self.position = position;
        if let Some(attachment) = self.attachment {
            canvas.set_item_position(attachment.item, position);
        }
    }

    /// Set the content size
    ///
    /// Sizes below `MIN_CONTENT_SIZE` are clamped so the outline never
    /// degenerates.
    pub fn resize(&mut self, size: Size) {
        let clamped = clamp_content_size(size);
        if clamped != size {
            log::warn!("Node {} resized to {:?}, clamped to {:?}", self.id, size, clamped);
        }
        self.size = clamped;
    }

    /// Resize to the panel's current natural size
    pub fn sync_panel_size(&mut self) {
        if let Some(size) = self.panel.as_ref().map(|panel| panel.size_hint()) {
            self.resize(size);
        }
    }

    /// Full node-local extent used for hit testing and painting
    pub fn extent(&self) -> Rect {
        compute_extent(self.size)
    }

    /// Node-local outline path
    pub fn outline(&self) -> BezPath {
        compute_outline(self.size)
    }

    /// Node-local sockets in row order; empty without a panel
    pub fn sockets(&self) -> Vec<Socket> {
        let Some(panel) = self.panel.as_deref() else {
            return Vec::new();
        };

        compute_sockets(
            (0..panel.row_count()).map(|index| panel.row(index)),
            self.extent(),
            |index| PANEL_OFFSET.y + panel.row_y(index),
        )
    }

    /// Socket under a node-local point; first in row order wins
    pub fn hit_test(&self, local_point: Point) -> Option<Socket> {
        let sockets = self.sockets();
        hit_test_sockets(&sockets, local_point).map(|hit| sockets[hit])
    }

    /// Node-local to canvas transform
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
    }

    pub fn map_to_local(&self, canvas_point: Point) -> Point {
        canvas_point - self.position.to_vec2()
    }

    /// Paint sockets, then the outline on top of them
    pub fn render(&self, surface: &mut dyn Surface, base_transform: Affine, config: &EditorConfig, selected: bool) {
        let transform = base_transform * self.transform();
        let palette = &config.palette;

        for socket in self.sockets() {
            let circle = Circle::new(socket.center(), socket.bounds.width() / 2.0).to_path(0.1);
            surface.fill_path(transform, &circle, palette.socket_fill);
            surface.stroke_path(transform, &circle, config.outline_stroke_width, palette.socket_outline);
        }

        let outline = self.outline();
        let stroke = if selected { palette.highlight } else { palette.base };
        surface.fill_path(transform, &outline, palette.window);
        surface.stroke_path(transform, &outline, config.outline_stroke_width, stroke);
    }

    /// Press at a node-local point
    ///
    /// Claims the event if it lands on a socket; otherwise returns
    /// `Ignored` so the container can start its own handling.
    pub fn pointer_press(&mut self, local_point: Point, canvas: &mut dyn Canvas) -> EventResult {
        let Some(attachment) = self.attachment else {
            return EventResult::Ignored;
        };

        let sockets = self.sockets();
        self.gesture
            .press(self.id, attachment.item, &sockets, local_point, canvas)
    }

    pub fn pointer_move(&mut self, canvas_point: Point, canvas: &mut dyn Canvas) -> EventResult {
        self.gesture.drag(canvas_point, canvas)
    }

    pub fn pointer_release(&mut self, canvas_point: Point, canvas: &mut dyn Canvas) -> Option<ConnectionRequest> {
        self.gesture.release(canvas_point, canvas)
    }
}

impl Default for NodeVisual {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeVisual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeVisual")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("has_panel", &self.panel.is_some())
            .field("attachment", &self.attachment)
            .field("gesture", &self.gesture)
            .finish()
    }
}

impl Drop for NodeVisual {
    fn drop(&mut self) {
        if let Some(attachment) = self.attachment {
            log::warn!(
                "Node {} dropped while item {} is still registered",
                self.id,
                attachment.item
            );
        }
    }
}
