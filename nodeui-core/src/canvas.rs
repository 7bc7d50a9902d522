//! Canvas interface and item registry
//!
//! The canvas owns every registered visual item. Node visuals register their
//! shape and panel proxy, the connection gesture registers its preview curve,
//! and each of them unregisters explicitly. Nothing is removed by cascade.

use crate::panel::ControlPanel;
use kurbo::{BezPath, Point, Vec2};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Identifier of an item registered with a canvas
pub type ItemId = Uuid;

/// Operations a node visual and its gestures need from the canvas
pub trait Canvas {
    /// Register a node shape anchored at `position`
    fn add_shape(&mut self, position: Point) -> ItemId;

    /// Register a proxy hosting `panel`, parented to `parent` at `offset`
    fn add_proxy(&mut self, parent: ItemId, panel: Rc<dyn ControlPanel>, offset: Vec2) -> ItemId;

    /// Register a canvas-space curve owned by the node item `owner`
    fn add_curve(&mut self, owner: ItemId, path: BezPath) -> ItemId;

    /// Replace the path of a registered curve
    fn set_curve_path(&mut self, curve: ItemId, path: BezPath);

    /// Move a top-level item
    fn set_item_position(&mut self, item: ItemId, position: Point);

    /// Unregister an item
    fn remove_item(&mut self, item: ItemId);

    /// Map a point in an item's local space to canvas space
    fn map_to_canvas(&self, item: ItemId, local: Point) -> Point;

    fn contains(&self, item: ItemId) -> bool;
}

/// An item held by the registry
pub enum CanvasItem {
    Node {
        position: Point,
    },
    Proxy {
        parent: ItemId,
        offset: Vec2,
        panel: Rc<dyn ControlPanel>,
    },
    Curve {
        owner: ItemId,
        path: BezPath,
    },
}

impl fmt::Debug for CanvasItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanvasItem::Node { position } => f.debug_struct("Node").field("position", position).finish(),
            CanvasItem::Proxy { parent, offset, .. } => f
                .debug_struct("Proxy")
                .field("parent", parent)
                .field("offset", offset)
                .finish_non_exhaustive(),
            CanvasItem::Curve { owner, path } => f
                .debug_struct("Curve")
                .field("owner", owner)
                .field("path", path)
                .finish(),
        }
    }
}

/// Flat registry of canvas items
///
/// Items keep their registration order, which is also their paint order.
/// Curves are additionally indexed by the node item that owns them.
#[derive(Debug, Default)]
pub struct CanvasRegistry {
    items: HashMap<ItemId, CanvasItem>,
    order: Vec<ItemId>,
    curves_by_owner: HashMap<ItemId, ItemId>,
}

impl CanvasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item: ItemId) -> Option<&CanvasItem> {
        self.items.get(&item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in paint order
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &CanvasItem)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.items.get(id).map(|item| (*id, item)))
    }

    /// Curves in paint order
    pub fn curves(&self) -> impl Iterator<Item = (ItemId, &BezPath)> + '_ {
        self.items().filter_map(|(id, item)| match item {
            CanvasItem::Curve { path, .. } => Some((id, path)),
            _ => None,
        })
    }

    /// The curve currently owned by a node item, if any
    pub fn curve_owned_by(&self, owner: ItemId) -> Option<ItemId> {
        self.curves_by_owner.get(&owner).copied()
    }

    fn insert(&mut self, item: CanvasItem) -> ItemId {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.order.push(id);
        id
    }
}

impl Canvas for CanvasRegistry {
    fn add_shape(&mut self, position: Point) -> ItemId {
        self.insert(CanvasItem::Node { position })
    }

    fn add_proxy(&mut self, parent: ItemId, panel: Rc<dyn ControlPanel>, offset: Vec2) -> ItemId {
        self.insert(CanvasItem::Proxy { parent, offset, panel })
    }

    fn add_curve(&mut self, owner: ItemId, path: BezPath) -> ItemId {
        let id = self.insert(CanvasItem::Curve { owner, path });
        if let Some(previous) = self.curves_by_owner.insert(owner, id) {
            log::warn!("Item {} already owned curve {}", owner, previous);
        }
        id
    }

    fn set_curve_path(&mut self, curve: ItemId, new_path: BezPath) {
        match self.items.get_mut(&curve) {
            Some(CanvasItem::Curve { path, .. }) => *path = new_path,
            _ => log::warn!("set_curve_path on unknown curve {}", curve),
        }
    }

    fn set_item_position(&mut self, item: ItemId, new_position: Point) {
        match self.items.get_mut(&item) {
            Some(CanvasItem::Node { position }) => *position = new_position,
            _ => log::warn!("set_item_position on unknown node item {}", item),
        }
    }

    fn remove_item(&mut self, item: ItemId) {
        let Some(removed) = self.items.remove(&item) else {
            log::warn!("remove_item on unknown item {}", item);
            return;
        };
        self.order.retain(|id| *id != item);

        match removed {
            CanvasItem::Curve { owner, .. } => {
                if self.curves_by_owner.get(&owner) == Some(&item) {
                    self.curves_by_owner.remove(&owner);
                }
            }
            CanvasItem::Node { .. } => {
                if let Some(curve) = self.curves_by_owner.get(&item) {
                    log::warn!("Node item {} removed while curve {} is still registered", item, curve);
                }
            }
            CanvasItem::Proxy { .. } => {}
        }
    }

    fn map_to_canvas(&self, item: ItemId, local: Point) -> Point {
        match self.items.get(&item) {
            Some(CanvasItem::Node { position }) => *position + local.to_vec2(),
            Some(CanvasItem::Proxy { parent, offset, .. }) => self.map_to_canvas(*parent, local + *offset),
            Some(CanvasItem::Curve { .. }) => local,
            None => {
                log::warn!("map_to_canvas on unknown item {}", item);
                local
            }
        }
    }

    fn contains(&self, item: ItemId) -> bool {
        self.items.contains_key(&item)
    }
}
