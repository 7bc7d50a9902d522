//! Embedded control panel interface
//!
//! A panel is the widget hosted inside a node. It is owned elsewhere; node
//! visuals only hold a shared reference and ask it about rows and size.

use crate::geometry::{RowDescriptor, RowRole};
use kurbo::Size;
use std::cell::Cell;

/// The panel collaborator embedded in a node visual
pub trait ControlPanel {
    /// Number of rows the panel exposes
    fn row_count(&self) -> usize;

    /// Row descriptor at `index`, for `index < row_count()`
    fn row(&self, index: usize) -> &dyn RowDescriptor;

    /// Vertical center of row `index`, relative to the panel's top edge
    fn row_y(&self, index: usize) -> f64;

    /// Natural content size of the panel
    fn size_hint(&self) -> Size;
}

/// A panel with a fixed list of rows
///
/// Useful for hosts that lay out rows themselves and just need to report
/// roles and offsets.
#[derive(Debug, Default)]
pub struct StaticPanel {
    rows: Vec<(RowRole, f64)>,
    size: Cell<Size>,
}

impl StaticPanel {
    pub fn new(size: Size) -> Self {
        Self {
            rows: Vec::new(),
            size: Cell::new(size),
        }
    }

    /// Append a row with its vertical offset
    pub fn with_row(mut self, role: RowRole, y: f64) -> Self {
        self.rows.push((role, y));
        self
    }

    /// Change the reported natural size
    pub fn set_size(&self, size: Size) {
        self.size.set(size);
    }
}

impl ControlPanel for StaticPanel {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> &dyn RowDescriptor {
        &self.rows[index].0
    }

    fn row_y(&self, index: usize) -> f64 {
        self.rows[index].1
    }

    fn size_hint(&self) -> Size {
        self.size.get()
    }
}
