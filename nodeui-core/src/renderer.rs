//! Rendering for node canvases
//!
//! Painting goes through the `Surface` trait so node visuals don't depend on
//! a particular backend. `vello::Scene` implements it for GPU display.

use crate::color::NodeColor;
use crate::config::EditorConfig;
use kurbo::{Affine, BezPath, Stroke};
use vello::peniko::Fill;
use vello::Scene;

/// Something node visuals can paint on
pub trait Surface {
    /// Fill a closed path
    fn fill_path(&mut self, transform: Affine, path: &BezPath, color: NodeColor);

    /// Stroke a path with a solid line of `width`
    fn stroke_path(&mut self, transform: Affine, path: &BezPath, width: f64, color: NodeColor);
}

impl Surface for Scene {
    fn fill_path(&mut self, transform: Affine, path: &BezPath, color: NodeColor) {
        self.fill(Fill::NonZero, transform, color.to_peniko(), None, path);
    }

    fn stroke_path(&mut self, transform: Affine, path: &BezPath, width: f64, color: NodeColor) {
        self.stroke(&Stroke::new(width), transform, color.to_peniko(), None, path);
    }
}

/// Paint a connection curve given in canvas space
pub fn render_curve(surface: &mut dyn Surface, base_transform: Affine, path: &BezPath, config: &EditorConfig) {
    surface.stroke_path(
        base_transform,
        path,
        config.preview_stroke_width,
        config.palette.preview_stroke,
    );
}
