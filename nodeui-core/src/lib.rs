// Node UI Core Library
// Node visuals, socket hit testing and the drag-to-connect gesture

pub mod color;
pub mod config;
pub mod geometry;
pub mod panel;
pub mod canvas;
pub mod gesture;
pub mod node_visual;
pub mod renderer;
pub mod scene;
