//! Node geometry
//!
//! Derives the rounded outline and the socket rectangles of a node from its
//! content size and its row descriptors. Everything here is a pure function
//! of its arguments and works in node-local coordinates, where (0, 0) is the
//! top-left corner of the node's full extent.

use kurbo::{BezPath, Point, Rect, RoundedRect, Shape, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Corner radius of the node outline, also the padding around the panel
pub const CORNER_RADIUS: f64 = 5.0;

/// Diameter of a socket
pub const SOCKET_SIZE: f64 = 10.0;

/// Extra width reserved in the extent so sockets can protrude from the outline
pub const SOCKET_MARGIN: f64 = SOCKET_SIZE;

/// Smallest content size a node may be resized to
pub const MIN_CONTENT_SIZE: Size = Size::new(1.0, 1.0);

/// Offset of the embedded panel from the node's top-left corner
pub const PANEL_OFFSET: Vec2 = Vec2::new(CORNER_RADIUS, CORNER_RADIUS);

/// Flattening tolerance used when converting shapes to paths
const PATH_TOLERANCE: f64 = 0.1;

/// Which side of the node a socket sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketDirection {
    /// Hugs the left edge
    Input,
    /// Hugs the right edge
    Output,
}

/// Connection-role answers for one row of a node
pub trait RowDescriptor {
    fn is_input(&self) -> bool;
    fn is_output(&self) -> bool;
}

impl<T: RowDescriptor + ?Sized> RowDescriptor for &T {
    fn is_input(&self) -> bool {
        (**self).is_input()
    }

    fn is_output(&self) -> bool {
        (**self).is_output()
    }
}

/// Plain row descriptor, handy for panels that store roles directly
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRole {
    pub input: bool,
    pub output: bool,
}

impl RowRole {
    pub const NONE: RowRole = RowRole { input: false, output: false };
    pub const INPUT: RowRole = RowRole { input: true, output: false };
    pub const OUTPUT: RowRole = RowRole { input: false, output: true };
    pub const BOTH: RowRole = RowRole { input: true, output: true };
}

impl RowDescriptor for RowRole {
    fn is_input(&self) -> bool {
        self.input
    }

    fn is_output(&self) -> bool {
        self.output
    }
}

/// A hit-testable connection point, computed on demand
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    /// Index of the row this socket belongs to
    pub index: usize,
    pub direction: SocketDirection,
    /// Node-local bounds, `SOCKET_SIZE` square
    pub bounds: Rect,
}

impl Socket {
    pub fn center(&self) -> Point {
        self.bounds.center()
    }
}

/// Clamp a requested content size to `MIN_CONTENT_SIZE`
///
/// NaN components clamp to the minimum as well.
pub fn clamp_content_size(size: Size) -> Size {
    let clamp = |value: f64, min: f64| if value >= min { value } else { min };
    Size::new(
        clamp(size.width, MIN_CONTENT_SIZE.width),
        clamp(size.height, MIN_CONTENT_SIZE.height),
    )
}

/// Full node extent for a content size
///
/// Content plus the corner padding on every side, plus the socket margin on
/// the right.
pub fn compute_extent(size: Size) -> Rect {
    Rect::new(
        0.0,
        0.0,
        size.width + 2.0 * CORNER_RADIUS + SOCKET_MARGIN,
        size.height + 2.0 * CORNER_RADIUS,
    )
}

/// Rectangle the rounded outline is built from
///
/// The extent shifted right by half a socket so that input and output
/// socket centers land exactly on the outline's left and right edges.
pub fn compute_outline_rect(size: Size) -> Rect {
    let extent = compute_extent(size);
    Rect::new(
        extent.x0 + SOCKET_MARGIN / 2.0,
        extent.y0,
        extent.x1 - SOCKET_MARGIN / 2.0,
        extent.y1,
    )
}

/// Closed rounded-rectangle outline for a content size
pub fn compute_outline(size: Size) -> BezPath {
    RoundedRect::from_rect(compute_outline_rect(size), CORNER_RADIUS).to_path(PATH_TOLERANCE)
}

/// Compute the sockets for a row sequence
///
/// Rows are walked once, in order. Input rows produce a socket on the left
/// edge of `extent`, output rows one flush with the right edge; a row that
/// is both produces the input socket first. `row_y` maps a row index to the
/// vertical center of its socket in the same space as `extent`.
pub fn compute_sockets<I>(rows: I, extent: Rect, row_y: impl Fn(usize) -> f64) -> Vec<Socket>
where
    I: IntoIterator,
    I::Item: RowDescriptor,
{
    let mut sockets = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let directions = [
            (row.is_input(), SocketDirection::Input),
            (row.is_output(), SocketDirection::Output),
        ];
        if !directions.iter().any(|(enabled, _)| *enabled) {
            continue;
        }

        let center_y = row_y(index);
        for (_, direction) in directions.iter().filter(|(enabled, _)| *enabled) {
            let x = match direction {
                SocketDirection::Input => extent.x0,
                SocketDirection::Output => extent.x1 - SOCKET_SIZE,
            };
            sockets.push(Socket {
                index,
                direction: *direction,
                bounds: Rect::from_origin_size(
                    (x, center_y - SOCKET_SIZE / 2.0),
                    (SOCKET_SIZE, SOCKET_SIZE),
                ),
            });
        }
    }

    sockets
}

/// Horizontal "S" connector between two points
///
/// A single cubic whose control points share the x midpoint of the two
/// endpoints, each at the height of its own endpoint. Used both for the
/// drag preview and for finished edges.
pub fn make_curve(start: Point, end: Point) -> BezPath {
    let mid_x = start.x + (end.x - start.x) * 0.5;

    let mut path = BezPath::new();
    path.move_to(start);
    path.curve_to(Point::new(mid_x, start.y), Point::new(mid_x, end.y), end);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    fn two_row_sockets() -> Vec<Socket> {
        let rows = [RowRole::INPUT, RowRole::OUTPUT];
        let extent = Rect::new(0.0, 0.0, 120.0, 70.0);
        compute_sockets(rows, extent, |i| [20.0, 40.0][i])
    }

    #[test]
    fn test_outline_is_inset_by_half_socket() {
        let size = Size::new(100.0, 60.0);
        let extent = compute_extent(size);
        assert_eq!(extent, Rect::new(0.0, 0.0, 120.0, 70.0));

        let bbox = compute_outline(size).bounding_box();
        assert!((bbox.x0 - 5.0).abs() < 1e-9);
        assert!((bbox.x1 - 115.0).abs() < 1e-9);
        assert!((bbox.y0 - 0.0).abs() < 1e-9);
        assert!((bbox.y1 - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_outline_is_closed() {
        let outline = compute_outline(Size::new(40.0, 20.0));
        assert!(matches!(outline.elements().last(), Some(PathEl::ClosePath)));
    }

    #[test]
    fn test_scenario_two_rows() {
        let sockets = two_row_sockets();
        assert_eq!(sockets.len(), 2);

        assert_eq!(sockets[0].index, 0);
        assert_eq!(sockets[0].direction, SocketDirection::Input);
        assert_eq!(sockets[0].center(), Point::new(5.0, 20.0));

        assert_eq!(sockets[1].index, 1);
        assert_eq!(sockets[1].direction, SocketDirection::Output);
        assert_eq!(sockets[1].center(), Point::new(115.0, 40.0));
    }

    #[test]
    fn test_socket_edges_follow_extent() {
        let extent = Rect::new(0.0, 0.0, 120.0, 70.0);
        for socket in two_row_sockets() {
            match socket.direction {
                SocketDirection::Input => assert_eq!(socket.bounds.x0, extent.x0),
                SocketDirection::Output => assert_eq!(socket.bounds.x1, extent.x1),
            }
            assert_eq!(socket.bounds.size(), Size::new(SOCKET_SIZE, SOCKET_SIZE));
        }
    }

    #[test]
    fn test_one_socket_per_enabled_direction() {
        let rows = [RowRole::NONE, RowRole::BOTH, RowRole::INPUT, RowRole::NONE, RowRole::OUTPUT];
        let sockets = compute_sockets(rows, Rect::new(0.0, 0.0, 50.0, 50.0), |i| i as f64 * 10.0);

        let pairs: Vec<_> = sockets.iter().map(|s| (s.index, s.direction)).collect();
        assert_eq!(
            pairs,
            vec![
                (1, SocketDirection::Input),
                (1, SocketDirection::Output),
                (2, SocketDirection::Input),
                (4, SocketDirection::Output),
            ]
        );
    }

    #[test]
    fn test_empty_rows_have_no_sockets() {
        let rows: [RowRole; 0] = [];
        assert!(compute_sockets(rows, Rect::new(0.0, 0.0, 10.0, 10.0), |_| 0.0).is_empty());
    }

    #[test]
    fn test_neither_row_does_not_query_offset() {
        let rows = [RowRole::NONE];
        let sockets = compute_sockets(rows, Rect::ZERO, |_| panic!("offset queried"));
        assert!(sockets.is_empty());
    }

    #[test]
    fn test_make_curve_control_points() {
        let a = Point::new(10.0, 20.0);
        let b = Point::new(110.0, 80.0);
        let curve = make_curve(a, b);

        let elements = curve.elements();
        assert_eq!(elements[0], PathEl::MoveTo(a));
        match elements[1] {
            PathEl::CurveTo(c1, c2, end) => {
                assert_eq!(c1, Point::new(60.0, 20.0));
                assert_eq!(c2, Point::new(60.0, 80.0));
                assert_eq!(end, b);
            }
            ref other => panic!("expected a cubic, got {:?}", other),
        }
    }

    #[test]
    fn test_make_curve_degenerate() {
        let a = Point::new(42.0, -7.0);
        let curve = make_curve(a, a);
        let bbox = curve.bounding_box();
        assert_eq!(bbox, Rect::from_points(a, a));
        assert_eq!(bbox.area(), 0.0);
    }

    #[test]
    fn test_clamp_content_size() {
        assert_eq!(clamp_content_size(Size::new(0.0, -4.0)), MIN_CONTENT_SIZE);
        assert_eq!(clamp_content_size(Size::new(f64::NAN, 3.0)), Size::new(1.0, 3.0));
        assert_eq!(clamp_content_size(Size::new(8.0, 9.0)), Size::new(8.0, 9.0));
    }
}
